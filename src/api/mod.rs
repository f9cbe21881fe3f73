//! HTTP control surface for the live chart
//!
//! Provides:
//! - The dashboard page and its control endpoints
//! - A single task owning the dashboard state
//! - Server-Sent Events (SSE) for chart updates

pub mod events;
pub mod handle;
pub mod server;

pub use events::{Event, EventBroadcaster, EventType};
pub use handle::DashboardHandle;
pub use server::{build_router, ApiServer, AppState};
