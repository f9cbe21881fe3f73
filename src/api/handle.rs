//! Single owner of the dashboard
//!
//! HTTP handlers run concurrently, so the [`Dashboard`] lives inside one
//! background task and is only reached through a [`DashboardHandle`]. Requests
//! queue on an mpsc channel and are handled strictly one after another; each
//! carries a oneshot sender for its reply.

use super::events::{Event, EventBroadcaster};
use crate::chart::ChartDescription;
use crate::dashboard::{ControlEvent, ControlState, Dashboard, DashboardSnapshot, DispatchOutcome};
use crate::error::{LiveChartError, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Pending requests before senders wait
const REQUEST_QUEUE_CAPACITY: usize = 64;

/// Request handled by the dashboard task
enum DashboardRequest {
    Dispatch {
        event: ControlEvent,
        reply: oneshot::Sender<DispatchOutcome>,
    },
    Chart {
        reply: oneshot::Sender<ChartDescription>,
    },
    Controls {
        reply: oneshot::Sender<ControlState>,
    },
    Snapshot {
        reply: oneshot::Sender<DashboardSnapshot>,
    },
}

/// Cloneable handle to the dashboard task
#[derive(Clone)]
pub struct DashboardHandle {
    tx: mpsc::Sender<DashboardRequest>,
}

impl DashboardHandle {
    /// Move `dashboard` into a new task and return a handle to it
    ///
    /// Every dispatched event is also published on `events`. The task ends
    /// once the last handle is dropped.
    pub fn spawn(mut dashboard: Dashboard, events: EventBroadcaster) -> Self {
        let (tx, mut rx) = mpsc::channel::<DashboardRequest>(REQUEST_QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                match request {
                    DashboardRequest::Dispatch { event, reply } => {
                        let outcome = dashboard.dispatch(event);
                        // No subscribers is fine
                        let _ = events.broadcast(Event::from_dispatch(
                            &event,
                            &outcome,
                            dashboard.mode(),
                        ));
                        // The caller may have gone away; the event still counts
                        let _ = reply.send(outcome);
                    }
                    DashboardRequest::Chart { reply } => {
                        let _ = reply.send(dashboard.chart());
                    }
                    DashboardRequest::Controls { reply } => {
                        let _ = reply.send(dashboard.controls());
                    }
                    DashboardRequest::Snapshot { reply } => {
                        let _ = reply.send(dashboard.snapshot());
                    }
                }
            }
            debug!("Dashboard task stopped: all handles dropped");
        });

        Self { tx }
    }

    /// Handle one control event
    pub async fn dispatch(&self, event: ControlEvent) -> Result<DispatchOutcome> {
        self.request(|reply| DashboardRequest::Dispatch { event, reply })
            .await
    }

    /// Current chart, without ticking
    pub async fn chart(&self) -> Result<ChartDescription> {
        self.request(|reply| DashboardRequest::Chart { reply }).await
    }

    /// Current control values
    pub async fn controls(&self) -> Result<ControlState> {
        self.request(|reply| DashboardRequest::Controls { reply })
            .await
    }

    /// Control values and chart from the same point in the event sequence
    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        self.request(|reply| DashboardRequest::Snapshot { reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> DashboardRequest,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(build(reply_tx)).await.map_err(|_| {
            LiveChartError::DashboardUnavailable("dashboard task has stopped".to_string())
        })?;
        reply_rx.await.map_err(|_| {
            LiveChartError::DashboardUnavailable("dashboard task dropped the request".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::events::EventType;
    use crate::generator::SampleGenerator;
    use crate::types::{Mode, UpdateInterval};

    fn spawn_seeded() -> (DashboardHandle, EventBroadcaster) {
        let events = EventBroadcaster::new(16);
        let dashboard = Dashboard::new(50, UpdateInterval::default(), SampleGenerator::with_seed(5));
        (DashboardHandle::spawn(dashboard, events.clone()), events)
    }

    #[tokio::test]
    async fn test_dispatch_through_handle() {
        let (handle, _events) = spawn_seeded();

        for n in 0..3 {
            handle
                .dispatch(ControlEvent::Tick { n_intervals: n })
                .await
                .unwrap();
        }

        let controls = handle.controls().await.unwrap();
        assert_eq!(controls.points, 3);
        assert_eq!(controls.mode, Mode::RandomWalk);
        assert_eq!(handle.chart().await.unwrap().x_range(), [0, 2]);
    }

    #[tokio::test]
    async fn test_concurrent_ticks_are_serialized() {
        let (handle, _events) = spawn_seeded();

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    handle
                        .dispatch(ControlEvent::Tick { n_intervals: n })
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let chart = handle.chart().await.unwrap();
        assert_eq!(chart.trace().unwrap().x, (0..20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_snapshot_is_consistent_under_concurrent_ticks() {
        let (handle, _events) = spawn_seeded();

        let ticker = {
            let handle = handle.clone();
            tokio::spawn(async move {
                for n in 0..40 {
                    handle
                        .dispatch(ControlEvent::Tick { n_intervals: n })
                        .await
                        .unwrap();
                }
            })
        };

        for _ in 0..40 {
            let snapshot = handle.snapshot().await.unwrap();
            let trace = snapshot.chart.trace().unwrap();
            assert_eq!(trace.x.len(), snapshot.controls.points);
            tokio::task::yield_now().await;
        }
        ticker.await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.controls.points, 40);
        assert_eq!(snapshot.chart.x_range(), [0, 39]);
    }

    #[tokio::test]
    async fn test_dispatch_is_broadcast() {
        let (handle, events) = spawn_seeded();
        let mut rx = events.subscribe();

        handle
            .dispatch(ControlEvent::ModeChanged(Mode::Sine))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.event_type,
            EventType::ModeChanged { mode: Mode::Sine, .. }
        ));
    }
}
