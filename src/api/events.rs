//! Event types and broadcasting for the Server-Sent Events stream
//!
//! Every dispatched control event is republished here so that any number of
//! observers (other browser tabs, scripts) can follow the chart without
//! ticking it themselves.

use crate::chart::ChartDescription;
use crate::dashboard::{ControlEvent, DispatchOutcome};
use crate::types::Mode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type discriminant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    /// A tick appended a sample
    ChartUpdated {
        n_intervals: u64,
        mode: Mode,
        chart: ChartDescription,
        timestamp: DateTime<Utc>,
    },
    /// Current state, sent first to every new subscriber
    Snapshot {
        mode: Mode,
        interval_ms: u64,
        chart: ChartDescription,
        timestamp: DateTime<Utc>,
    },
    /// Generation mode selected
    ModeChanged {
        mode: Mode,
        timestamp: DateTime<Utc>,
    },
    /// Refresh period selected
    IntervalChanged {
        interval_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// Server started
    SessionStarted {
        #[serde(default)]
        instance_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// Heartbeat (published periodically)
    Heartbeat {
        #[serde(default)]
        instance_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

/// Event with metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event ID (for deduplication)
    pub id: String,
    /// Event payload
    #[serde(flatten)]
    pub event_type: EventType,
}

impl Event {
    /// Create new event
    pub fn new(event_type: EventType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
        }
    }

    /// Event describing a dispatched control event
    pub fn from_dispatch(event: &ControlEvent, outcome: &DispatchOutcome, mode: Mode) -> Self {
        let timestamp = Utc::now();
        Self::new(match event {
            ControlEvent::Tick { n_intervals } => EventType::ChartUpdated {
                n_intervals: *n_intervals,
                mode,
                chart: outcome.chart.clone(),
                timestamp,
            },
            ControlEvent::ModeChanged(mode) => EventType::ModeChanged {
                mode: *mode,
                timestamp,
            },
            ControlEvent::IntervalChanged(interval) => EventType::IntervalChanged {
                interval_ms: interval.as_millis(),
                timestamp,
            },
        })
    }

    /// Create snapshot event
    pub fn snapshot(mode: Mode, interval_ms: u64, chart: ChartDescription) -> Self {
        Self::new(EventType::Snapshot {
            mode,
            interval_ms,
            chart,
            timestamp: Utc::now(),
        })
    }

    /// Create session started event
    pub fn session_started(instance_id: String) -> Self {
        Self::new(EventType::SessionStarted {
            instance_id: Some(instance_id),
            timestamp: Utc::now(),
        })
    }

    /// Create heartbeat event
    pub fn heartbeat(instance_id: String) -> Self {
        Self::new(EventType::Heartbeat {
            instance_id: Some(instance_id),
            timestamp: Utc::now(),
        })
    }
}

/// Event broadcaster using tokio broadcast channel
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<Event>,
}

impl EventBroadcaster {
    /// Create new broadcaster with channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast event to all subscribers
    pub fn broadcast(
        &self,
        event: Event,
    ) -> Result<usize, Box<broadcast::error::SendError<Event>>> {
        self.tx.send(event).map_err(Box::new)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Get subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(1000) // Default capacity: 1000 events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render;
    use crate::series::SeriesBuffer;
    use crate::types::UpdateInterval;

    #[test]
    fn test_tick_event_carries_chart() {
        let outcome = DispatchOutcome {
            chart: render(&SeriesBuffer::default()),
            interval: None,
        };
        let event = Event::from_dispatch(
            &ControlEvent::Tick { n_intervals: 4 },
            &outcome,
            Mode::Sine,
        );

        match event.event_type {
            EventType::ChartUpdated {
                n_intervals,
                mode,
                chart,
                ..
            } => {
                assert_eq!(n_intervals, 4);
                assert_eq!(mode, Mode::Sine);
                assert_eq!(chart, outcome.chart);
            }
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn test_event_json_is_tagged() {
        let outcome = DispatchOutcome {
            chart: render(&SeriesBuffer::default()),
            interval: Some(UpdateInterval::new(1_500).unwrap()),
        };
        let event = Event::from_dispatch(
            &ControlEvent::IntervalChanged(UpdateInterval::new(1_500).unwrap()),
            &outcome,
            Mode::RandomWalk,
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "interval_changed");
        assert_eq!(json["interval_ms"], 1_500);
        assert!(json["id"].is_string());
    }

    #[tokio::test]
    async fn test_broadcaster() {
        let broadcaster = EventBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        let event = Event::heartbeat("test".to_string());
        broadcaster.broadcast(event.clone()).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, event.id);
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_err() {
        let broadcaster = EventBroadcaster::default();
        assert!(broadcaster
            .broadcast(Event::session_started("x".to_string()))
            .is_err());
    }
}
