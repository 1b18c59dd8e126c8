//! Hand-off from ranging sessions to the notification worker.
//!
//! Sessions call the sink while the state write lock is held, so the sink
//! only copies values onto an unbounded channel. A single worker task drains
//! the channel, renders notifications and records them.

use beaconzone_core::{BeaconObservation, EventSink, Notification, Region, RegionEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::SharedState;

/// Messages carried from sessions to the worker.
#[derive(Debug, Clone)]
pub enum SinkMessage {
    /// A region's registry was merged.
    RegistryChanged {
        /// Region id.
        region_id: String,
        /// Registry size after the merge.
        beacons: usize,
        /// Identifier of the first entry, if any.
        first: Option<String>,
    },
    /// A region emitted an Enter or Leave.
    RegionEvent {
        /// Region id.
        region_id: String,
        /// The event.
        event: RegionEvent,
    },
}

/// [`EventSink`] that forwards by value onto a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkMessage>,
}

impl ChannelSink {
    /// Wrap a channel sender.
    #[must_use]
    pub const fn new(tx: mpsc::UnboundedSender<SinkMessage>) -> Self {
        Self { tx }
    }

    fn send(&self, message: SinkMessage) {
        if self.tx.send(message).is_err() {
            warn!("Notification worker is gone, dropping sink message");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_registry_changed(&self, region: &Region, ordered: &[BeaconObservation]) {
        self.send(SinkMessage::RegistryChanged {
            region_id: region.id.clone(),
            beacons: ordered.len(),
            first: ordered.first().map(|o| o.identifier.clone()),
        });
    }

    fn on_region_event(&self, region: &Region, event: RegionEvent) {
        self.send(SinkMessage::RegionEvent {
            region_id: region.id.clone(),
            event,
        });
    }
}

/// Drain the sink channel into the notification log.
///
/// `AppState` keeps a sender for its whole life, so this loop runs until the
/// task is aborted.
pub async fn run_notification_worker(
    state: SharedState,
    mut rx: mpsc::UnboundedReceiver<SinkMessage>,
) {
    info!("Notification worker started");

    while let Some(message) = rx.recv().await {
        match message {
            SinkMessage::RegistryChanged {
                region_id,
                beacons,
                first,
            } => {
                debug!(region = %region_id, beacons, first = ?first, "Registry changed");
            }
            SinkMessage::RegionEvent { region_id, event } => {
                let mut state_guard = state.write().await;
                let notification = Notification::from_event(&region_id, &event, &state_guard.zones);
                info!(
                    region = %region_id,
                    kind = ?notification.kind,
                    zone = %notification.zone_name,
                    message = %notification.message,
                    "Region notification"
                );
                state_guard.notifications.push(notification);
            }
        }
    }

    info!("Notification worker stopped");
}
