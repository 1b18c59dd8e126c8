//! Application state shared across handlers.
//!
//! All ranging sessions live behind one `RwLock`. Ingesting a batch takes the
//! write lock for the whole merge + detection step, which is what keeps the
//! registry and detector of a region consistent with each other.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use beaconzone_core::{
    BeaconzoneError, Config, Notification, RangingSession, Result, ZoneDirectory,
};
use tokio::sync::{mpsc, RwLock};

use crate::sink::{ChannelSink, SinkMessage};

/// Shared, lockable application state.
pub type SharedState = Arc<RwLock<AppState>>;

/// Bounded log of rendered notifications, newest first.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    capacity: usize,
    entries: VecDeque<Notification>,
}

impl NotificationLog {
    /// Create a log keeping at most `capacity` notifications.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a notification, dropping the oldest when full.
    pub fn push(&mut self, notification: Notification) {
        self.entries.push_front(notification);
        self.entries.truncate(self.capacity);
    }

    /// Up to `limit` notifications, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Number of stored notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Application state.
pub struct AppState {
    /// Loaded configuration.
    pub config: Config,

    /// Where the configuration was loaded from.
    pub config_path: Option<PathBuf>,

    /// Zone names and messages.
    pub zones: ZoneDirectory,

    /// One ranging session per configured region, in configuration order.
    pub sessions: Vec<RangingSession>,

    /// Sink handed to every session.
    pub sink: ChannelSink,

    /// Notifications rendered by the notification worker.
    pub notifications: NotificationLog,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// Returns the state together with the receiving end of the sink channel,
    /// which must be handed to [`crate::sink::run_notification_worker`].
    #[must_use]
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
    ) -> (Self, mpsc::UnboundedReceiver<SinkMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sessions = config
            .regions
            .iter()
            .cloned()
            .map(|region| RangingSession::new(region, &config.detector))
            .collect();

        let state = Self {
            zones: ZoneDirectory::new(config.zones.iter().cloned()),
            notifications: NotificationLog::new(config.server.recent_event_capacity),
            sessions,
            sink: ChannelSink::new(tx),
            config_path,
            config,
        };
        (state, rx)
    }

    /// Wrap into [`SharedState`].
    #[must_use]
    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Session for a region id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegion` if no such region is configured.
    pub fn session(&self, region_id: &str) -> Result<&RangingSession> {
        self.sessions
            .iter()
            .find(|s| s.region().id == region_id)
            .ok_or_else(|| BeaconzoneError::UnknownRegion(region_id.to_string()))
    }

    /// Mutable session for a region id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegion` if no such region is configured.
    pub fn session_mut(&mut self, region_id: &str) -> Result<&mut RangingSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.region().id == region_id)
            .ok_or_else(|| BeaconzoneError::UnknownRegion(region_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beaconzone_core::{RegionEventKind, DEFAULT_REGION_ID};
    use chrono::Utc;

    fn notification(group_id: u16) -> Notification {
        Notification {
            id: uuid_like(group_id),
            region_id: DEFAULT_REGION_ID.to_string(),
            kind: RegionEventKind::Enter,
            group_id,
            zone_name: "Unknown".to_string(),
            message: "Unknown place".to_string(),
            identifier: "AA".to_string(),
            distance_m: Some(1.0),
            occurred_at_utc: Utc::now(),
        }
    }

    fn uuid_like(n: u16) -> uuid::Uuid {
        uuid::Uuid::from_u128(u128::from(n))
    }

    #[test]
    fn test_notification_log_is_bounded_and_newest_first() {
        let mut log = NotificationLog::new(2);
        log.push(notification(1));
        log.push(notification(2));
        log.push(notification(3));

        let groups: Vec<u16> = log.recent(10).iter().map(|n| n.group_id).collect();
        assert_eq!(groups, vec![3, 2]);
        assert_eq!(log.recent(1).len(), 1);
    }

    #[test]
    fn test_sessions_follow_config_regions() {
        let (state, _rx) = AppState::new(Config::default(), None);
        assert_eq!(state.sessions.len(), 1);
        assert!(state.session(DEFAULT_REGION_ID).is_ok());
        assert!(matches!(
            state.session("lobby"),
            Err(BeaconzoneError::UnknownRegion(_))
        ));
    }
}
