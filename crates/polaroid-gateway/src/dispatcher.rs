use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use polaroid_core::EventSink;
use polaroid_types::events::GatewayEvent;
use polaroid_types::models::NotificationView;
use tokio::sync::{broadcast, mpsc};
use tracing::{trace, warn};
use uuid::Uuid;

/// Routes core events to connected clients.
///
/// Thread changes go out on one broadcast channel carrying only the match id;
/// each connection re-reads the threads it follows. Notifications are
/// targeted at every open connection of the recipient.
///
/// Locks are std locks held only for map access, so the [`EventSink`] calls
/// coming from blocking request handlers never wait on the runtime.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Match ids whose thread changed
    thread_tx: broadcast::Sender<Uuid>,

    /// Per-user targeted send channels: user_id -> (conn_id -> sender)
    user_channels: RwLock<HashMap<Uuid, HashMap<Uuid, mpsc::UnboundedSender<GatewayEvent>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (thread_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                thread_tx,
                user_channels: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Receive the ids of matches whose thread changed.
    pub fn subscribe_threads(&self) -> broadcast::Receiver<Uuid> {
        self.inner.thread_tx.subscribe()
    }

    /// Register a connection's outbound channel. Returns its conn_id.
    pub fn register_connection(&self, user_id: Uuid, tx: mpsc::UnboundedSender<GatewayEvent>) -> Uuid {
        let conn_id = Uuid::new_v4();
        match self.inner.user_channels.write() {
            Ok(mut channels) => {
                channels.entry(user_id).or_default().insert(conn_id, tx);
            }
            Err(e) => warn!("User channel lock poisoned: {}", e),
        }
        conn_id
    }

    pub fn unregister_connection(&self, user_id: Uuid, conn_id: Uuid) {
        let Ok(mut channels) = self.inner.user_channels.write() else {
            return;
        };
        if let Some(conns) = channels.get_mut(&user_id) {
            conns.remove(&conn_id);
            if conns.is_empty() {
                channels.remove(&user_id);
            }
        }
    }

    /// Send a targeted event to every connection of a user.
    pub fn send_to_user(&self, user_id: Uuid, event: GatewayEvent) {
        let Ok(channels) = self.inner.user_channels.read() else {
            return;
        };
        if let Some(conns) = channels.get(&user_id) {
            for tx in conns.values() {
                let _ = tx.send(event.clone());
            }
        }
    }

    pub fn connection_count(&self, user_id: Uuid) -> usize {
        self.inner
            .user_channels
            .read()
            .map(|c| c.get(&user_id).map_or(0, HashMap::len))
            .unwrap_or(0)
    }
}

impl EventSink for Dispatcher {
    fn notification_created(&self, notification: &NotificationView) {
        let to = notification.notification.to_user_id;
        trace!("Pushing {} notification to {}", notification.notification.kind.as_str(), to);
        self.send_to_user(
            to,
            GatewayEvent::NotificationCreate {
                notification: notification.clone(),
            },
        );
    }

    fn thread_updated(&self, match_id: Uuid) {
        // No receivers just means nobody is connected.
        let _ = self.inner.thread_tx.send(match_id);
    }
}
