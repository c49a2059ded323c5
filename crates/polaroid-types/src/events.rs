use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, NotificationView};

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Server confirms successful authentication
    Ready { user_id: Uuid, username: String },

    /// The complete current thread of a subscribed match. Sent on subscribe
    /// and again after every change; never a delta.
    ThreadSnapshot { match_id: Uuid, messages: Vec<Message> },

    /// A notification addressed to this user was created
    NotificationCreate { notification: NotificationView },
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Authenticate the WebSocket connection
    Identify { token: String },

    /// Replace the set of match threads this connection follows.
    Subscribe { match_ids: Vec<Uuid> },
}
