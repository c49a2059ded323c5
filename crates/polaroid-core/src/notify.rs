use polaroid_db::models::now;
use polaroid_types::models::{Notification, NotificationKind, NotificationView, UNKNOWN_USERNAME};
use tracing::warn;
use uuid::Uuid;

use crate::{Result, Service};

impl Service {
    /// Store a notification and push it to the recipient's live connections.
    pub fn notify(&self, to_user_id: Uuid, from_user_id: Uuid, kind: NotificationKind) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            to_user_id,
            from_user_id,
            kind,
            is_read: false,
            created_at: now(),
        };
        self.db.insert_notification(&notification)?;

        self.events.notification_created(&NotificationView {
            notification: notification.clone(),
            from_username: self.username_or_placeholder(from_user_id),
        });

        Ok(notification)
    }

    /// The user's notifications, newest first.
    pub fn list_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationView>> {
        Ok(self.db.get_notifications(user_id)?)
    }

    pub fn mark_notifications_read(&self, user_id: Uuid) -> Result<usize> {
        self.authenticated(user_id)?;
        Ok(self.db.mark_notifications_read(user_id)?)
    }

    /// Enrichment lookups degrade instead of failing the caller.
    pub(crate) fn username_or_placeholder(&self, user_id: Uuid) -> String {
        self.db.get_username_by_id(user_id).unwrap_or_else(|e| {
            warn!("Failed to resolve username for {}: {}", user_id, e);
            UNKNOWN_USERNAME.to_string()
        })
    }
}
