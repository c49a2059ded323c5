use polaroid_types::models::NotificationView;
use uuid::Uuid;

/// Where the core reports changes that live clients may want to see.
///
/// Implementations must not block: they are called from inside request
/// handling, after the change is committed.
pub trait EventSink: Send + Sync {
    /// A notification addressed to `notification.to_user_id` was stored.
    fn notification_created(&self, notification: &NotificationView);

    /// The message thread of `match_id` changed (new message or read marks).
    fn thread_updated(&self, match_id: Uuid);
}
