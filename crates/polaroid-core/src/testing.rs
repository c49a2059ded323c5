//! Helpers shared by the unit tests.

use std::sync::{Arc, Mutex};

use polaroid_db::Database;
use polaroid_types::api::CreateCardRequest;
use polaroid_types::models::{Card, CardFilter, NotificationView, SwipeKind};
use uuid::Uuid;

use crate::{EventSink, Service, Settings};

/// Remembers every event instead of delivering it.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<NotificationView>>,
    thread_updates: Mutex<Vec<Uuid>>,
}

impl RecordingSink {
    pub fn notifications_for(&self, user_id: Uuid) -> Vec<NotificationView> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.notification.to_user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn thread_updates(&self, match_id: Uuid) -> usize {
        self.thread_updates
            .lock()
            .unwrap()
            .iter()
            .filter(|id| **id == match_id)
            .count()
    }
}

impl EventSink for RecordingSink {
    fn notification_created(&self, notification: &NotificationView) {
        self.notifications.lock().unwrap().push(notification.clone());
    }

    fn thread_updated(&self, match_id: Uuid) {
        self.thread_updates.lock().unwrap().push(match_id);
    }
}

pub fn service() -> (Service, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let db = Database::open_in_memory().unwrap();
    let svc = Service::new(db, sink.clone(), Settings::default());
    (svc, sink)
}

/// Inserts directly so short fixture names skip registration rules.
pub fn user(svc: &Service, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    svc.db()
        .create_user(id, username, &format!("{}@example.com", username), "hash")
        .unwrap();
    id
}

pub fn card(svc: &Service, owner_id: Uuid, title: &str) -> Card {
    svc.create_card(
        owner_id,
        CreateCardRequest {
            actor: "Kim Rihyun".into(),
            title: title.into(),
            image_ref: "data:image/jpeg;base64,AAAA".into(),
            description: String::new(),
            filter: CardFilter::None,
        },
    )
    .unwrap()
}

/// Users "a" and "b" with a match between them.
pub fn matched_pair(svc: &Service) -> (Uuid, Uuid, Uuid) {
    let a = user(svc, "a");
    let b = user(svc, "b");
    let c1 = card(svc, b, "c1");
    let c2 = card(svc, a, "c2");
    svc.swipe(b, c2.id, SwipeKind::Like).unwrap();
    let match_id = svc.swipe(a, c1.id, SwipeKind::Like).unwrap().match_id.unwrap();
    (a, b, match_id)
}
