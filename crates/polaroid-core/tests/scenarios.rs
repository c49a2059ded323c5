//! End-to-end swipe and match flows against an in-memory database.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use polaroid_core::{EventSink, Page, Service, Settings};
use polaroid_db::Database;
use polaroid_types::api::CreateCardRequest;
use polaroid_types::models::{Card, NotificationKind, NotificationView, SwipeKind};
use uuid::Uuid;

#[derive(Default)]
struct Inbox {
    delivered: Mutex<Vec<NotificationView>>,
}

impl Inbox {
    fn kinds_for(&self, user_id: Uuid) -> Vec<&'static str> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.notification.to_user_id == user_id)
            .map(|n| n.notification.kind.as_str())
            .collect()
    }
}

impl EventSink for Inbox {
    fn notification_created(&self, notification: &NotificationView) {
        self.delivered.lock().unwrap().push(notification.clone());
    }

    fn thread_updated(&self, _match_id: Uuid) {}
}

fn setup() -> (Service, Arc<Inbox>) {
    let inbox = Arc::new(Inbox::default());
    let db = Database::open_in_memory().unwrap();
    (Service::new(db, inbox.clone(), Settings::default()), inbox)
}

fn register(svc: &Service, name: &str) -> Uuid {
    svc.register(name, &format!("{}@example.com", name), "hash")
        .unwrap()
        .id
}

fn upload(svc: &Service, owner_id: Uuid, title: &str) -> Card {
    svc.create_card(
        owner_id,
        CreateCardRequest {
            actor: "Kim Rihyun".into(),
            title: title.into(),
            image_ref: "data:image/jpeg;base64,AAAA".into(),
            description: String::new(),
            filter: Default::default(),
        },
    )
    .unwrap()
}

#[test]
fn mutual_like_creates_one_match_with_both_card_lists() {
    let (svc, inbox) = setup();
    let a1 = register(&svc, "alice");
    let b1 = register(&svc, "bobby");
    let c1 = upload(&svc, b1, "c1");
    let c2 = upload(&svc, a1, "c2");

    let first = svc.swipe(b1, c2.id, SwipeKind::Like).unwrap();
    assert_eq!(first.match_id, None);

    let second = svc.swipe(a1, c1.id, SwipeKind::Like).unwrap();
    let match_id = second.match_id.expect("mutual like should match");

    let matches = svc.list_matches(a1).unwrap();
    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.id, match_id);
    assert_eq!(m.user_a_id, a1);
    assert_eq!(m.user_b_id, b1);
    assert_eq!(m.user_a_matching_card_ids, vec![c1.id]);
    assert_eq!(m.user_b_matching_card_ids, vec![c2.id]);

    assert_eq!(inbox.kinds_for(a1), vec!["like", "match"]);
    assert_eq!(inbox.kinds_for(b1), vec!["like", "match"]);

    let stored = svc.list_notifications(b1).unwrap();
    assert!(stored.iter().any(|n| n.notification.kind == NotificationKind::Match { match_id }));
}

#[test]
fn bookmarks_and_rejects_never_match() {
    let (svc, inbox) = setup();
    let a1 = register(&svc, "alice");
    let b1 = register(&svc, "bobby");
    let c1 = upload(&svc, b1, "c1");
    let c2 = upload(&svc, a1, "c2");

    svc.swipe(b1, c2.id, SwipeKind::Bookmark).unwrap();
    let outcome = svc.swipe(a1, c1.id, SwipeKind::Like).unwrap();

    assert_eq!(outcome.match_id, None);
    assert!(svc.list_matches(b1).unwrap().is_empty());
    assert_eq!(inbox.kinds_for(b1), vec!["like"]);
    assert!(inbox.kinds_for(a1).is_empty());
}

#[test]
fn changing_a_like_to_reject_keeps_one_swipe() {
    let (svc, _) = setup();
    let a1 = register(&svc, "alice");
    let b1 = register(&svc, "bobby");
    let c1 = upload(&svc, b1, "c1");

    let liked = svc.swipe(a1, c1.id, SwipeKind::Like).unwrap();
    let rejected = svc.swipe(a1, c1.id, SwipeKind::Reject).unwrap();

    assert_eq!(liked.swipe_id, rejected.swipe_id);
    assert!(svc.swiped_cards(a1, SwipeKind::Like).unwrap().is_empty());
    let rejected_cards = svc.swiped_cards(a1, SwipeKind::Reject).unwrap();
    assert_eq!(rejected_cards.len(), 1);
    assert_eq!(rejected_cards[0].card.id, c1.id);
}

#[test]
fn feed_pages_through_unswiped_cards() {
    let (svc, _) = setup();
    let viewer = register(&svc, "viewer");
    let owner = register(&svc, "owner");
    upload(&svc, viewer, "mine");
    for i in 0..5 {
        upload(&svc, owner, &format!("card{}", i));
    }

    let first = svc
        .get_feed(viewer, Page { limit: Some(3), ..Page::default() })
        .unwrap();
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|c| c.card.owner_id == owner && c.owner_username == "owner"));

    let rest = svc
        .get_feed(viewer, Page::after(&first[2].card, Some(3)))
        .unwrap();
    assert_eq!(rest.len(), 2);

    let mut seen: Vec<_> = first.iter().chain(&rest).map(|c| c.card.id).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[test]
fn racing_likes_produce_exactly_one_match() {
    for _ in 0..20 {
        let (svc, inbox) = setup();
        let a1 = register(&svc, "alice");
        let b1 = register(&svc, "bobby");
        let c1 = upload(&svc, b1, "c1");
        let c2 = upload(&svc, a1, "c2");

        let svc = Arc::new(svc);
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [(a1, c1.id), (b1, c2.id)]
            .into_iter()
            .map(|(user, card)| {
                let svc = svc.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    svc.swipe(user, card, SwipeKind::Like).unwrap()
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(svc.list_matches(a1).unwrap().len(), 1);
        let ids: Vec<_> = outcomes.iter().filter_map(|o| o.match_id).collect();
        assert!(!ids.is_empty());
        assert!(ids.windows(2).all(|w| w[0] == w[1]));

        let match_notes = |user| inbox.kinds_for(user).iter().filter(|k| **k == "match").count();
        assert_eq!(match_notes(a1), 1);
        assert_eq!(match_notes(b1), 1);
    }
}

#[test]
fn racing_repeat_likes_notify_the_owner_once() {
    for _ in 0..20 {
        let (svc, inbox) = setup();
        let a1 = register(&svc, "alice");
        let b1 = register(&svc, "bobby");
        let c1 = upload(&svc, b1, "c1");

        let svc = Arc::new(svc);
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let svc = svc.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    svc.swipe(a1, c1.id, SwipeKind::Like).unwrap()
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes[0].swipe_id, outcomes[1].swipe_id);
        assert_eq!(inbox.kinds_for(b1), vec!["like"]);
    }
}
