//! End-to-end store lifecycle over the in-memory backend adapters.
//!
//! Exercises the whole flow a working day goes through: a visitor submits
//! an inquiry, staff sign in and watch it arrive live, derive an order,
//! work it to completion, and sign out.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use readymix_backend::memory::{MemoryDocumentStore, MemoryIdentityProvider};
use readymix_backend::{DocumentStore, IdentityProvider};
use readymix_core::{InquiryStatus, OrderStatus, Priority};
use readymix_stores::{
    InquiryPatch, InquiryStore, NewInquiry, NewOrder, OrderPatch, OrderStore, SessionStore,
};

const STAFF_EMAIL: &str = "ops@readymix.example";
const STAFF_PASSWORD: &str = "pour-it-right";

struct World {
    documents: MemoryDocumentStore,
    session: Arc<SessionStore>,
    inquiries: InquiryStore,
    orders: OrderStore,
}

fn world() -> World {
    let provider = Arc::new(MemoryIdentityProvider::new());
    provider.register(STAFF_EMAIL, STAFF_PASSWORD, Some("Ops"));
    let documents = MemoryDocumentStore::new();

    let shared: Arc<dyn DocumentStore> = Arc::new(documents.clone());
    let session = Arc::new(SessionStore::new(
        Arc::clone(&provider) as Arc<dyn IdentityProvider>,
        Arc::clone(&shared),
    ));
    let inquiries = InquiryStore::new(Arc::clone(&shared), &session);
    let orders = OrderStore::new(shared, &session);

    World {
        documents,
        session,
        inquiries,
        orders,
    }
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within timeout");
}

fn walk_in_inquiry() -> NewInquiry {
    NewInquiry {
        name: "Ann Builder".into(),
        email: "ann@builders.example".into(),
        phone: Some("+91 98765 43210".into()),
        message: "Need M25 for a raft foundation next week.".into(),
    }
}

fn derived_order() -> NewOrder {
    NewOrder {
        customer_name: "Ann Builder".into(),
        customer_email: "ann@builders.example".into(),
        customer_phone: Some("+91 98765 43210".into()),
        project_type: "M25 ready mix".into(),
        quantity: Decimal::new(600, 1),
        area: "Raft foundation, 400 sq m".into(),
        location: "Baner site, Pune".into(),
        requirements: "Pump placement".into(),
        delivery_date: None,
        estimated_value: Some(Decimal::new(396_000, 0)),
        notes: None,
        assigned_to: None,
    }
}

#[tokio::test]
async fn test_full_working_day() {
    let w = world();

    // A visitor submits an inquiry with no session anywhere.
    let inquiry_id = w.inquiries.submit(walk_in_inquiry()).await.expect("public submit");

    // Staff sign in; both live subscriptions open and the inquiry is there.
    assert!(w.session.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await.expect("sign in"));
    wait_for(|| w.inquiries.inquiries().len() == 1).await;
    wait_for(|| w.documents.listener_count() == 2).await;

    let inquiry = &w.inquiries.inquiries()[0];
    assert_eq!(inquiry.status, InquiryStatus::NotContacted);
    assert_eq!(inquiry.priority, Priority::Medium);

    // Work the inquiry, derive an order from it.
    w.inquiries
        .update(
            &inquiry_id,
            InquiryPatch {
                status: Some(InquiryStatus::InProgress),
                notes: Some("Quoted on the phone".into()),
                ..InquiryPatch::default()
            },
        )
        .await
        .expect("inquiry update");

    let order_id = w.orders.add(derived_order()).await.expect("order add");
    wait_for(|| w.orders.orders().len() == 1).await;
    assert_eq!(w.orders.orders()[0].status, OrderStatus::Pending);
    assert_eq!(w.orders.stats().pending, 1);

    // Deliver and complete.
    w.orders
        .update(
            &order_id,
            OrderPatch {
                status: Some(OrderStatus::Completed),
                ..OrderPatch::default()
            },
        )
        .await
        .expect("order update");
    w.inquiries
        .update(
            &inquiry_id,
            InquiryPatch {
                status: Some(InquiryStatus::Completed),
                ..InquiryPatch::default()
            },
        )
        .await
        .expect("inquiry close");

    wait_for(|| w.orders.stats().completed == 1).await;
    assert_eq!(w.orders.completed_revenue(), Decimal::new(396_000, 0));
    wait_for(|| w.inquiries.inquiries()[0].status == InquiryStatus::Completed).await;

    // Sign out: both lists clear, both subscriptions tear down exactly once.
    w.session.sign_out().await.expect("sign out");
    wait_for(|| w.inquiries.inquiries().is_empty() && w.orders.orders().is_empty()).await;
    wait_for(|| w.documents.listener_count() == 0).await;
    assert_eq!(w.documents.teardown_count(), 2);
}

#[tokio::test]
async fn test_second_admin_session_sees_changes_live() {
    let w = world();

    // A second staff member's stores over the same backend collections.
    let provider_b = Arc::new(MemoryIdentityProvider::new());
    provider_b.register(STAFF_EMAIL, STAFF_PASSWORD, None);
    let shared: Arc<dyn DocumentStore> = Arc::new(w.documents.clone());
    let session_b = Arc::new(SessionStore::new(
        Arc::clone(&provider_b) as Arc<dyn IdentityProvider>,
        Arc::clone(&shared),
    ));
    let inquiries_b = InquiryStore::new(shared, &session_b);

    assert!(w.session.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await.expect("sign in a"));
    assert!(session_b.sign_in(STAFF_EMAIL, STAFF_PASSWORD).await.expect("sign in b"));

    // Session A submits; session B sees it with no refresh call.
    w.inquiries.submit(walk_in_inquiry()).await.expect("submit");
    wait_for(|| inquiries_b.inquiries().len() == 1).await;

    // Session A deletes; session B's list empties as the snapshot lands.
    let id = inquiries_b.inquiries()[0].id.clone();
    w.inquiries.remove(&id).await.expect("remove");
    wait_for(|| inquiries_b.inquiries().is_empty()).await;
}

#[tokio::test]
async fn test_unauthenticated_store_pair_stays_empty() {
    let w = world();

    // Public submission works, but with nobody signed in neither store
    // opens a subscription or exposes any data.
    w.inquiries.submit(walk_in_inquiry()).await.expect("submit");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(w.inquiries.inquiries().is_empty());
    assert!(w.orders.orders().is_empty());
    assert_eq!(w.documents.listener_count(), 0);
    assert_eq!(w.orders.stats().total, 0);
}
