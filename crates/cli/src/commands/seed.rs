//! Demo-data seeding.
//!
//! Seeds go through the stores rather than raw document writes, so the
//! usual invariants apply: forced `not_contacted`/`pending` statuses,
//! medium priority, validated emails, server timestamps.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use readymix_backend::http::HttpBackend;
use readymix_stores::{InquiryStore, NewInquiry, NewOrder, OrderStore, SessionStore};

use crate::env;

/// How long to wait for the session to resolve after sign-in.
const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Sign in and create representative inquiries and orders.
///
/// # Errors
///
/// Returns an error when configuration is incomplete, credentials are
/// rejected, or any create fails.
pub async fn run(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = env::backend_config()?;
    let backend = HttpBackend::connect(&config)?;

    let session = Arc::new(SessionStore::new(backend.identity(), backend.documents()));
    let inquiries = InquiryStore::new(backend.documents(), &session);
    let orders = OrderStore::new(backend.documents(), &session);

    if !session.sign_in(email, password).await? {
        return Err("invalid staff credentials".into());
    }
    wait_for_identity(&session).await?;
    tracing::info!(email = %email, "signed in; seeding demo data");

    for inquiry in demo_inquiries() {
        let id = inquiries.submit(inquiry).await?;
        tracing::info!(inquiry = %id, "seeded inquiry");
    }

    for order in demo_orders() {
        let id = orders.add(order).await?;
        tracing::info!(order = %id, "seeded order");
    }

    session.sign_out().await?;
    tracing::info!("seeding complete");
    Ok(())
}

/// The session resolves asynchronously off the provider notification.
async fn wait_for_identity(session: &SessionStore) -> Result<(), Box<dyn std::error::Error>> {
    let deadline = tokio::time::Instant::now() + SESSION_TIMEOUT;
    while session.identity().is_none() {
        if tokio::time::Instant::now() >= deadline {
            return Err("timed out waiting for the session to resolve".into());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Ok(())
}

fn demo_inquiries() -> Vec<NewInquiry> {
    vec![
        NewInquiry {
            name: "Ann Builder".into(),
            email: "ann@builders.example".into(),
            phone: Some("+91 98765 43210".into()),
            message: "Need M25 for a raft foundation, roughly 60 cubic meters, next week.".into(),
        },
        NewInquiry {
            name: "Suresh Patel".into(),
            email: "suresh@patelinfra.example".into(),
            phone: None,
            message: "Quote for M30 with fly ash, pumped to the 4th floor.".into(),
        },
        NewInquiry {
            name: "Lena Fischer".into(),
            email: "lena@fischerbau.example".into(),
            phone: Some("+49 151 2345678".into()),
            message: "Do you deliver on Saturdays? Driveway slab, about 18 cubic meters.".into(),
        },
    ]
}

fn demo_orders() -> Vec<NewOrder> {
    vec![
        NewOrder {
            customer_name: "Ravi Constructions".into(),
            customer_email: "ravi@constructions.example".into(),
            customer_phone: Some("+91 91234 56789".into()),
            project_type: "M25 ready mix".into(),
            quantity: Decimal::new(625, 1), // 62.5 m3
            area: "Raft foundation, 420 sq m".into(),
            location: "Sector 21 site, Pune".into(),
            requirements: "Pump placement, retarder for 90 min haul".into(),
            delivery_date: None,
            estimated_value: Some(Decimal::new(412_500, 0)),
            notes: Some("Repeat customer".into()),
            assigned_to: None,
        },
        NewOrder {
            customer_name: "Patel Infra".into(),
            customer_email: "dispatch@patelinfra.example".into(),
            customer_phone: None,
            project_type: "M30 with fly ash".into(),
            quantity: Decimal::new(240, 1), // 24.0 m3
            area: "4th floor slab, 160 sq m".into(),
            location: "Hinjewadi Phase 2".into(),
            requirements: "Boom pump to 4th floor, morning pour".into(),
            delivery_date: None,
            estimated_value: Some(Decimal::new(168_000, 0)),
            notes: None,
            assigned_to: None,
        },
    ]
}
