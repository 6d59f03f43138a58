//! Integration tests for ReadyMix.
//!
//! # Test Categories
//!
//! - `store_lifecycle` - end-to-end store behavior over the in-memory
//!   backend adapters; runs everywhere with no external services
//! - `site_contact` - HTTP tests against a running site binary (`#[ignore]`d)
//! - `admin_api` - HTTP tests against a running admin binary (`#[ignore]`d)
//!
//! # Running Tests
//!
//! ```bash
//! # Adapter-backed tests (no services needed)
//! cargo test -p readymix-integration-tests
//!
//! # HTTP tests against running binaries
//! cargo run -p readymix-site &
//! cargo run -p readymix-admin &
//! cargo test -p readymix-integration-tests -- --ignored
//! ```
//!
//! The HTTP tests read `SITE_BASE_URL` / `ADMIN_BASE_URL` (defaults
//! `http://localhost:3000` / `http://localhost:3001`) and staff
//! credentials from `READYMIX_STAFF_EMAIL` / `READYMIX_STAFF_PASSWORD`.
