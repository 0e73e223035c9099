//! Integration tests for Shutterbook.
//!
//! # Running Tests
//!
//! The tests in `tests/` drive a running server over HTTP and are ignored by
//! default. To run them:
//!
//! ```bash
//! # Start a database and the server
//! docker compose up -d postgres
//! cargo run -p shutterbook-web &
//!
//! # Run the ignored end-to-end flows
//! cargo test -p shutterbook-integration-tests -- --ignored
//! ```
//!
//! `SHUTTERBOOK_TEST_BASE_URL` overrides the target server (default
//! `http://localhost:3005`).
//!
//! # Test Categories
//!
//! - `auth_flows` - signup validation, login, cookie issuance
//! - `post_flows` - post quota, deletion, like toggling
//!
//! The flows also document the accepted quota race: the server checks the
//! post count and then inserts without transactional isolation, so two
//! concurrent creates can both pass the check. The suite asserts sequential
//! behavior only.
