//! End-to-end tests of `ApiClient` against a mocked org.
//!
//! Run with:
//!   cargo test --test integration

#[path = "integration/common.rs"]
mod common;
#[path = "integration/rest.rs"]
mod rest;
#[path = "integration/session.rs"]
mod session;
#[path = "integration/soap.rs"]
mod soap;
