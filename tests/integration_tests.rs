//! HTTP API tests.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.
//! Database-backed cases need `DATABASE_URL`; see `common`.

mod api;
mod common;
