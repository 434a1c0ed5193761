//! HTTP API
//!
//! Routes are grouped by resource; tenant-owned resources live under
//! `/api/v1/tenant/{tenant_id}`.

pub mod extractors;
pub mod handlers;
pub mod routes;
