//! Response DTOs
//!
//! Entities serialize directly; these cover the responses that are not a
//! single entity.

use serde::Serialize;
use uuid::Uuid;

/// Result of a batch enrollment change.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub batch_id: Uuid,
    pub talent_ids: Vec<Uuid>,
}

/// Body returned by delete endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: Uuid) -> Self {
        Self { id, deleted: true }
    }
}
