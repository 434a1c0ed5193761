//! Application Layer
//!
//! One service per module (technologies, courses, talents, batches). Each
//! operation runs inside a single unit of work and is generic over the
//! repository, so tests can swap in another implementation.

pub mod dto;
pub mod services;
