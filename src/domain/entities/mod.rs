//! # Domain Entities
//!
//! Persisted business objects. Each maps to one table through
//! [`Entity::SCHEMA`](crate::infrastructure::repositories::Entity), with
//! table and column names matching the database literally.
//!
//! - **Technology**: global lookup shared by all tenants
//! - **Course**: tenant-owned, linked to technologies
//! - **Talent**: tenant-owned learner
//! - **Batch**: tenant-owned cohort of one course, enrolling talents

mod audit;
mod batch;
mod course;
mod talent;
mod technology;

pub use audit::Audit;
pub use batch::Batch;
pub use course::Course;
pub use talent::Talent;
pub use technology::Technology;
