//! Application Services
//!
//! Business logic services that coordinate repository calls inside a
//! unit of work.
//!
//! ## Available Services
//!
//! - **TechnologyService**: Global technology catalogue
//! - **CourseService**: Tenant courses and their technologies
//! - **TalentService**: Tenant talents
//! - **BatchService**: Tenant batches and talent enrollment

pub mod batch_service;
pub mod course_service;
pub mod error;
pub mod talent_service;
pub mod technology_service;

pub use batch_service::{BatchService, BatchServiceImpl};
pub use course_service::{CourseService, CourseServiceImpl};
pub use error::{finish, ServiceError};
pub use talent_service::{TalentService, TalentServiceImpl};
pub use technology_service::{TechnologyService, TechnologyServiceImpl};
