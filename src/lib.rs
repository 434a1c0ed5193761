//! # Institute Server Library
//!
//! A multi-tenant training-institute back end:
//! - RESTful HTTP API for technologies, courses, talents and batches
//! - A generic, tenant-scoped repository over PostgreSQL
//! - Unit-of-work transaction scoping
//! - A bounded background event pool for notifications
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities and their table schemas
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, generic repository, event pool
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! institute_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities and schemas
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, repositories and events
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
