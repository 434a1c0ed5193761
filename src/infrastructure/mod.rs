//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database pool, migrations and unit of work (PostgreSQL)
//! - The generic entity repository
//! - The background event queue

pub mod database;
pub mod events;
pub mod repositories;
