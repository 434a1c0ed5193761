//! # Domain Layer
//!
//! Business entities of the institute: what is stored and how each type
//! maps onto its table. Behavior that spans entities lives in the
//! application services.

pub mod entities;

pub use entities::*;
