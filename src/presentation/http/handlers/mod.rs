//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Services are built per request
//! from the shared pool.

pub mod batch;
pub mod course;
pub mod health;
pub mod talent;
pub mod technology;

use crate::application::dto::{ListQuery, Page};
use crate::config::PaginationSettings;

/// Turn `?limit=&offset=` into a page, applying the configured default and
/// maximum. `limit=-1` lists everything.
pub fn resolve_page(settings: &PaginationSettings, query: &ListQuery) -> Page {
    Page::new(settings.resolve_limit(query.limit), query.offset.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PaginationSettings {
        PaginationSettings {
            default_limit: 20,
            max_limit: 100,
        }
    }

    #[test]
    fn test_resolve_page_defaults() {
        assert_eq!(resolve_page(&settings(), &ListQuery::default()), Page::new(20, 0));
    }

    #[test]
    fn test_resolve_page_keeps_unbounded_and_clamps() {
        let all = ListQuery {
            limit: Some(-1),
            offset: Some(3),
            ..Default::default()
        };
        assert_eq!(resolve_page(&settings(), &all), Page::new(-1, 3));

        let huge = ListQuery {
            limit: Some(5000),
            ..Default::default()
        };
        assert_eq!(resolve_page(&settings(), &huge).limit, 100);
    }
}
