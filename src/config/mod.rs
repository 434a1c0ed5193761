//! # Configuration
//!
//! Settings are layered, later sources winning:
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/{RUN_ENV}.toml`
//! 3. `APP__SECTION__KEY` environment variables (a `.env` file is read first)
//! 4. the conventional `DATABASE_URL`, `SERVER_HOST` and `SERVER_PORT`
//!
//! ```rust,ignore
//! use institute_server::config::Settings;
//!
//! let settings = Settings::load()?;
//! let limit = settings.pagination.resolve_limit(Some(500)); // clamped to max_limit
//! ```

mod settings;

pub use settings::*;
