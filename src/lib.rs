// SPDX-License-Identifier: MIT

//! Polyfill for the `:where(condition)` pseudo-class.
//!
//! Stylesheets are expected to have been rewritten so that each condition is
//! a synthetic class such as `.where-width-lt-500px`. The engine scans the
//! stylesheets once, compiles every condition class into a predicate over
//! computed style, and then periodically toggles those classes on the
//! elements selected by the rest of each selector.

pub mod config;
pub mod error;
pub mod host;
pub mod polyfill;

pub use config::EngineConfig;
pub use error::{HostError, WhereError};
pub use polyfill::engine::{Engine, SchedulerHandle};
