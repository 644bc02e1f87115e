//! Error handling foundation for waypost.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Library crates return their own plain error enums; the application
//! layer wraps them in a `Report` as they cross into it.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
