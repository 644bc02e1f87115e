//! Core domain types and utilities for waypost.
//!
//! This crate provides the identifier types and the error handling
//! foundation shared by the store, workflow and scheduler crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EdgeId, NodeId, ParseIdError};
