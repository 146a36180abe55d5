//! Utility modules for the Unwind sync core.
//!
//! # Available Utilities
//!
//! - [`datetime`] - Entry dates, timestamps and their formats

pub mod datetime;
