//! HTML extraction: page classification markers and listing parsers.
//!
//! Everything the crate knows about the panel's HTML lives here, behind
//! small string-in/value-out functions, so a remote markup change touches
//! this module and not the workflow operations.

pub mod listing;
pub mod markers;
