//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output sinks, verbosity and stream health
//!
//! # Design
//!
//! All output goes through this module. Commands write to a buffered
//! [`output::Report`]; the application shell writes usage and failure
//! messages straight to the [`output::Console`].

pub mod output;
