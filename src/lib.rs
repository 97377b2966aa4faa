//! Recognition gap analysis for Toastmasters areas and divisions.
//!
//! The core is [`gap::compute_gap_analysis`], a pure function over club
//! counts. Everything else (district rollups, history, output, the REST
//! API) consumes its result.

pub mod alert;
pub mod config;
pub mod display;
pub mod district;
pub mod gap;
pub mod output;
pub mod program;
pub mod server;
pub mod snapshot;
pub mod validate;
