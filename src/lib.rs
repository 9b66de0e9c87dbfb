//! Daily screen-time tally for your terminal. A small daemon counts one
//! second for every second the session is visible and focused, rolls the
//! counter over at local midnight, and keeps the running total in a single
//! on-disk record that the cli can print at any time.
//!

pub mod cli;
pub mod daemon;
pub mod session_api;
pub mod utils;
