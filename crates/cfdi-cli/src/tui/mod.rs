//! Terminal user interface (TUI) for cfdi.
//!
//! ## Entry points
//!
//! - [`review::run_review_tui`]: interactive invoice review with filters,
//!   live summary and a detail pane.

pub mod review;
