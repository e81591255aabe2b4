//! cfdi-core library.
//!
//! Loads stamped CFDI invoices, narrows them through a chain of
//! per-dimension filters, and aggregates the visible subset. The
//! [`session::ReviewSession`] ties these together behind an input-driven
//! state machine that front ends render.
//!
//! # Conventions
//!
//! - **Errors**: fallible operations return [`error::Result`].
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod invoice;
pub mod payments;
pub mod selection;
pub mod session;
pub mod summary;

pub use error::{CfdiError, ErrorCode, Result};
pub use invoice::{Invoice, Party};
pub use session::{Effect, Focus, Input, ReviewSession};
pub use summary::Summary;
