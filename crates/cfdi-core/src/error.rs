//! Error types and stable error codes for cfdi.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Machine-readable error codes surfaced with every fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvoicesDirMissing,
    ConfigParseError,
    DocumentUnreadable,
    MalformedXml,
    MissingAttribute,
    InvalidAmount,
    InvalidDate,
    InvalidExchangeRate,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvoicesDirMissing => "E1001",
            Self::ConfigParseError => "E1002",
            Self::DocumentUnreadable => "E1003",
            Self::MalformedXml => "E2001",
            Self::MissingAttribute => "E2002",
            Self::InvalidAmount => "E2003",
            Self::InvalidDate => "E2004",
            Self::InvalidExchangeRate => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvoicesDirMissing => "Invoices directory not found",
            Self::ConfigParseError => "Config file parse error",
            Self::DocumentUnreadable => "Invoice document could not be read",
            Self::MalformedXml => "Invoice document is not well-formed XML",
            Self::MissingAttribute => "Invoice document is missing a required attribute",
            Self::InvalidAmount => "Invalid monetary amount",
            Self::InvalidDate => "Invalid date",
            Self::InvalidExchangeRate => "Invalid exchange rate",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvoicesDirMissing => {
                Some("Create the directory, pass it as an argument, or set [invoices] dir in .cfdi/config.toml.")
            }
            Self::ConfigParseError => Some("Fix syntax in .cfdi/config.toml and retry."),
            Self::DocumentUnreadable => Some("Check file permissions in the invoices directory."),
            Self::MalformedXml | Self::MissingAttribute => {
                Some("Remove or replace the offending file; only stamped CFDI documents are supported.")
            }
            Self::InvalidAmount | Self::InvalidDate | Self::InvalidExchangeRate => {
                Some("The document carries a malformed field; re-download it from the issuer.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Every fatal condition the core can raise.
///
/// None of these are recovered from: ingestion errors stop the run before a
/// session starts, and aggregation errors stop it mid-session.
#[derive(Debug, Error)]
pub enum CfdiError {
    #[error("invoices directory {} does not exist", .0.display())]
    InvoicesDirMissing(PathBuf),

    #[error("failed to parse config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },

    #[error("{} is missing {element}@{attribute}", path.display())]
    MissingAttribute {
        path: PathBuf,
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid amount {value:?} for {field} in {}", path.display())]
    InvalidAmount {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error(
        "invalid date {value:?} for {field} in {}, expected YYYY-MM-DDTHH:MM:SS",
        path.display()
    )]
    InvalidDate {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("invalid exchange rate {value:?} on invoice {uuid}")]
    InvalidExchangeRate { uuid: String, value: String },
}

impl CfdiError {
    /// The stable code reported alongside this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvoicesDirMissing(_) => ErrorCode::InvoicesDirMissing,
            Self::Config { .. } => ErrorCode::ConfigParseError,
            Self::Io { .. } => ErrorCode::DocumentUnreadable,
            Self::Xml { .. } => ErrorCode::MalformedXml,
            Self::MissingAttribute { .. } => ErrorCode::MissingAttribute,
            Self::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            Self::InvalidDate { .. } => ErrorCode::InvalidDate,
            Self::InvalidExchangeRate { .. } => ErrorCode::InvalidExchangeRate,
        }
    }
}

pub type Result<T> = std::result::Result<T, CfdiError>;
