//! The normalized invoice record produced by ingestion.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// Fixed text layout used by CFDI for `Fecha` and `FechaTimbrado`.
pub const DATE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// One party (issuer or recipient) named on an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Party {
    pub name: String,
    pub tax_id: String,
}

/// A stamped tax invoice, immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    /// Fiscal stamp UUID assigned by the stamping service.
    pub uuid: String,
    pub folio: String,
    pub series: String,
    pub issuer: Party,
    pub recipient: Party,
    /// Recipient's declared usage code (`G01`, `G03`, ...).
    pub usage: String,
    /// `PUE` or `PPD`.
    pub payment_method: String,
    /// Two-digit payment-form code (`01`, `03`, `28`, ...).
    pub payment_form: String,
    /// `I`, `E`, `T` or `P`.
    pub document_type: String,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub currency: String,
    /// Raw exchange-rate text; empty when the document carries none.
    pub exchange_rate: String,
    pub issued_at: NaiveDateTime,
    pub stamped_at: NaiveDateTime,
}

impl Invoice {
    /// True when amounts must be multiplied by the exchange rate before
    /// being added to a base-currency summary.
    #[must_use]
    pub fn needs_conversion(&self) -> bool {
        !(self.exchange_rate.is_empty() || self.exchange_rate == "1")
    }
}

/// Sort records by issuance date ascending, keeping input order for ties.
pub fn sort_by_issue_date(invoices: &mut [Invoice]) {
    invoices.sort_by(|a, b| a.issued_at.cmp(&b.issued_at));
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{DATE_LAYOUT, Invoice, Party};
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// Builds a record with neutral defaults; tests override what they need.
    pub fn invoice(uuid: &str, total: &str) -> Invoice {
        let amount = Decimal::from_str(total).expect("test amount");
        let date = NaiveDateTime::parse_from_str("2024-01-15T10:00:00", DATE_LAYOUT)
            .expect("test date");
        Invoice {
            uuid: uuid.to_string(),
            folio: String::new(),
            series: String::new(),
            issuer: Party {
                name: "ACME SA DE CV".to_string(),
                tax_id: "AAA010101AAA".to_string(),
            },
            recipient: Party {
                name: "Juan Perez".to_string(),
                tax_id: "PEJJ800101XXX".to_string(),
            },
            usage: "G03".to_string(),
            payment_method: "PUE".to_string(),
            payment_form: "01".to_string(),
            document_type: "I".to_string(),
            subtotal: amount,
            discount: Decimal::ZERO,
            total: amount,
            currency: "MXN".to_string(),
            exchange_rate: String::new(),
            issued_at: date,
            stamped_at: date,
        }
    }
}
