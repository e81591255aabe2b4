//! Financial summary over a subset of invoices.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::Dimension;
use crate::error::{CfdiError, Result};
use crate::invoice::Invoice;

/// Base-currency totals for a set of invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub count: usize,
}

impl Summary {
    /// Mean total per invoice, `None` for an empty summary.
    #[must_use]
    pub fn average(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        Some(self.total / Decimal::from(self.count))
    }
}

/// Multiplier that converts `invoice` amounts to the base currency.
///
/// # Errors
///
/// Returns [`CfdiError::InvalidExchangeRate`] when the rate text is not a
/// decimal number.
pub fn conversion_rate(invoice: &Invoice) -> Result<Decimal> {
    if !invoice.needs_conversion() {
        return Ok(Decimal::ONE);
    }
    Decimal::from_str(invoice.exchange_rate.trim()).map_err(|_| CfdiError::InvalidExchangeRate {
        uuid: invoice.uuid.clone(),
        value: invoice.exchange_rate.clone(),
    })
}

/// Sum subtotal, discount and total over `invoices`, converting foreign
/// currency amounts with each invoice's exchange rate.
///
/// # Errors
///
/// Fails on the first invoice whose exchange rate cannot be parsed. A partial
/// sum is never returned.
pub fn summarize(invoices: &[Invoice]) -> Result<Summary> {
    let mut summary = Summary {
        count: invoices.len(),
        ..Summary::default()
    };

    for invoice in invoices {
        let rate = conversion_rate(invoice)?;
        summary.subtotal += invoice.subtotal * rate;
        summary.discount += invoice.discount * rate;
        summary.total += invoice.total * rate;
    }

    Ok(summary)
}

/// Number of invoices per code of `dimension`, ordered by code.
#[must_use]
pub fn count_by(dimension: Dimension, invoices: &[Invoice]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for invoice in invoices {
        *counts.entry(dimension.field(invoice).to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::invoice::fixtures::invoice;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_input_is_a_zero_summary() {
        let summary = summarize(&[]).expect("summary");
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.average(), None);
    }

    #[test]
    fn unit_rate_contributes_raw_amounts() {
        let mut inv = invoice("a", "100.00");
        inv.exchange_rate = "1".to_string();
        let summary = summarize(&[inv]).expect("summary");
        assert_eq!(summary.subtotal, dec!(100.00));
        assert_eq!(summary.total, dec!(100.00));
        assert_eq!(summary.count, 1);
    }

    #[test]
    fn foreign_amounts_are_multiplied_by_rate() {
        let mut usd = invoice("usd", "100");
        usd.subtotal = dec!(90);
        usd.discount = dec!(5);
        usd.exchange_rate = "2".to_string();
        usd.currency = "USD".to_string();
        let mxn = invoice("mxn", "10");

        let summary = summarize(&[usd, mxn]).expect("summary");
        assert_eq!(summary.total, dec!(210));
        assert_eq!(summary.subtotal, dec!(190));
        assert_eq!(summary.discount, dec!(10));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average(), Some(dec!(105)));
    }

    #[test]
    fn fractional_rate_keeps_decimal_precision() {
        let mut usd = invoice("usd", "10.10");
        usd.exchange_rate = "17.2345".to_string();
        let summary = summarize(&[usd]).expect("summary");
        assert_eq!(summary.total, dec!(174.068450));
    }

    #[test]
    fn malformed_rate_is_fatal() {
        let mut bad = invoice("bad", "10");
        bad.exchange_rate = "uno".to_string();
        let err = summarize(&[invoice("ok", "1"), bad]).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::InvalidExchangeRate);
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn counts_group_by_field_value() {
        let mut a = invoice("a", "1");
        a.payment_form = "28".to_string();
        let b = invoice("b", "1");
        let c = invoice("c", "1");
        let counts = count_by(Dimension::PaymentForm, &[a, b, c]);
        assert_eq!(counts.get("01"), Some(&2));
        assert_eq!(counts.get("28"), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
