//! Payment complement (`Pagos`) report.
//!
//! Receipts of type `P` list the documents they settle. The report sorts
//! receipts by their first payment date and groups them by calendar month.

use std::path::Path;

use chrono::{Datelike, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{CfdiError, Result};
use crate::ingest::{Attributes, Element, attributes, read_document, xml_files};

/// One settled document inside a payment receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentLine {
    pub paid_at: NaiveDateTime,
    pub amount: Decimal,
    /// Folio of the related invoice.
    pub folio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    pub issuer: String,
    pub recipient: String,
    pub issued_at: NaiveDateTime,
    pub lines: Vec<PaymentLine>,
}

impl PaymentReceipt {
    #[must_use]
    pub fn first_payment(&self) -> Option<NaiveDateTime> {
        self.lines.first().map(|line| line.paid_at)
    }

    #[must_use]
    pub fn total_paid(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// Receipts whose first payment falls in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPayments {
    pub year: i32,
    pub month: u32,
    pub receipts: Vec<PaymentReceipt>,
    pub total_paid: Decimal,
    /// Number of paid documents across all receipts of the month.
    pub documents: usize,
}

/// Parse a payment receipt. Returns `None` for documents that are not of
/// type `P` or carry no `Pagos` complement.
///
/// # Errors
///
/// Malformed markup, missing `Fecha`/`FechaPago`/`ImpPagado`, or
/// unparseable dates and amounts.
pub fn parse_payment(xml: &str, path: &Path) -> Result<Option<PaymentReceipt>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut voucher: Option<Attributes> = None;
    let mut issuer: Option<Attributes> = None;
    let mut recipient: Option<Attributes> = None;
    let mut has_complement = false;
    let mut paid_at: Option<NaiveDateTime> = None;
    let mut lines = Vec::new();
    let empty = Attributes::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"Comprobante" if voucher.is_none() => voucher = Some(attributes(e, path)?),
                b"Emisor" if issuer.is_none() => issuer = Some(attributes(e, path)?),
                b"Receptor" if recipient.is_none() => recipient = Some(attributes(e, path)?),
                b"Pagos" => has_complement = true,
                b"Pago" => {
                    let attrs = attributes(e, path)?;
                    paid_at = Some(Element::new("Pago", Some(&attrs), &empty, path).date("FechaPago")?);
                }
                b"DoctoRelacionado" => {
                    let attrs = attributes(e, path)?;
                    let docto = Element::new("DoctoRelacionado", Some(&attrs), &empty, path);
                    let Some(paid_at) = paid_at else {
                        return Err(CfdiError::Xml {
                            path: path.to_path_buf(),
                            message: "DoctoRelacionado outside of a Pago element".to_string(),
                        });
                    };
                    lines.push(PaymentLine {
                        paid_at,
                        amount: docto.amount("ImpPagado")?,
                        folio: docto.optional("Folio"),
                    });
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CfdiError::Xml {
                    path: path.to_path_buf(),
                    message: format!("at byte {}: {e}", reader.buffer_position()),
                });
            }
        }
    }

    let Some(voucher) = voucher else {
        return Ok(None);
    };
    let voucher = Element::new("Comprobante", Some(&voucher), &empty, path);
    if voucher.optional("TipoDeComprobante") != "P" || !has_complement {
        return Ok(None);
    }

    Ok(Some(PaymentReceipt {
        issuer: Element::new("Emisor", issuer.as_ref(), &empty, path).optional("Nombre"),
        recipient: Element::new("Receptor", recipient.as_ref(), &empty, path).optional("Nombre"),
        issued_at: voucher.date("Fecha")?,
        lines,
    }))
}

/// Read every payment receipt in `dir`, skipping other documents and
/// receipts with no settled documents.
///
/// # Errors
///
/// Listing, read and parse failures are fatal.
pub fn load_payments(dir: &Path) -> Result<Vec<PaymentReceipt>> {
    let mut receipts = Vec::new();
    for path in xml_files(dir)? {
        let xml = read_document(&path)?;
        match parse_payment(&xml, &path)? {
            Some(receipt) if receipt.lines.is_empty() => {
                tracing::warn!(path = %path.display(), "payment receipt settles no documents");
            }
            Some(receipt) => receipts.push(receipt),
            None => tracing::debug!(path = %path.display(), "not a payment receipt"),
        }
    }
    tracing::info!(dir = %dir.display(), count = receipts.len(), "payment receipts loaded");
    Ok(receipts)
}

/// Sort receipts by first payment date and group them by (year, month).
#[must_use]
pub fn group_by_month(mut receipts: Vec<PaymentReceipt>) -> Vec<MonthlyPayments> {
    receipts.sort_by_key(PaymentReceipt::first_payment);

    let mut months: Vec<MonthlyPayments> = Vec::new();
    for receipt in receipts {
        let Some(first) = receipt.first_payment() else {
            continue;
        };
        let key = (first.year(), first.month());
        let total = receipt.total_paid();
        let documents = receipt.lines.len();

        match months.last_mut() {
            Some(group) if (group.year, group.month) == key => {
                group.total_paid += total;
                group.documents += documents;
                group.receipts.push(receipt);
            }
            _ => months.push(MonthlyPayments {
                year: key.0,
                month: key.1,
                receipts: vec![receipt],
                total_paid: total,
                documents,
            }),
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;

    fn receipt_xml(fecha_pago: &str, amounts: &[&str]) -> String {
        let doctos: String = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                format!(r#"<pago20:DoctoRelacionado IdDocumento="X{i}" Folio="F{i}" ImpPagado="{amount}"/>"#)
            })
            .collect();
        format!(
            r#"<cfdi:Comprobante Fecha="2024-05-01T09:00:00" TipoDeComprobante="P" Total="0">
  <cfdi:Emisor Rfc="AAA010101AAA" Nombre="Proveedor"/>
  <cfdi:Receptor Rfc="XAXX010101000" Nombre="Cliente" UsoCFDI="CP01"/>
  <cfdi:Complemento>
    <pago20:Pagos Version="2.0">
      <pago20:Pago FechaPago="{fecha_pago}" Monto="0" FormaDePagoP="03" MonedaP="MXN">{doctos}</pago20:Pago>
    </pago20:Pagos>
  </cfdi:Complemento>
</cfdi:Comprobante>"#
        )
    }

    fn parse(xml: &str) -> Result<Option<PaymentReceipt>> {
        parse_payment(xml, Path::new("pago.xml"))
    }

    #[test]
    fn parses_related_documents() {
        let receipt = parse(&receipt_xml("2024-05-03T00:00:00", &["100.50", "20"]))
            .expect("parse")
            .expect("payment receipt");
        assert_eq!(receipt.issuer, "Proveedor");
        assert_eq!(receipt.recipient, "Cliente");
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[1].folio, "F1");
        assert_eq!(receipt.total_paid(), dec!(120.50));
        assert_eq!(
            receipt.first_payment().map(|d| d.date().to_string()),
            Some("2024-05-03".to_string())
        );
    }

    #[test]
    fn non_payment_documents_are_skipped() {
        let xml = receipt_xml("2024-05-03T00:00:00", &["1"]).replace(r#"TipoDeComprobante="P""#, r#"TipoDeComprobante="I""#);
        assert_eq!(parse(&xml).expect("parse"), None);
    }

    #[test]
    fn bad_paid_amount_is_fatal() {
        let err = parse(&receipt_xml("2024-05-03T00:00:00", &["cien"])).expect_err("amount");
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
    }

    #[test]
    fn months_are_distinguished_by_year() {
        let receipts: Vec<_> = [
            ("2024-01-10T00:00:00", "10"),
            ("2023-01-20T00:00:00", "5"),
            ("2024-01-02T00:00:00", "7"),
            ("2024-02-01T00:00:00", "1"),
        ]
        .iter()
        .map(|(date, amount)| {
            parse(&receipt_xml(date, &[amount]))
                .expect("parse")
                .expect("receipt")
        })
        .collect();

        let months = group_by_month(receipts);
        let keys: Vec<_> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, [(2023, 1), (2024, 1), (2024, 2)]);
        assert_eq!(months[1].total_paid, dec!(17));
        assert_eq!(months[1].documents, 2);
        assert_eq!(months[1].receipts.len(), 2);
    }
}
