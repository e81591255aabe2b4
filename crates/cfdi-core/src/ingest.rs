//! Loading stamped CFDI documents from a directory.
//!
//! Elements are matched by local name so the `cfdi:` and `tfd:` prefixes
//! (or any other prefix a generator picks) do not matter.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;

use crate::error::{CfdiError, Result};
use crate::invoice::{DATE_LAYOUT, Invoice, Party};

/// Attribute map of one element, keyed by local attribute name.
pub(crate) type Attributes = HashMap<String, String>;

/// Paths of every `.xml` file directly inside `dir`, sorted by file name.
///
/// # Errors
///
/// [`CfdiError::InvoicesDirMissing`] if `dir` is not a directory, or
/// [`CfdiError::Io`] if it cannot be listed.
pub fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CfdiError::InvoicesDirMissing(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| CfdiError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CfdiError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub(crate) fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CfdiError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and parse every invoice in `dir`.
///
/// Files are read in file-name order. Any unreadable or malformed document
/// aborts the load; an empty directory yields an empty list.
///
/// # Errors
///
/// Propagates the first listing, read or parse failure.
pub fn load_dir(dir: &Path) -> Result<Vec<Invoice>> {
    let files = xml_files(dir)?;
    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), "no .xml documents found");
    }

    let mut invoices = Vec::with_capacity(files.len());
    for path in &files {
        let xml = read_document(path)?;
        let invoice = parse_invoice(&xml, path)?;
        tracing::debug!(path = %path.display(), uuid = %invoice.uuid, "loaded invoice");
        invoices.push(invoice);
    }
    tracing::info!(dir = %dir.display(), count = invoices.len(), "invoices loaded");
    Ok(invoices)
}

/// Attributes of the elements an invoice is assembled from.
#[derive(Default)]
struct Elements {
    voucher: Option<Attributes>,
    issuer: Option<Attributes>,
    recipient: Option<Attributes>,
    stamp: Option<Attributes>,
}

/// Parse one CFDI document. `path` is only used in error messages.
///
/// # Errors
///
/// [`CfdiError::Xml`] for malformed markup or a missing `Comprobante`,
/// [`CfdiError::MissingAttribute`] for absent required attributes, and
/// amount/date errors for unparseable values.
pub fn parse_invoice(xml: &str, path: &Path) -> Result<Invoice> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut found = Elements::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let slot = match e.local_name().as_ref() {
                    b"Comprobante" => &mut found.voucher,
                    b"Emisor" => &mut found.issuer,
                    b"Receptor" => &mut found.recipient,
                    b"TimbreFiscalDigital" => &mut found.stamp,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(attributes(e, path)?);
                }
            }
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

    build_invoice(found, path)
}

/// Collect the attributes of `element`, keyed by local name.
pub(crate) fn attributes(element: &BytesStart<'_>, path: &Path) -> Result<Attributes> {
    let mut map = Attributes::new();
    for attr in element.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| CfdiError::Xml {
            path: path.to_path_buf(),
            message: format!("attribute {key}: {e}"),
        })?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

/// Required-attribute accessor bound to one element.
pub(crate) struct Element<'a> {
    pub(crate) name: &'static str,
    pub(crate) attrs: &'a Attributes,
    pub(crate) path: &'a Path,
}

impl<'a> Element<'a> {
    /// Absent elements behave as if they carried no attributes.
    pub(crate) fn new(
        name: &'static str,
        attrs: Option<&'a Attributes>,
        empty: &'a Attributes,
        path: &'a Path,
    ) -> Self {
        Self {
            name,
            attrs: attrs.unwrap_or(empty),
            path,
        }
    }

    pub(crate) fn optional(&self, attribute: &str) -> String {
        self.attrs.get(attribute).cloned().unwrap_or_default()
    }

    pub(crate) fn required(&self, attribute: &'static str) -> Result<&str> {
        self.attrs
            .get(attribute)
            .map(String::as_str)
            .ok_or_else(|| CfdiError::MissingAttribute {
                path: self.path.to_path_buf(),
                element: self.name,
                attribute,
            })
    }

    pub(crate) fn amount(&self, attribute: &'static str) -> Result<Decimal> {
        parse_amount(self.path, attribute, self.required(attribute)?)
    }

    fn amount_or_zero(&self, attribute: &'static str) -> Result<Decimal> {
        self.attrs
            .get(attribute)
            .map_or(Ok(Decimal::ZERO), |raw| parse_amount(self.path, attribute, raw))
    }

    pub(crate) fn date(&self, attribute: &'static str) -> Result<NaiveDateTime> {
        let raw = self.required(attribute)?;
        NaiveDateTime::parse_from_str(raw.trim(), DATE_LAYOUT).map_err(|_| {
            CfdiError::InvalidDate {
                path: self.path.to_path_buf(),
                field: attribute,
                value: raw.to_string(),
            }
        })
    }
}

pub(crate) fn parse_amount(path: &Path, field: &'static str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| CfdiError::InvalidAmount {
        path: path.to_path_buf(),
        field,
        value: raw.to_string(),
    })
}

fn build_invoice(found: Elements, path: &Path) -> Result<Invoice> {
    let Some(voucher_attrs) = found.voucher else {
        return Err(CfdiError::Xml {
            path: path.to_path_buf(),
            message: "no Comprobante element".to_string(),
        });
    };
    let empty = Attributes::new();
    let voucher = Element::new("Comprobante", Some(&voucher_attrs), &empty, path);
    let issuer = Element::new("Emisor", found.issuer.as_ref(), &empty, path);
    let recipient = Element::new("Receptor", found.recipient.as_ref(), &empty, path);
    let stamp = Element::new("TimbreFiscalDigital", found.stamp.as_ref(), &empty, path);

    Ok(Invoice {
        uuid: stamp.required("UUID")?.to_string(),
        folio: voucher.optional("Folio"),
        series: voucher.optional("Serie"),
        issuer: Party {
            name: issuer.optional("Nombre"),
            tax_id: issuer.optional("Rfc"),
        },
        recipient: Party {
            name: recipient.optional("Nombre"),
            tax_id: recipient.optional("Rfc"),
        },
        usage: recipient.optional("UsoCFDI"),
        payment_method: voucher.optional("MetodoPago"),
        payment_form: voucher.optional("FormaPago"),
        document_type: voucher.optional("TipoDeComprobante"),
        subtotal: voucher.amount("SubTotal")?,
        discount: voucher.amount_or_zero("Descuento")?,
        total: voucher.amount("Total")?,
        currency: voucher.optional("Moneda"),
        exchange_rate: voucher.optional("TipoCambio"),
        issued_at: voucher.date("Fecha")?,
        stamped_at: stamp.date("FechaTimbrado")?,
    })
}
