//! Static classification catalog: the filterable values of each dimension.
//!
//! Codes and descriptions follow the SAT catalogs (`c_MetodoPago`,
//! `c_FormaPago`, `c_UsoCFDI`, `c_TipoDeComprobante`). Only the values an
//! operator can filter on are listed per dimension; [`payment_form_label`]
//! covers the full payment-form catalog for display.

use crate::invoice::Invoice;
use serde::Serialize;

/// One of the four fixed classification dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    PaymentMethod,
    PaymentForm,
    Usage,
    DocumentType,
}

impl Dimension {
    /// Every dimension in filter-chain order. Also the tab order.
    pub const ALL: [Self; 4] = [
        Self::PaymentMethod,
        Self::PaymentForm,
        Self::Usage,
        Self::DocumentType,
    ];

    /// Position of this dimension in [`Dimension::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::PaymentMethod => 0,
            Self::PaymentForm => 1,
            Self::Usage => 2,
            Self::DocumentType => 3,
        }
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::PaymentMethod),
            1 => Some(Self::PaymentForm),
            2 => Some(Self::Usage),
            3 => Some(Self::DocumentType),
            _ => None,
        }
    }

    /// Tab title shown above the filter list.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PaymentMethod => "Payment method",
            Self::PaymentForm => "Payment form",
            Self::Usage => "CFDI usage",
            Self::DocumentType => "Document type",
        }
    }

    /// Filterable catalog entries for this dimension, in display order.
    #[must_use]
    pub const fn entries(self) -> &'static [CatalogEntry] {
        match self {
            Self::PaymentMethod => PAYMENT_METHODS,
            Self::PaymentForm => PAYMENT_FORMS,
            Self::Usage => USAGES,
            Self::DocumentType => DOCUMENT_TYPES,
        }
    }

    /// The invoice field this dimension classifies.
    #[must_use]
    pub fn field(self, invoice: &Invoice) -> &str {
        match self {
            Self::PaymentMethod => &invoice.payment_method,
            Self::PaymentForm => &invoice.payment_form,
            Self::Usage => &invoice.usage,
            Self::DocumentType => &invoice.document_type,
        }
    }
}

/// A (dimension, identifier, label) triple.
///
/// `dimension` is `None` only for [`IGNORE_FILTERS`], which belongs to no
/// dimension and disables the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CatalogEntry {
    pub dimension: Option<Dimension>,
    pub id: &'static str,
    pub label: &'static str,
}

impl CatalogEntry {
    const fn new(dimension: Dimension, id: &'static str, label: &'static str) -> Self {
        Self {
            dimension: Some(dimension),
            id,
            label,
        }
    }
}

/// Reserved entry that short-circuits every filter when active.
pub static IGNORE_FILTERS: CatalogEntry = CatalogEntry {
    dimension: None,
    id: "IGNORE",
    label: "Ignorar filtros",
};

const PAYMENT_METHODS: &[CatalogEntry] = &[
    CatalogEntry::new(Dimension::PaymentMethod, "PUE", "Pago en una sola exhibición"),
    CatalogEntry::new(Dimension::PaymentMethod, "PPD", "Pago en parcialidades o diferido"),
];

const PAYMENT_FORMS: &[CatalogEntry] = &[
    CatalogEntry::new(Dimension::PaymentForm, "01", "Efectivo"),
    CatalogEntry::new(Dimension::PaymentForm, "02", "Cheque nominativo"),
    CatalogEntry::new(Dimension::PaymentForm, "03", "Transferencia electrónica de fondos"),
    CatalogEntry::new(Dimension::PaymentForm, "04", "Tarjeta de crédito"),
    CatalogEntry::new(Dimension::PaymentForm, "05", "Monedero electrónico"),
    CatalogEntry::new(Dimension::PaymentForm, "06", "Dinero electrónico"),
    CatalogEntry::new(Dimension::PaymentForm, "15", "Condonación"),
    CatalogEntry::new(Dimension::PaymentForm, "28", "Tarjeta de débito"),
    CatalogEntry::new(Dimension::PaymentForm, "30", "Aplicación de anticipos"),
    CatalogEntry::new(Dimension::PaymentForm, "99", "Por definir"),
];

const USAGES: &[CatalogEntry] = &[
    CatalogEntry::new(Dimension::Usage, "G01", "Adquisición de mercancías"),
    CatalogEntry::new(Dimension::Usage, "G02", "Devoluciones, descuentos o bonificaciones"),
    CatalogEntry::new(Dimension::Usage, "G03", "Gastos en general"),
];

const DOCUMENT_TYPES: &[CatalogEntry] = &[
    CatalogEntry::new(Dimension::DocumentType, "I", "Ingreso"),
    CatalogEntry::new(Dimension::DocumentType, "E", "Egreso"),
    CatalogEntry::new(Dimension::DocumentType, "T", "Traslado"),
    CatalogEntry::new(Dimension::DocumentType, "P", "Pago"),
];

/// Full `c_FormaPago` catalog, including codes that are not filterable.
const PAYMENT_FORM_LABELS: &[(&str, &str)] = &[
    ("01", "Efectivo"),
    ("02", "Cheque nominativo"),
    ("03", "Transferencia electrónica de fondos"),
    ("04", "Tarjeta de crédito"),
    ("05", "Monedero electrónico"),
    ("06", "Dinero electrónico"),
    ("08", "Vales de despensa"),
    ("12", "Dación en pago"),
    ("13", "Pago por subrogación"),
    ("14", "Pago por consignación"),
    ("15", "Condonación"),
    ("17", "Compensación"),
    ("23", "Novación"),
    ("24", "Confusión"),
    ("25", "Remisión de deuda"),
    ("26", "Prescripción o caducidad"),
    ("27", "A satisfacción del acreedor"),
    ("28", "Tarjeta de débito"),
    ("29", "Tarjeta de servicios"),
    ("30", "Aplicación de anticipos"),
    ("31", "Intermediario pagos"),
    ("99", "Por definir"),
];

/// Look up a catalog entry (including [`IGNORE_FILTERS`]) by identifier.
#[must_use]
pub fn lookup(id: &str) -> Option<&'static CatalogEntry> {
    if id == IGNORE_FILTERS.id {
        return Some(&IGNORE_FILTERS);
    }
    Dimension::ALL
        .iter()
        .flat_map(|dimension| dimension.entries())
        .find(|entry| entry.id == id)
}

/// Look up an identifier restricted to one dimension.
#[must_use]
pub fn lookup_in(dimension: Dimension, id: &str) -> Option<&'static CatalogEntry> {
    dimension.entries().iter().find(|entry| entry.id == id)
}

/// Description of any payment-form code from the full SAT catalog.
#[must_use]
pub fn payment_form_label(code: &str) -> Option<&'static str> {
    PAYMENT_FORM_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// `"(03) Transferencia electrónica de fondos"`-style description used by the
/// detail pane; unknown codes are reported rather than hidden.
#[must_use]
pub fn describe_payment_form(code: &str) -> String {
    payment_form_label(code).map_or_else(
        || format!("({code}) unknown payment form"),
        |label| format!("({code}) {label}"),
    )
}
