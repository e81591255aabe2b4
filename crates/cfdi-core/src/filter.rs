//! Per-dimension filter strategies and the ordered chain that composes them.

use std::collections::BTreeSet;

use crate::catalog::Dimension;
use crate::invoice::Invoice;
use crate::selection::Selection;

/// Identifiers a strategy accepts, captured when the strategy is built.
pub type ActiveCodes = BTreeSet<&'static str>;

/// One strategy per classification dimension.
///
/// Each variant tests a single invoice field against the codes that were
/// active for its dimension. An empty code set means the strategy is inactive
/// and passes everything through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStrategy {
    PaymentMethod(ActiveCodes),
    PaymentForm(ActiveCodes),
    Usage(ActiveCodes),
    DocumentType(ActiveCodes),
}

impl FilterStrategy {
    /// Build the strategy for `dimension` from the codes active in `selection`.
    #[must_use]
    pub fn for_dimension(dimension: Dimension, selection: &Selection) -> Self {
        let codes: ActiveCodes = selection.codes_for(dimension).collect();
        match dimension {
            Dimension::PaymentMethod => Self::PaymentMethod(codes),
            Dimension::PaymentForm => Self::PaymentForm(codes),
            Dimension::Usage => Self::Usage(codes),
            Dimension::DocumentType => Self::DocumentType(codes),
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        match self {
            Self::PaymentMethod(_) => Dimension::PaymentMethod,
            Self::PaymentForm(_) => Dimension::PaymentForm,
            Self::Usage(_) => Dimension::Usage,
            Self::DocumentType(_) => Dimension::DocumentType,
        }
    }

    const fn codes(&self) -> &ActiveCodes {
        match self {
            Self::PaymentMethod(codes)
            | Self::PaymentForm(codes)
            | Self::Usage(codes)
            | Self::DocumentType(codes) => codes,
        }
    }

    /// True iff at least one code of this dimension was selected.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.codes().is_empty()
    }

    /// Whether `invoice` passes this strategy.
    #[must_use]
    pub fn matches(&self, invoice: &Invoice) -> bool {
        !self.is_active() || self.codes().contains(self.dimension().field(invoice))
    }

    /// Keep the invoices whose field value is selected; identity when inactive.
    #[must_use]
    pub fn apply(&self, mut invoices: Vec<Invoice>) -> Vec<Invoice> {
        if self.is_active() {
            invoices.retain(|invoice| self.matches(invoice));
        }
        invoices
    }
}

/// Ordered composition: payment method, payment form, usage, document type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    strategies: Vec<FilterStrategy>,
}

impl FilterChain {
    /// A chain that lets everything through.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Build the chain for the current selection.
    ///
    /// When the reserved ignore identifier is active the chain is empty,
    /// whatever else is selected.
    #[must_use]
    pub fn from_selection(selection: &Selection) -> Self {
        if selection.ignores_filters() {
            return Self::empty();
        }
        Self {
            strategies: Dimension::ALL
                .iter()
                .map(|dimension| FilterStrategy::for_dimension(*dimension, selection))
                .collect(),
        }
    }

    #[must_use]
    pub fn strategies(&self) -> &[FilterStrategy] {
        &self.strategies
    }

    /// True when no strategy would remove anything.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        !self.strategies.iter().any(FilterStrategy::is_active)
    }

    /// Whether a single invoice survives every strategy.
    #[must_use]
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.strategies.iter().all(|strategy| strategy.matches(invoice))
    }

    /// Fold the strategies over `invoices`, each narrowing the previous output.
    ///
    /// The result is a subsequence of the input in its original order.
    #[must_use]
    pub fn apply(&self, invoices: &[Invoice]) -> Vec<Invoice> {
        let narrowed = self
            .strategies
            .iter()
            .fold(invoices.to_vec(), |acc, strategy| strategy.apply(acc));
        tracing::debug!(
            input = invoices.len(),
            output = narrowed.len(),
            active = self.strategies.iter().filter(|s| s.is_active()).count(),
            "filter chain applied"
        );
        narrowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{IGNORE_FILTERS, lookup};
    use crate::invoice::fixtures::invoice;

    fn select(ids: &[&str]) -> Selection {
        ids.iter()
            .map(|id| lookup(id).expect("catalog id"))
            .collect()
    }

    fn sample() -> Vec<Invoice> {
        let mut a = invoice("a", "100");
        a.payment_form = "01".to_string();
        a.usage = "G01".to_string();
        let mut b = invoice("b", "50");
        b.payment_form = "03".to_string();
        b.payment_method = "PPD".to_string();
        let mut c = invoice("c", "200");
        c.payment_form = "28".to_string();
        c.document_type = "E".to_string();
        vec![a, b, c]
    }

    fn ids(invoices: &[Invoice]) -> Vec<&str> {
        invoices.iter().map(|i| i.uuid.as_str()).collect()
    }

    #[test]
    fn strategy_is_inactive_without_codes_of_its_dimension() {
        let selection = select(&["01"]);
        let usage = FilterStrategy::for_dimension(Dimension::Usage, &selection);
        assert!(!usage.is_active());
        assert_eq!(usage.apply(sample()), sample());

        let form = FilterStrategy::for_dimension(Dimension::PaymentForm, &selection);
        assert!(form.is_active());
        assert_eq!(ids(&form.apply(sample())), ["a"]);
    }

    #[test]
    fn codes_within_a_dimension_are_alternatives() {
        let chain = FilterChain::from_selection(&select(&["01", "28"]));
        assert_eq!(ids(&chain.apply(&sample())), ["a", "c"]);
    }

    #[test]
    fn dimensions_narrow_each_other() {
        let chain = FilterChain::from_selection(&select(&["01", "28", "E"]));
        assert_eq!(ids(&chain.apply(&sample())), ["c"]);

        let chain = FilterChain::from_selection(&select(&["PPD", "01"]));
        assert!(chain.apply(&sample()).is_empty());
    }

    #[test]
    fn chain_order_is_fixed() {
        let chain = FilterChain::from_selection(&Selection::new());
        let dims: Vec<_> = chain.strategies().iter().map(FilterStrategy::dimension).collect();
        assert_eq!(dims, Dimension::ALL);
        assert!(chain.is_pass_through());
    }

    #[test]
    fn ignore_overrides_other_codes() {
        let mut selection = select(&["PPD", "99"]);
        selection.toggle(&IGNORE_FILTERS);
        let chain = FilterChain::from_selection(&selection);
        assert!(chain.strategies().is_empty());
        assert_eq!(chain.apply(&sample()), sample());
    }

    #[test]
    fn unknown_field_values_never_match_an_active_strategy() {
        let mut odd = invoice("z", "1");
        odd.payment_form = String::new();
        let chain = FilterChain::from_selection(&select(&["01"]));
        assert!(!chain.matches(&odd));
        assert!(FilterChain::empty().matches(&odd));
    }
}
