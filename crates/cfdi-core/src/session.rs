//! Review session state machine.
//!
//! A [`ReviewSession`] owns the full record list, the operator's
//! [`Selection`], and everything derived from them. Each [`Input`] is
//! processed to completion by [`ReviewSession::apply`]; the visible subset
//! and summary are recomputed from the full list whenever the selection
//! changes, so derived state is never stale.

use crate::catalog::{CatalogEntry, Dimension, IGNORE_FILTERS};
use crate::error::Result;
use crate::filter::FilterChain;
use crate::invoice::{Invoice, sort_by_issue_date};
use crate::selection::Selection;
use crate::summary::{Summary, summarize};

/// Which pane receives navigation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Table,
    FilterList,
}

impl Focus {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Table => Self::FilterList,
            Self::FilterList => Self::Table,
        }
    }
}

/// Operator input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    ToggleFocus,
    Quit,
    SelectRow,
    ToggleFilterValue,
    ToggleIgnoreFilters,
    CursorUp,
    CursorDown,
    FilterUp,
    FilterDown,
    TabLeft,
    TabRight,
}

/// Externally visible outcome of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Open the source document of the invoice with this fiscal stamp.
    Open { uuid: String },
}

#[derive(Debug, Clone)]
pub struct ReviewSession {
    all: Vec<Invoice>,
    selection: Selection,
    focus: Focus,
    active_tab: Dimension,
    filter_index: usize,
    cursor: usize,
    visible: Vec<Invoice>,
    summary: Summary,
    finished: bool,
}

impl ReviewSession {
    /// Start a session over `invoices` with nothing selected.
    ///
    /// Records are sorted by issuance date before first use.
    ///
    /// # Errors
    ///
    /// Fails if the initial summary cannot be computed.
    pub fn new(mut invoices: Vec<Invoice>) -> Result<Self> {
        sort_by_issue_date(&mut invoices);
        let selection = Selection::new();
        let visible = FilterChain::from_selection(&selection).apply(&invoices);
        let summary = summarize(&visible)?;
        tracing::debug!(invoices = invoices.len(), "review session started");
        Ok(Self {
            all: invoices,
            selection,
            focus: Focus::Table,
            active_tab: Dimension::PaymentMethod,
            filter_index: 0,
            cursor: 0,
            visible,
            summary,
            finished: false,
        })
    }

    /// Process one input event.
    ///
    /// Inputs whose precondition does not hold (e.g. cursor movement while
    /// the filter list has focus) leave the state untouched.
    ///
    /// # Errors
    ///
    /// Fails only when a selection change makes the summary uncomputable;
    /// the session is left as it was before the input.
    pub fn apply(&mut self, input: Input) -> Result<Effect> {
        tracing::trace!(?input, focus = ?self.focus, "session input");
        match (input, self.focus) {
            (Input::Quit, _) => {
                self.finished = true;
                return Ok(Effect::Quit);
            }
            (Input::ToggleFocus, _) => self.focus = self.focus.toggled(),
            (Input::SelectRow, Focus::Table) => {
                return Ok(self
                    .selected_invoice()
                    .map_or(Effect::None, |invoice| Effect::Open {
                        uuid: invoice.uuid.clone(),
                    }));
            }
            (Input::CursorUp, Focus::Table) => self.cursor = self.cursor.saturating_sub(1),
            (Input::CursorDown, Focus::Table) => {
                self.cursor = (self.cursor + 1).min(self.visible.len().saturating_sub(1));
            }
            (Input::ToggleFilterValue, Focus::FilterList) => {
                if let Some(entry) = self.filter_entries().get(self.filter_index) {
                    self.toggle(entry)?;
                }
            }
            (Input::ToggleIgnoreFilters, Focus::FilterList) => self.toggle(&IGNORE_FILTERS)?,
            (Input::FilterUp, Focus::FilterList) => {
                let len = self.filter_entries().len();
                self.filter_index = (self.filter_index + len - 1) % len;
            }
            (Input::FilterDown, Focus::FilterList) => {
                self.filter_index = (self.filter_index + 1) % self.filter_entries().len();
            }
            (Input::TabLeft, Focus::FilterList) => {
                self.move_tab(self.active_tab.index().saturating_sub(1));
            }
            (Input::TabRight, Focus::FilterList) => {
                self.move_tab(self.active_tab.index() + 1);
            }
            _ => {}
        }
        Ok(Effect::None)
    }

    fn move_tab(&mut self, index: usize) {
        let clamped = index.min(Dimension::ALL.len() - 1);
        self.active_tab = Dimension::from_index(clamped).unwrap_or(self.active_tab);
        self.filter_index = 0;
        self.cursor = 0;
    }

    /// Flip `entry` and recompute from the full list, never from `visible`.
    fn toggle(&mut self, entry: &'static CatalogEntry) -> Result<()> {
        let mut selection = self.selection.clone();
        let now_active = selection.toggle(entry);
        let visible = FilterChain::from_selection(&selection).apply(&self.all);
        let summary = summarize(&visible)?;

        tracing::debug!(
            id = entry.id,
            active = now_active,
            visible = visible.len(),
            total = %summary.total,
            "filter toggled"
        );

        self.selection = selection;
        self.visible = visible;
        self.summary = summary;
        self.cursor = 0;
        Ok(())
    }

    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Dimension whose entries the filter list shows.
    #[must_use]
    pub const fn active_tab(&self) -> Dimension {
        self.active_tab
    }

    #[must_use]
    pub const fn filter_index(&self) -> usize {
        self.filter_index
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn visible(&self) -> &[Invoice] {
        &self.visible
    }

    #[must_use]
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Every loaded record, sorted by issuance date.
    #[must_use]
    pub fn all_invoices(&self) -> &[Invoice] {
        &self.all
    }

    /// Entries listed under the active tab.
    #[must_use]
    pub const fn filter_entries(&self) -> &'static [CatalogEntry] {
        self.active_tab.entries()
    }

    /// Record under the cursor, if the visible subset is non-empty.
    #[must_use]
    pub fn selected_invoice(&self) -> Option<&Invoice> {
        self.visible.get(self.cursor)
    }

    /// True once a quit input has been processed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}
