//! Interactive invoice review console.
//!
//! Layout:
//! - left: invoice table over the visible subset, detail pane below it
//! - right: dimension tabs, the filter list of the active tab, live summary
//! - bottom: status bar with key hints or a transient message
//!
//! Key bindings: tab focus, j/k move, h/l tabs, space toggle, i ignore
//! filters, enter open document, q quit.

use crate::money::format_money;
use crate::opener::{DocumentOpener, resolve_document};
use anyhow::Result;
use cfdi_core::catalog::{Dimension, describe_payment_form, lookup_in};
use cfdi_core::session::{Effect, Focus, Input, ReviewSession};
use cfdi_core::Invoice;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs},
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Key mapping
// ---------------------------------------------------------------------------

/// Translate a key press into a session input. Vertical movement targets
/// the cursor or the filter index depending on focus.
pub fn input_for_key(key: KeyEvent, focus: Focus) -> Option<Input> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let on_table = focus == Focus::Table;
    let input = match key.code {
        KeyCode::Char('c') if ctrl => Input::Quit,
        KeyCode::Char('q') => Input::Quit,
        KeyCode::Tab => Input::ToggleFocus,
        KeyCode::Enter => Input::SelectRow,
        KeyCode::Char(' ') => Input::ToggleFilterValue,
        KeyCode::Char('i') => Input::ToggleIgnoreFilters,
        KeyCode::Up | KeyCode::Char('k') if on_table => Input::CursorUp,
        KeyCode::Up | KeyCode::Char('k') => Input::FilterUp,
        KeyCode::Down | KeyCode::Char('j') if on_table => Input::CursorDown,
        KeyCode::Down | KeyCode::Char('j') => Input::FilterDown,
        KeyCode::Left | KeyCode::Char('h') => Input::TabLeft,
        KeyCode::Right | KeyCode::Char('l') => Input::TabRight,
        _ => return None,
    };
    Some(input)
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

pub struct ReviewView<O> {
    session: ReviewSession,
    /// Folder the invoices were loaded from; documents are opened from here.
    dir: PathBuf,
    opener: O,
    table_state: TableState,
    status_msg: Option<(String, Instant)>,
    should_quit: bool,
}

impl<O: DocumentOpener> ReviewView<O> {
    pub fn new(session: ReviewSession, dir: PathBuf, opener: O) -> Self {
        let mut view = Self {
            session,
            dir,
            opener,
            table_state: TableState::default(),
            status_msg: None,
            should_quit: false,
        };
        view.sync_table_selection();
        view
    }

    /// Feed one key event through the session.
    ///
    /// # Errors
    ///
    /// Only a failed summary recomputation is returned; it ends the run.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let Some(input) = input_for_key(key, self.session.focus()) else {
            return Ok(());
        };

        match self.session.apply(input)? {
            Effect::None => {}
            Effect::Quit => self.should_quit = true,
            Effect::Open { uuid } => self.open_document(&uuid),
        }
        self.sync_table_selection();
        Ok(())
    }

    fn open_document(&mut self, uuid: &str) {
        let opened = resolve_document(&self.dir, uuid).and_then(|path| {
            self.opener.open(&path)?;
            Ok(path)
        });
        match opened {
            Ok(path) => {
                tracing::info!(path = %path.display(), "opened document");
                self.set_status(format!("opened {}", path.display()));
            }
            Err(err) => {
                tracing::warn!(uuid, error = %format!("{err:#}"), "could not open document");
                self.set_status(format!("could not open {uuid}: {err:#}"));
            }
        }
    }

    fn sync_table_selection(&mut self) {
        if self.session.visible().is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(self.session.cursor()));
        }
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_msg = Some((msg, Instant::now()));
    }

    fn current_status(&self) -> Option<&str> {
        self.status_msg
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub const fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        render_into(frame, self, area);
    }
}

// ---------------------------------------------------------------------------
// Terminal lifecycle
// ---------------------------------------------------------------------------

/// Run the console until the operator quits.
///
/// The terminal is restored even when the session fails.
pub fn run_review_tui<O: DocumentOpener>(
    session: ReviewSession,
    dir: PathBuf,
    opener: O,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut view = ReviewView::new(session, dir, opener);
    let result = event_loop(&mut terminal, &mut view);
    cleanup_terminal(&mut terminal)?;
    result
}

fn event_loop<B: Backend, O: DocumentOpener>(
    terminal: &mut Terminal<B>,
    view: &mut ReviewView<O>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| view.render(frame, frame.area()))?;
        if view.should_quit() {
            return Ok(());
        }
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                view.handle_key(key)?;
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let (border_style, title_style) = if focused {
        (
            Style::default().fg(Color::Green),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
    };
    Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(border_style)
        .title(title)
        .title_style(title_style)
}

fn render_into<O: DocumentOpener>(frame: &mut Frame<'_>, app: &mut ReviewView<O>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[0]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(12)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(7),
        ])
        .split(columns[1]);

    render_table(frame, app, left[0]);
    render_detail(frame, &app.session, left[1]);
    render_tabs(frame, &app.session, right[0]);
    render_filter_list(frame, &app.session, right[1]);
    render_summary(frame, &app.session, right[2]);

    let status = Paragraph::new(build_status_bar(app, chunks[1].width)).alignment(Alignment::Left);
    frame.render_widget(status, chunks[1]);
}

fn render_table<O: DocumentOpener>(frame: &mut Frame<'_>, app: &mut ReviewView<O>, area: Rect) {
    let session = &app.session;
    let header = Row::new(["Date", "Folio", "Issuer", "Form", "Total"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row<'static>> = session.visible().iter().map(invoice_row).collect();
    let widths = [
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(4),
        Constraint::Length(16),
    ];

    let title = format!(
        " Invoices · {} of {} ",
        session.visible().len(),
        session.all_invoices().len()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(pane_block(title, session.focus() == Focus::Table))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn invoice_row(invoice: &Invoice) -> Row<'static> {
    let folio = if invoice.series.is_empty() {
        invoice.folio.clone()
    } else {
        format!("{}-{}", invoice.series, invoice.folio)
    };
    Row::new([
        Cell::from(invoice.issued_at.format("%Y-%m-%d").to_string()),
        Cell::from(folio),
        Cell::from(invoice.issuer.name.clone()),
        Cell::from(invoice.payment_form.clone()),
        Cell::from(Line::from(format_money(invoice.total)).alignment(Alignment::Right)),
    ])
}

fn detail_lines(invoice: &Invoice) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let kv = |key: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{key:<10}"), label),
            Span::raw(value),
        ])
    };
    let usage = lookup_in(Dimension::Usage, &invoice.usage)
        .map_or_else(|| invoice.usage.clone(), |e| format!("({}) {}", e.id, e.label));
    let method = lookup_in(Dimension::PaymentMethod, &invoice.payment_method).map_or_else(
        || invoice.payment_method.clone(),
        |e| format!("({}) {}", e.id, e.label),
    );
    let currency = if invoice.needs_conversion() {
        format!("{} @ {}", invoice.currency, invoice.exchange_rate)
    } else {
        invoice.currency.clone()
    };

    vec![
        kv("UUID", invoice.uuid.clone()),
        kv("Folio", format!("{} {}", invoice.series, invoice.folio).trim().to_string()),
        kv("Issued", invoice.issued_at.to_string()),
        kv("Stamped", invoice.stamped_at.to_string()),
        kv("Issuer", format!("{} ({})", invoice.issuer.name, invoice.issuer.tax_id)),
        kv(
            "Recipient",
            format!("{} ({})", invoice.recipient.name, invoice.recipient.tax_id),
        ),
        kv("Method", method),
        kv("Form", describe_payment_form(&invoice.payment_form)),
        kv("Usage", usage),
        kv(
            "Amounts",
            format!(
                "{} - {} = {} {currency}",
                format_money(invoice.subtotal),
                format_money(invoice.discount),
                format_money(invoice.total)
            ),
        ),
    ]
}

fn render_detail(frame: &mut Frame<'_>, session: &ReviewSession, area: Rect) {
    let lines = session.selected_invoice().map_or_else(
        || {
            vec![Line::from(Span::styled(
                "No invoice selected",
                Style::default().fg(Color::DarkGray),
            ))]
        },
        detail_lines,
    );
    let paragraph = Paragraph::new(lines).block(pane_block(" Detail ".to_string(), false));
    frame.render_widget(paragraph, area);
}

const fn tab_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::PaymentMethod => "Method",
        Dimension::PaymentForm => "Form",
        Dimension::Usage => "Usage",
        Dimension::DocumentType => "Type",
    }
}

fn render_tabs(frame: &mut Frame<'_>, session: &ReviewSession, area: Rect) {
    let titles: Vec<Line<'static>> = Dimension::ALL
        .iter()
        .map(|dimension| Line::from(tab_label(*dimension)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(session.active_tab().index())
        .block(pane_block(
            " Filters ".to_string(),
            session.focus() == Focus::FilterList,
        ))
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_filter_list(frame: &mut Frame<'_>, session: &ReviewSession, area: Rect) {
    let selection = session.selection();
    let items: Vec<ListItem<'static>> = session
        .filter_entries()
        .iter()
        .map(|entry| {
            let (mark, style) = if selection.contains(entry.id) {
                ("✓", Style::default().fg(Color::Green))
            } else {
                ("□", Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{mark} {:<4}", entry.id), style),
                Span::raw(entry.label),
            ]))
        })
        .collect();

    let focused = session.focus() == Focus::FilterList;
    let list = List::new(items)
        .block(pane_block(format!(" {} ", session.active_tab().title()), focused))
        .highlight_style(if focused {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        });
    let mut state = ListState::default().with_selected(Some(session.filter_index()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_summary(frame: &mut Frame<'_>, session: &ReviewSession, area: Rect) {
    let summary = session.summary();
    let label = Style::default().fg(Color::DarkGray);
    let line = |key: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{key:<10}"), label),
            Span::raw(value),
        ])
    };
    let mut lines = vec![
        line("Subtotal", format_money(summary.subtotal)),
        line("Discount", format_money(summary.discount)),
        line("Total", format_money(summary.total)),
        line("Invoices", summary.count.to_string()),
    ];
    if let Some(average) = summary.average() {
        lines.push(line("Average", format_money(average)));
    }
    let paragraph = Paragraph::new(lines).block(pane_block(" Summary ".to_string(), false));
    frame.render_widget(paragraph, area);
}

fn build_status_bar<O: DocumentOpener>(app: &ReviewView<O>, width: u16) -> Line<'static> {
    if let Some(msg) = app.current_status() {
        return Line::from(vec![Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Cyan),
        )]);
    }

    let key_style = Style::default().fg(Color::Cyan);
    let dim_style = Style::default().fg(Color::DarkGray);
    let mut spans: Vec<Span<'static>> = Vec::new();

    if app.session.selection().ignores_filters() {
        spans.push(Span::styled(
            "IGNORING FILTERS  ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let hints: &[(&str, &str)] = match app.session.focus() {
        Focus::Table => &[
            ("j/k", "move"),
            ("enter", "open"),
            ("tab", "filters"),
            ("q", "quit"),
        ],
        Focus::FilterList => &[
            ("j/k", "move"),
            ("h/l", "tab"),
            ("space", "toggle"),
            ("i", "ignore all"),
            ("tab", "table"),
            ("q", "quit"),
        ],
    };
    for (key, desc) in hints {
        spans.push(Span::styled((*key).to_string(), key_style));
        spans.push(Span::styled(format!(" {desc}  "), dim_style));
    }

    let version = format!("cfdi {}", env!("CARGO_PKG_VERSION"));
    let left_len: usize = spans.iter().map(|span| span.content.chars().count()).sum();
    let right_len = version.chars().count();
    if (width as usize) > left_len + right_len + 1 {
        spans.push(Span::raw(" ".repeat(width as usize - left_len - right_len)));
    } else {
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(version, dim_style));

    Line::from(spans)
}
