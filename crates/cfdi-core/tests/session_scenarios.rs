use cfdi_core::catalog::Dimension;
use cfdi_core::session::{Effect, Focus, Input, ReviewSession};
use proptest::prelude::*;
use rust_decimal_macros::dec;

#[path = "generators.rs"]
mod generators;
use generators::*;

fn run(session: &mut ReviewSession, inputs: &[Input]) {
    for input in inputs {
        session.apply(*input).expect("transition");
    }
}

/// Focus the filter list on the payment-form tab with the index on `id`.
fn go_to_payment_form(session: &mut ReviewSession, id: &str) {
    if session.focus() == Focus::Table {
        run(session, &[Input::ToggleFocus]);
    }
    while session.active_tab() != Dimension::PaymentForm {
        run(session, &[Input::TabRight]);
    }
    while session.filter_entries()[session.filter_index()].id != id {
        run(session, &[Input::FilterDown]);
    }
}

fn three_records() -> ReviewSession {
    ReviewSession::new(vec![
        with_form("a", "01", "100"),
        with_form("b", "01", "50"),
        with_form("c", "28", "200"),
    ])
    .expect("session")
}

#[test]
fn toggling_a_payment_form_narrows_and_restores() {
    let mut session = three_records();
    assert_eq!(session.summary().total, dec!(350));

    go_to_payment_form(&mut session, "01");
    run(&mut session, &[Input::ToggleFilterValue]);
    assert_eq!(session.visible().len(), 2);
    assert_eq!(session.summary().total, dec!(150));
    assert_eq!(session.summary().count, 2);

    run(&mut session, &[Input::ToggleFilterValue]);
    assert_eq!(session.visible().len(), 3);
    assert_eq!(session.summary().total, dec!(350));
    assert_eq!(session.summary().count, 3);
}

#[test]
fn codes_of_one_dimension_widen_instead_of_compounding() {
    let mut session = three_records();
    go_to_payment_form(&mut session, "01");
    run(&mut session, &[Input::ToggleFilterValue]);
    go_to_payment_form(&mut session, "28");
    run(&mut session, &[Input::ToggleFilterValue]);

    // If the second toggle filtered the already-narrowed list, nothing
    // would be left.
    assert_eq!(session.visible().len(), 3);
    assert_eq!(session.summary().total, dec!(350));

    go_to_payment_form(&mut session, "01");
    run(&mut session, &[Input::ToggleFilterValue]);
    assert_eq!(session.visible().len(), 1);
    assert_eq!(session.summary().total, dec!(200));
}

#[test]
fn unit_exchange_rate_sums_raw_amounts() {
    let mut inv = invoice("only", "100.00");
    inv.exchange_rate = "1".to_string();
    let session = ReviewSession::new(vec![inv]).expect("session");
    let summary = session.summary();
    assert_eq!(summary.subtotal, dec!(100.00));
    assert_eq!(summary.total, dec!(100.00));
    assert_eq!(summary.count, 1);
}

#[test]
fn rate_two_doubles_the_contribution() {
    let mut usd = invoice("usd", "100");
    usd.exchange_rate = "2".to_string();
    let session = ReviewSession::new(vec![usd, invoice("mxn", "100")]).expect("session");
    assert_eq!(session.summary().total, dec!(300));
}

#[test]
fn tabs_clamp_at_both_ends() {
    let mut session = three_records();
    run(&mut session, &[Input::ToggleFocus, Input::TabLeft]);
    assert_eq!(session.active_tab(), Dimension::PaymentMethod);

    run(
        &mut session,
        &[Input::TabRight, Input::TabRight, Input::TabRight, Input::TabRight],
    );
    assert_eq!(session.active_tab(), Dimension::DocumentType);
}

#[test]
fn empty_folder_renders_zero_summary() {
    let mut session = ReviewSession::new(Vec::new()).expect("session");
    assert_eq!(session.summary().count, 0);
    assert_eq!(session.summary().average(), None);
    run(&mut session, &[Input::CursorDown]);
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.apply(Input::SelectRow).expect("select"), Effect::None);
}

#[test]
fn filter_with_no_matches_is_not_an_error() {
    let mut session = three_records();
    go_to_payment_form(&mut session, "99");
    run(&mut session, &[Input::ToggleFilterValue]);
    assert!(session.visible().is_empty());
    assert_eq!(session.summary().total, dec!(0));
    assert!(session.selected_invoice().is_none());
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn cursor_never_leaves_the_visible_subset(
        records in arb_invoices(),
        downs in 0usize..60,
        ups in 0usize..60,
    ) {
        let len = records.len();
        let mut session = ReviewSession::new(records).expect("session");
        for _ in 0..downs {
            session.apply(Input::CursorDown).expect("down");
        }
        prop_assert_eq!(session.cursor(), downs.min(len.saturating_sub(1)));
        for _ in 0..ups {
            session.apply(Input::CursorUp).expect("up");
        }
        prop_assert!(session.cursor() <= len.saturating_sub(1));
        prop_assert_eq!(session.selected_invoice().is_some(), len > 0);
    }

    #[test]
    fn derived_state_tracks_selection(
        records in arb_invoices(),
        script in prop::collection::vec(0u8..6, 0..40),
    ) {
        let mut session = ReviewSession::new(records).expect("session");
        for step in script {
            let input = match step {
                0 => Input::ToggleFocus,
                1 => Input::ToggleFilterValue,
                2 => Input::FilterDown,
                3 => Input::TabRight,
                4 => Input::TabLeft,
                _ => Input::ToggleIgnoreFilters,
            };
            session.apply(input).expect("transition");

            let expected = cfdi_core::filter::FilterChain::from_selection(session.selection())
                .apply(session.all_invoices());
            prop_assert_eq!(session.visible(), expected.as_slice());
            let summary = cfdi_core::summary::summarize(&expected).expect("summary");
            prop_assert_eq!(*session.summary(), summary);
        }
    }
}
