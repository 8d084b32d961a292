use std::sync::Arc;
use std::time::Duration;

use osintdash_core::action::{ACTION_ATTR, PARAMS_ATTR};
use osintdash_core::notify::DEFAULT_DURATION;
use osintdash_core::{
    Column, Dashboard, DispatchError, DispatchOutcome, Dispatcher, Effect, EffectContext, Element,
    MemoryClipboard, NodeId, PageLayout, RowId, Severity, SortDirection, SortState, TableView,
    run_effect,
};

fn values_table(values: &[&str]) -> TableView {
    let mut table = TableView::new(
        "entries",
        "Entries",
        vec![Column::new("Value", true), Column::new("Source", true)],
    );
    for (i, v) in values.iter().enumerate() {
        table.push_row([v.to_string(), format!("src-{}", i)]);
    }
    table
}

fn cells(table: &TableView, column: usize) -> Vec<String> {
    table.rows().iter().map(|r| r.cell(column).to_string()).collect()
}

fn add_button(dashboard: &mut Dashboard, action: &str, params: Option<&str>) -> NodeId {
    let root = dashboard.document.root();
    let mut element = Element::new("button").with_attr(ACTION_ATTR, action);
    if let Some(params) = params {
        element = element.with_attr(PARAMS_ATTR, params);
    }
    dashboard.document.append(root, element).unwrap()
}

#[test]
fn three_clicks_return_to_none_and_keep_last_sorted_order() {
    let mut table = values_table(&["b", "c", "a"]);

    table.click_header(0);
    assert_eq!(cells(&table, 0), ["a", "b", "c"]);
    table.click_header(0);
    assert_eq!(cells(&table, 0), ["c", "b", "a"]);
    let last_sorted = cells(&table, 0);

    table.click_header(0);
    assert_eq!(table.columns()[0].state(), SortState::None);
    assert_eq!(table.active_sort(), None);
    assert_eq!(cells(&table, 0), last_sorted);

    table.click_header(0);
    assert_eq!(table.columns()[0].state(), SortState::Ascending);
}

#[test]
fn sorting_twice_in_the_same_direction_is_idempotent() {
    let mut table = values_table(&["10", "apple", "2", "Banana", "2", "9"]);
    for direction in [SortDirection::Ascending, SortDirection::Descending] {
        table.sort_by_column(0, direction);
        let once: Vec<RowId> = table.rows().iter().map(|r| r.id()).collect();
        table.sort_by_column(0, direction);
        let twice: Vec<RowId> = table.rows().iter().map(|r| r.id()).collect();
        assert_eq!(once, twice);
    }
}

#[test]
fn numeric_column_sorts_numerically_not_lexicographically() {
    let mut table = values_table(&["10", "9", "2"]);
    table.click_header(0);
    assert_eq!(cells(&table, 0), ["2", "9", "10"]);
}

#[test]
fn mixed_column_sorts_deterministically() {
    let mut first = values_table(&["10", "apple", "2"]);
    let mut second = values_table(&["10", "apple", "2"]);
    first.click_header(0);
    second.click_header(0);
    assert_eq!(cells(&first, 0), cells(&second, 0));
    assert_eq!(cells(&first, 0), ["2", "10", "apple"]);
}

#[test]
fn sorting_only_permutes_rows() {
    let mut table = values_table(&["3", "1", "2"]);
    let ids: Vec<RowId> = table.rows().iter().map(|r| r.id()).collect();
    let before: Vec<Vec<String>> = ids
        .iter()
        .map(|id| table.row(*id).unwrap().cells().to_vec())
        .collect();

    table.click_header(0);
    table.click_header(1);

    assert_eq!(table.rows().len(), 3);
    for (id, original) in ids.iter().zip(before) {
        assert_eq!(table.row(*id).unwrap().cells(), original.as_slice());
    }
    assert_eq!(table.position(ids[1]), Some(0));
}

#[test]
fn activating_another_column_resets_the_first() {
    let mut table = values_table(&["b", "a"]);
    table.click_header(0);
    assert_eq!(table.columns()[0].state(), SortState::Ascending);

    table.click_header(1);
    assert_eq!(table.columns()[0].state(), SortState::None);
    assert_eq!(table.columns()[1].state(), SortState::Ascending);
    assert_eq!(table.active_sort(), Some((1, SortDirection::Ascending)));
}

#[test]
fn toggle_with_unmatched_selector_changes_nothing() {
    let mut dashboard = Dashboard::new("Test", DEFAULT_DURATION);
    let button = add_button(
        &mut dashboard,
        "toggle-section",
        Some(r##"{"target":"#does-not-exist"}"##),
    );
    let before = dashboard.document.clone();

    let outcome = Dispatcher::new().dispatch(&mut dashboard, button);

    assert_eq!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::NoMatch("#does-not-exist".into()))
    );
    assert_eq!(dashboard.document, before);
    assert!(dashboard.notifications.is_empty());
}

#[test]
fn unknown_action_emits_one_diagnostic() {
    let mut dashboard = Dashboard::new("Test", DEFAULT_DURATION);
    let button = add_button(&mut dashboard, "frobnicate", None);
    let before = dashboard.document.clone();

    let outcome = Dispatcher::new().dispatch(&mut dashboard, button);

    assert_eq!(outcome, DispatchOutcome::Unknown("frobnicate".into()));
    assert_eq!(dashboard.document, before);
    assert_eq!(dashboard.diagnostic_count(), 1);
    let diagnostic = dashboard.diagnostics().next().unwrap();
    assert_eq!(diagnostic.level, log::Level::Warn);
    assert!(diagnostic.message.contains("frobnicate"));
}

#[test]
fn malformed_params_fail_closed() {
    let mut dashboard = Dashboard::new("Test", DEFAULT_DURATION);
    let button = add_button(&mut dashboard, "copy-text", Some("{\"text\": oops"));
    let before = dashboard.document.clone();

    let outcome = Dispatcher::new().dispatch(&mut dashboard, button);

    match outcome {
        DispatchOutcome::Rejected(DispatchError::MalformedParams { action, .. }) => {
            assert_eq!(action, "copy-text")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(dashboard.document, before);
    assert!(dashboard.pending_effects().is_empty());
    assert_eq!(dashboard.diagnostic_count(), 1);
    assert_eq!(
        dashboard.diagnostics().next().unwrap().level,
        log::Level::Error
    );
}

#[test]
fn malformed_params_win_over_unknown_action() {
    let mut dashboard = Dashboard::new("Test", DEFAULT_DURATION);
    let button = add_button(&mut dashboard, "frobnicate", Some("{oops"));

    let outcome = Dispatcher::new().dispatch(&mut dashboard, button);

    assert!(matches!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::MalformedParams { .. })
    ));
    assert_eq!(dashboard.diagnostic_count(), 1);
    assert_eq!(
        dashboard.diagnostics().next().unwrap().level,
        log::Level::Error
    );
}

#[test]
fn copy_without_text_param_includes_button_hint() {
    let layout = r#"
[[button]]
label = "Copy"
action = "copy-text"
hint = "93.184.216.34"
"#;
    let mut dashboard = PageLayout::from_toml_str(layout)
        .unwrap()
        .build(DEFAULT_DURATION)
        .unwrap();
    let hint = dashboard
        .document
        .query_selector(&"button span.hint".parse().unwrap())
        .unwrap();

    Dispatcher::new().dispatch(&mut dashboard, hint);

    assert_eq!(
        dashboard.take_effects(),
        vec![Effect::CopyToClipboard("Copy 93.184.216.34".into())]
    );
}

#[test]
fn click_on_nested_label_resolves_to_button() {
    let layout = r#"
[[button]]
label = "Copy target"
action = "copy-text"
"#;
    let mut dashboard = PageLayout::from_toml_str(layout)
        .unwrap()
        .build(DEFAULT_DURATION)
        .unwrap();
    let label = dashboard
        .document
        .query_selector(&"span.label".parse().unwrap())
        .unwrap();

    Dispatcher::new().dispatch(&mut dashboard, label);

    assert_eq!(
        dashboard.take_effects(),
        vec![Effect::CopyToClipboard("Copy target".into())]
    );
}

#[tokio::test]
async fn clipboard_round_trip_updates_only_notifications() {
    let mut dashboard = Dashboard::new("Test", Duration::from_millis(500));
    let button = add_button(&mut dashboard, "copy-text", Some(r#"{"text":"93.184.216.34"}"#));
    Dispatcher::new().dispatch(&mut dashboard, button);

    let clipboard = Arc::new(MemoryClipboard::new());
    let ctx = EffectContext {
        clipboard: clipboard.clone(),
        export_dir: std::env::temp_dir(),
    };
    for effect in dashboard.take_effects() {
        if let Some(done) = run_effect(effect, &ctx).await {
            dashboard.apply_completion(done);
        }
    }

    assert_eq!(clipboard.contents().as_deref(), Some("93.184.216.34"));
    let latest = dashboard.notifications.latest().unwrap();
    assert_eq!(latest.severity, Severity::Success);
    assert_eq!(latest.duration, Duration::from_millis(500));
}

#[tokio::test]
async fn denied_clipboard_shows_error_notification() {
    let mut dashboard = Dashboard::new("Test", DEFAULT_DURATION);
    let button = add_button(&mut dashboard, "copy-text", Some(r#"{"text":"secret"}"#));
    Dispatcher::new().dispatch(&mut dashboard, button);

    let clipboard = Arc::new(MemoryClipboard::refusing("permission denied"));
    let ctx = EffectContext {
        clipboard: clipboard.clone(),
        export_dir: std::env::temp_dir(),
    };
    for effect in dashboard.take_effects() {
        if let Some(done) = run_effect(effect, &ctx).await {
            dashboard.apply_completion(done);
        }
    }

    assert_eq!(clipboard.contents(), None);
    let latest = dashboard.notifications.latest().unwrap();
    assert_eq!(latest.severity, Severity::Danger);
    assert_eq!(latest.message, "Failed to copy to clipboard");
}

#[tokio::test]
async fn export_button_writes_sorted_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut dashboard = Dashboard::new("Test", DEFAULT_DURATION);
    dashboard.add_table(values_table(&["10", "9", "2"]));
    dashboard.sort_table("entries", 0);
    let button = add_button(
        &mut dashboard,
        "export-data",
        Some(r#"{"table":"entries","format":"csv"}"#),
    );
    Dispatcher::new().dispatch(&mut dashboard, button);

    let ctx = EffectContext {
        clipboard: Arc::new(MemoryClipboard::new()),
        export_dir: dir.path().to_path_buf(),
    };
    for effect in dashboard.take_effects() {
        if let Some(done) = run_effect(effect, &ctx).await {
            dashboard.apply_completion(done);
        }
    }

    let written = std::fs::read_to_string(dir.path().join("entries_data.csv")).unwrap();
    assert_eq!(written, "Value,Source\n2,src-2\n9,src-1\n10,src-0\n");
    assert_eq!(
        dashboard.notifications.latest().unwrap().severity,
        Severity::Success
    );
}
