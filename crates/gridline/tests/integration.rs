//! End-to-end grid behavior against the in-memory row host.

#![cfg(not(target_arch = "wasm32"))]

use gridline::yaml::{GridConfig, SourceConfig};
use gridline::{
    CellValue, ColumnNode, FormatOptions, FormatterRegistry, GridController, JsonExporter,
    KeyField, MemoryTable, PagingOptions, Record, RowKey, TableSnapshot,
};
use proptest::prelude::*;

fn grid(config: GridConfig) -> GridController<MemoryTable> {
    GridController::new(config, MemoryTable::new(), FormatterRegistry::new())
}

fn keyed(columns: Vec<ColumnNode>) -> GridConfig {
    GridConfig {
        key_field: KeyField::parse("id"),
        columns,
        ..GridConfig::default()
    }
}

fn ids(n: i32) -> Vec<Record> {
    (1..=n).map(|i| Record::new().cell("id", i)).collect()
}

// ============================================================================
// Header layout
// ============================================================================

#[test]
fn test_nested_header_markup() {
    let grid = grid(keyed(vec![
        ColumnNode::new("a", "A").index(0),
        ColumnNode::new("b", "B")
            .index(1)
            .child(ColumnNode::new("c", "C").index(0))
            .child(ColumnNode::new("d", "D").index(1)),
    ]));

    let layout = grid.layout();
    assert_eq!(layout.rows.len(), 2);
    assert_eq!((layout.rows[0][0].colspan, layout.rows[0][0].rowspan), (1, 2));
    assert_eq!((layout.rows[0][1].colspan, layout.rows[0][1].rowspan), (2, 1));
    assert_eq!(layout.leaf_keys(), vec!["a", "c", "d"]);

    let head = grid.host().head_html();
    assert!(head.contains(r#"<th data-column="a" rowspan="2""#));
    assert!(head.contains(r#"<th data-column="b" colspan="2""#));
    assert_eq!(head.matches("<tr>").count(), 2);
}

#[test]
fn test_empty_columns_without_data() {
    let grid = grid(GridConfig::default());
    assert!(grid.layout().is_empty());
    assert_eq!(grid.host().placeholder().map(|(_, m)| m), Some("No Data Available"));
}

// ============================================================================
// Sorting, filtering, paging
// ============================================================================

#[test]
fn test_sort_nulls_last_both_directions() {
    let mut grid = grid(keyed(vec![
        ColumnNode::new("id", "ID").index(0),
        ColumnNode::new("n", "N").index(1),
    ]));
    grid.set_data(vec![
        Record::new().cell("id", 1).cell("n", "b"),
        Record::new().cell("id", 2).cell("n", "a"),
        Record::new().cell("id", 3).cell("n", CellValue::Empty),
    ]);

    grid.handle_header_click("n");
    assert_eq!(grid.host().keys(), vec!["2", "1", "3"]);
    grid.handle_header_click("n");
    assert_eq!(grid.host().keys(), vec!["1", "2", "3"]);
}

#[test]
fn test_filter_then_clear() {
    let mut grid = grid(keyed(vec![ColumnNode::new("s", "S")]));
    grid.set_data(vec![
        Record::new().cell("id", 1).cell("s", "X"),
        Record::new().cell("id", 2).cell("s", "Y"),
        Record::new().cell("id", 3).cell("s", "X"),
    ]);

    grid.handle_filter_apply("s", ["X"]);
    assert_eq!(grid.host().keys(), vec!["1", "3"]);

    grid.handle_filter_apply("s", Vec::<String>::new());
    assert_eq!(grid.host().keys(), vec!["1", "2", "3"]);
}

#[test]
fn test_sort_persists_across_filter_and_resets_page() {
    let mut config = keyed(vec![
        ColumnNode::new("id", "ID"),
        ColumnNode::new("team", "Team"),
    ]);
    config.paging = PagingOptions::pages_of(2);
    let mut grid = grid(config);
    grid.set_data(
        (1..=6)
            .map(|i| Record::new().cell("id", i).cell("team", if i % 2 == 0 { "even" } else { "odd" }))
            .collect(),
    );

    grid.handle_header_click("id");
    grid.handle_header_click("id");
    assert!(grid.next_page());
    assert_eq!(grid.paging().current_page, 2);

    grid.handle_filter_apply("team", ["even"]);
    assert_eq!(grid.paging().current_page, 1);
    assert_eq!(grid.host().keys(), vec!["6", "4"]);
}

#[test]
fn test_paging_25_records() {
    let mut config = keyed(vec![ColumnNode::new("id", "ID")]);
    config.paging = PagingOptions::pages_of(10);
    let mut grid = grid(config);
    grid.set_data(ids(25));

    assert_eq!(grid.paging().total_pages, 3);
    assert_eq!(grid.host().keys().len(), 10);
    assert_eq!(grid.host().keys()[0], "1");

    assert!(grid.goto_page(3));
    assert_eq!(
        grid.host().keys(),
        vec!["21", "22", "23", "24", "25"]
    );
    assert!(!grid.goto_page(4));
    assert!(!grid.goto_page(0));
    assert_eq!(grid.paging().current_page, 3);
    assert!(grid.host().foot_html().contains("Page 3 of 3 (25 records)"));
}

#[test]
fn test_shrinking_data_returns_to_existing_page() {
    let mut config = keyed(vec![ColumnNode::new("id", "ID")]);
    config.paging = PagingOptions::pages_of(10);
    let mut grid = grid(config);
    grid.set_data(ids(25));
    assert!(grid.goto_page(3));

    grid.set_data(ids(5));
    assert_eq!(grid.paging().current_page, 1);
    assert_eq!(grid.host().keys(), vec!["1", "2", "3", "4", "5"]);
    assert!(grid.host().foot_html().contains("Page 1 of 1 (5 records)"));

    grid.set_data(ids(25));
    assert_eq!(grid.paging().current_page, 1);
    assert_eq!(grid.host().keys()[0], "1");
}

#[test]
fn test_sort_column_of_mixed_kinds() {
    let mut grid = grid(keyed(vec![
        ColumnNode::new("id", "ID"),
        ColumnNode::new("v", "V"),
    ]));
    grid.set_data(vec![
        Record::new().cell("id", 1).cell("v", "n10"),
        Record::new().cell("id", 2).cell("v", 9),
        Record::new().cell("id", 3),
        Record::new().cell("id", 4).cell("v", "10"),
        Record::new().cell("id", 5).cell("v", 100),
    ]);

    assert!(grid.handle_header_click("v"));
    assert_eq!(grid.host().keys(), vec!["2", "5", "4", "1", "3"]);
    assert!(grid.handle_header_click("v"));
    assert_eq!(grid.host().keys(), vec!["1", "4", "5", "2", "3"]);
}

// ============================================================================
// Reconciliation through the controller
// ============================================================================

#[test]
fn test_reorder_reuses_rows() {
    let mut grid = grid(keyed(vec![ColumnNode::new("id", "ID")]));
    grid.set_data(ids(3));
    let id_of = |grid: &GridController<MemoryTable>, key: &str| grid.host().row(key).map(|r| r.id);
    let one = id_of(&grid, "1");
    let three = id_of(&grid, "3");

    grid.set_data(vec![
        Record::new().cell("id", 3),
        Record::new().cell("id", 1),
        Record::new().cell("id", 4),
    ]);

    assert_eq!(grid.host().keys(), vec!["3", "1", "4"]);
    assert_eq!(id_of(&grid, "1"), one);
    assert_eq!(id_of(&grid, "3"), three);
    assert!(grid.host().row("2").is_none());
}

#[test]
fn test_unchanged_render_is_free() {
    let mut grid = grid(keyed(vec![ColumnNode::new("id", "ID")]));
    grid.set_data(ids(5));
    let before = grid.host().mutations();

    let ops = grid.render();
    assert!(ops.is_empty());
    assert_eq!(grid.host().mutations(), before);
}

#[test]
fn test_edit_updates_single_row() {
    let mut config = keyed(vec![
        ColumnNode::new("id", "ID"),
        ColumnNode::new("name", "Name"),
    ]);
    config.editable = true;
    let mut grid = grid(config);
    grid.set_data(vec![
        Record::new().cell("id", 1).cell("name", "Ann"),
        Record::new().cell("id", 2).cell("name", "Bob"),
    ]);

    grid.start_edit(&RowKey::new("2")).unwrap();
    grid.end_edit(&[("name".to_string(), "Bea".to_string())].into_iter().collect())
        .unwrap();

    assert_eq!(
        grid.record(&RowKey::new("2")).and_then(|r| r.display("name")),
        Some("Bea".to_string())
    );
    assert!(grid.host().row("2").unwrap().html.contains("Bea"));
    assert!(grid.host().row("1").unwrap().html.contains("Ann"));
}

#[test]
fn test_empty_data_swaps_rows_for_placeholder() {
    let mut grid = grid(keyed(vec![ColumnNode::new("id", "ID")]));
    grid.set_data(ids(2));
    assert!(grid.host().placeholder().is_none());

    grid.set_data(Vec::new());
    assert!(grid.host().rows().is_empty());
    assert_eq!(grid.host().placeholder(), Some((1, "No Data Available")));
    assert!(grid.render().is_empty());

    grid.set_data(vec![Record::new().cell("id", 2)]);
    assert_eq!(grid.host().keys(), vec!["2"]);
    assert!(grid.host().placeholder().is_none());
}

// ============================================================================
// Configuration and export
// ============================================================================

const PEOPLE_YAML: &str = r#"
key_field: id
columns:
  - key: name
    title: Name
    index: 0
  - key: joined
    title: Joined
    index: 1
    datatype: date
source:
  mode: json
  source:
    - { id: 1, name: "<b>Ann</b>", joined: "2024-01-02" }
    - { id: 2, name: Bob }
date_format: "%d.%m.%Y"
null_placeholder: "-"
actions:
  - name: delete
    label: Delete
"#;

#[test]
fn test_yaml_config_inline_source() {
    let config = GridConfig::from_yaml(PEOPLE_YAML).unwrap();
    let grid = grid(config);

    assert!(grid.issues().is_empty());
    let ann = &grid.host().row("1").unwrap().html;
    assert!(ann.contains("&lt;b&gt;Ann&lt;/b&gt;"));
    assert!(ann.contains("02.01.2024"));
    assert!(ann.contains(r#"data-action="delete""#));
    assert!(grid.host().row("2").unwrap().html.contains(">-<"));
    assert!(grid.host().head_html().contains("Actions"));
}

#[test]
fn test_url_source_left_to_caller() {
    let config = GridConfig {
        key_field: KeyField::parse("id"),
        source: Some(SourceConfig::url("/api/people")),
        ..GridConfig::default()
    };
    let mut grid = grid(config);
    assert_eq!(grid.source_url(), Some("/api/people"));
    assert!(grid.host().placeholder().is_some());

    let ticket = grid.begin_load();
    let records = gridline::parse_records(r#"[{"id": 7, "name": "Zed"}]"#);
    grid.complete_load(ticket, records);
    assert_eq!(grid.host().keys(), vec!["7"]);
    assert_eq!(grid.layout().leaf_keys(), vec!["id", "name"]);
}

#[test]
fn test_missing_key_field_degrades_to_positions() {
    let mut grid = grid(GridConfig::default());
    assert!(!grid.issues().is_empty());
    grid.set_data(ids(2));
    assert_eq!(grid.host().keys(), vec!["#0", "#1"]);
}

#[test]
fn test_export_all_filtered_rows() {
    let mut config = GridConfig::from_yaml(PEOPLE_YAML).unwrap();
    config.paging = PagingOptions::pages_of(1);
    let grid = grid(config);

    let snapshot = grid.snapshot();
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0], vec!["<b>Ann</b>", "02.01.2024"]);
    assert_eq!(snapshot.rows[1], vec!["Bob", "-"]);

    let bytes = grid.export(&JsonExporter::default()).unwrap();
    let back: TableSnapshot = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_custom_formatter_owns_cell() {
    let registry = FormatterRegistry::new().with(
        "badge",
        |value: &CellValue, _: &Record, _: &FormatOptions| {
            format!(r#"<td class="badge">{}</td>"#, value.display())
        },
    );
    let config = keyed(vec![ColumnNode::new("state", "State").renderer("badge")]);
    let mut grid = GridController::new(config, MemoryTable::new(), registry);
    grid.set_data(vec![Record::new().cell("id", 1).cell("state", "on")]);
    assert_eq!(grid.host().row("1").unwrap().html, r#"<td class="badge">on</td>"#);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_rows_follow_data_order(order in Just((1..=12).collect::<Vec<i32>>()).prop_shuffle()) {
        let mut grid = grid(keyed(vec![ColumnNode::new("id", "ID")]));
        grid.set_data(ids(12));
        grid.set_data(order.iter().map(|&i| Record::new().cell("id", i)).collect());

        let expected: Vec<String> = order.iter().map(ToString::to_string).collect();
        prop_assert_eq!(grid.host().keys(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(grid.host().mutations().created, 12);
    }

    #[test]
    fn prop_page_sizes_cover_all_records(total in 0usize..60, size in 1usize..15) {
        let mut config = keyed(vec![ColumnNode::new("id", "ID")]);
        config.paging = PagingOptions::pages_of(size);
        let mut grid = grid(config);
        grid.set_data(ids(total as i32));

        let mut seen = grid.host().keys().len();
        while grid.next_page() {
            seen += grid.host().keys().len();
        }
        prop_assert_eq!(seen, total);
    }
}
