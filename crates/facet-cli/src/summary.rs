use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use facet_cli::replay::CommitRecord;
use facet_model::Tristate;
use facet_state::SearchQuery;

use crate::commands::{FieldRow, ReplayOutcome, ResolveOutcome};

pub fn print_replay(outcome: &ReplayOutcome) {
    println!("Panel: {}", outcome.panel);
    println!("URL: {}", outcome.url);
    if let Some(path) = &outcome.session {
        println!("Session: {}", path.display());
    }
    print_commits(&outcome.commits);
    if outcome.cancelled > 0 {
        println!("Cancelled on close: {}", outcome.cancelled);
    }
    print_store(&outcome.tab_store);
    print_fields(&outcome.fields, false);
    print_query(&outcome.query);
}

pub fn print_resolve(outcome: &ResolveOutcome) {
    println!("Panel: {}", outcome.panel);
    println!("URL: {}", outcome.url);
    print_fields(&outcome.fields, true);
    print_query(&outcome.query);
}

fn print_commits(commits: &[CommitRecord]) {
    if commits.is_empty() {
        println!("No commits.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Key"),
        header_cell("Due (ms)"),
        header_cell("Fired (ms)"),
        header_cell("Entry"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (index, commit) in commits.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            key_cell(&commit.key),
            Cell::new(commit.due_ms),
            Cell::new(commit.fired_ms),
            entry_cell(&commit.entry),
        ]);
    }
    println!();
    println!("Commits:");
    println!("{table}");
}

fn print_store(entries: &BTreeMap<String, String>) {
    if entries.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Key"), header_cell("Stored entry")]);
    apply_table_style(&mut table);
    for (key, raw) in entries {
        let value = if raw.is_empty() {
            dim_cell("(cleared)")
        } else {
            Cell::new(raw)
        };
        table.add_row(vec![key_cell(key), value]);
    }
    println!();
    println!("Tab store:");
    println!("{table}");
}

fn print_fields(fields: &[FieldRow], with_source: bool) {
    let mut header = vec![
        header_cell("Field"),
        header_cell("Kind"),
        header_cell("Live"),
        header_cell("Committed"),
        header_cell("Pending"),
    ];
    if with_source {
        header.push(header_cell("Source"));
    }
    let mut table = Table::new();
    table.set_header(header);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Center);
    for field in fields {
        let mut row = vec![
            key_cell(&field.key),
            dim_cell(field.kind),
            value_cell(&field.live),
            value_cell(&field.committed),
            pending_cell(field.pending),
        ];
        if with_source {
            row.push(dim_cell(field.source.unwrap_or("-")));
        }
        table.add_row(row);
    }
    println!();
    println!("Fields:");
    println!("{table}");
}

fn print_query(query: &SearchQuery) {
    println!();
    if query.is_empty() {
        println!("Query: (no filters)");
        return;
    }
    match serde_json::to_string_pretty(query) {
        Ok(json) => println!("Query:\n{json}"),
        Err(error) => eprintln!("error: failed to render query: {error}"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Fixed(12)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn key_cell(key: &str) -> Cell {
    Cell::new(key).fg(Color::Blue).add_attribute(Attribute::Bold)
}

fn entry_cell(entry: &Tristate<String>) -> Cell {
    match entry {
        Tristate::Value(raw) => Cell::new(raw),
        Tristate::Cleared => Cell::new("(cleared)").fg(Color::Yellow),
        Tristate::Unset => Cell::new("(removed)").fg(Color::Yellow),
    }
}

fn value_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn pending_cell(pending: bool) -> Cell {
    if pending {
        Cell::new("●").fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
