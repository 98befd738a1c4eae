//! Table rendering for `envar list`.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use envar_core::{Root, ValueKind};

/// Entries of one variable as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListing {
    pub variable: String,
    pub root: Root,
    pub kind: ValueKind,
    pub entries: Vec<String>,
}

pub fn entries_table(listing: &EntryListing) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Entry")]);
    apply_table_style(&mut table);
    for (index, entry) in listing.entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(entry),
        ]);
    }
    table
}

pub fn print_listing(listing: &EntryListing) {
    println!(
        "{} ({}, {}): {} entries",
        listing.variable,
        listing.root,
        listing.kind,
        listing.entries.len()
    );
    if !listing.entries.is_empty() {
        println!("{}", entries_table(listing));
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
