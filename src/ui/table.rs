use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use startup_benchmark::data::aggregate::format_thousands;
use startup_benchmark::data::model::{CellValue, CompanyColumn};
use startup_benchmark::state::AppState;

fn header_label(column: CompanyColumn, sort: Option<(CompanyColumn, bool)>) -> String {
    match sort {
        Some((c, true)) if c == column => format!("{column} ⏶"),
        Some((c, false)) if c == column => format!("{column} ⏷"),
        _ => column.to_string(),
    }
}

/// Currency amounts get thousands separators and no decimals.
fn cell_text(column: CompanyColumn, cell: &CellValue) -> String {
    match (column, cell) {
        (
            CompanyColumn::FundingTotalUsd
            | CompanyColumn::ArrUsd
            | CompanyColumn::CacUsd
            | CompanyColumn::LtvUsd,
            CellValue::Float(v),
        ) => format_thousands(*v, 0),
        _ => cell.to_string(),
    }
}

/// Render the comparison table. Clicking a header sorts by that column.
pub fn comparison_table(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let table = &view.table;
    if table.is_empty() {
        ui.label("No companies match the selected filters.");
        return;
    }

    let sort = state.table_sort;
    let mut clicked: Option<CompanyColumn> = None;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .columns(Column::auto().at_least(60.0), table.columns.len())
        .header(22.0, |mut header| {
            for &column in &table.columns {
                header.col(|ui| {
                    if ui.button(header_label(column, sort)).clicked() {
                        clicked = Some(column);
                    }
                });
            }
        })
        .body(|mut body| {
            for row in &table.rows {
                body.row(20.0, |mut table_row| {
                    for (&column, cell) in table.columns.iter().zip(row) {
                        table_row.col(|ui| {
                            ui.label(cell_text(column, cell));
                        });
                    }
                });
            }
        });

    if let Some(column) = clicked {
        state.sort_table(column);
    }
}
