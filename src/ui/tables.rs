use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::query::RowSet;
use crate::data::stats::{SummaryTable, STATISTICS};

const ROW_HEIGHT: f32 = 18.0;

/// Plain table of records; an empty set renders a note instead of headers.
pub fn rowset_table(ui: &mut Ui, id: &str, rows: &RowSet) {
    if rows.is_empty() {
        ui.label(RichText::new("No rows match the current filter.").italics());
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(Column::auto().at_least(60.0), rows.columns.len())
            .header(20.0, |mut header| {
                for name in &rows.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let cells = &rows.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}

/// describe()-style table: one row per statistic, one column per field.
pub fn summary_table(ui: &mut Ui, summary: &SummaryTable) {
    ui.push_id("summary_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::auto().at_least(70.0))
            .columns(Column::auto().at_least(60.0), summary.fields.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Statistic");
                });
                for field in &summary.fields {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&field.field);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, STATISTICS.len(), |mut row| {
                    let stat = row.index();
                    row.col(|ui: &mut Ui| {
                        ui.label(STATISTICS[stat]);
                    });
                    for field in &summary.fields {
                        row.col(|ui: &mut Ui| {
                            ui.label(
                                field.values()[stat]
                                    .map(|v| format!("{v:.3}"))
                                    .unwrap_or_default(),
                            );
                        });
                    }
                });
            });
    });
}
