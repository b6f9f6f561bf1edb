use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilteredView;
use crate::data::model::{DataSource, Row};

// ---------------------------------------------------------------------------
// Row table
// ---------------------------------------------------------------------------

/// Render `view` as a striped table with every dataset column.
pub fn rows_table(ui: &mut Ui, id: &str, source: &DataSource, view: &FilteredView) {
    let columns = source.columns();
    let rows: Vec<&Row> = view.rows(source).collect();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(70.0), columns.len())
            .min_scrolled_height(0.0)
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut table_row| {
                    let r = rows[table_row.index()];
                    for col in columns {
                        table_row.col(|ui: &mut Ui| {
                            if let Some(v) = r.get(&col.name) {
                                ui.label(v.to_string());
                            }
                        });
                    }
                });
            });
    });
}
