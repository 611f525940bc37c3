use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::query::RowSet;
use crate::report;
use crate::session::Session;
use crate::state::WidgetEvent;
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Left side panel – interactive controls
// ---------------------------------------------------------------------------

/// Render the widget controls. Changes are pushed to `events` and applied by
/// the app after the frame.
pub fn side_panel(ui: &mut Ui, session: &Session, events: &mut Vec<WidgetEvent>) {
    let state = session.widgets();
    let domain = session.domain();

    ui.heading("Select Features to Compare");
    ui.label("Pick the features shown in the scatter plot.");
    ui.separator();

    feature_combo(ui, "x_feature", "X-axis feature:", &state.x_feature, domain.features(), |f| {
        events.push(WidgetEvent::SelectX(f))
    });
    feature_combo(ui, "y_feature", "Y-axis feature:", &state.y_feature, domain.features(), |f| {
        events.push(WidgetEvent::SelectY(f))
    });

    let mut show_trend = state.show_trend;
    if ui
        .checkbox(&mut show_trend, "Show regression trendline")
        .changed()
    {
        events.push(WidgetEvent::ShowTrend(show_trend));
    }

    ui.separator();
    ui.strong("Filter Data");
    ui.label("Filter data points based on the selected X-axis feature value:");
    let (min, max) = domain.slider_range(&state.x_feature).unwrap_or((0, 0));
    let mut threshold = state.threshold;
    if ui
        .add(
            egui::Slider::new(&mut threshold, min..=max)
                .text(format!("{} threshold", state.x_feature)),
        )
        .changed()
    {
        events.push(WidgetEvent::SetThreshold(threshold));
    }
    ui.label(format!(
        "Showing only data points where {} > {}",
        state.x_feature, state.threshold
    ));
}

fn feature_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: &str,
    options: &[String],
    mut on_select: impl FnMut(String),
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui.selectable_label(current == option.as_str(), option).clicked()
                    && current != option.as_str()
                {
                    on_select(option.clone());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – the report body
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, session: &Session) {
    let ds = session.dataset();
    let views = session.static_views();
    let current = session.current();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(report::TITLE);
            ui.label(
                "Analysis of the Pima Indians Diabetes Database: diagnostic measurements \
                 for females at least 21 years old of Pima Indian heritage.",
            );

            section(ui, "Dataset Overview");
            ui.label(format!(
                "{} records. Predictors include pregnancies, glucose, blood pressure, BMI, \
                 insulin, age and more; the target is {}.",
                ds.len(),
                ds.target()
            ));
            ui.strong("Sample Data Records");
            tables::rowset_table(ui, "sample", &RowSet::from_view(ds, &views.sample));

            ui.add_space(8.0);
            ui.strong("Summary Statistics");
            tables::summary_table(ui, &views.summary);

            section(ui, "Feature Distributions");
            for hist in &views.histograms {
                ui.strong(format!("{} Distribution by Diabetes Outcome", hist.field));
                plot::histogram(ui, hist);
            }

            section(ui, "Interactive Feature Relationship Analysis");
            ui.label(format!(
                "Showing the relationship between {} and {} on {} of {} records. \
                 Blue = no diabetes, red = diabetes.",
                current.scatter.x_feature,
                current.scatter.y_feature,
                current.filtered.len(),
                ds.len()
            ));
            ui.strong(&current.scatter.title);
            plot::scatter(ui, &current.scatter);

            ui.add_space(8.0);
            ui.strong("SQL Query Results");
            ui.monospace(&current.query_sql);
            match &current.query {
                Ok(rows) => tables::rowset_table(ui, "query", rows),
                Err(e) => {
                    ui.label(RichText::new(format!("Query failed: {e}")).color(Color32::RED));
                }
            }

            let c = &current.correlations;
            ui.add_space(8.0);
            ui.strong("Analysis");
            ui.label(format!(
                "• Correlation between {} and {}: {}",
                c.x_feature, c.y_feature, c.x_y
            ));
            ui.label(format!("• Correlation of {} with diabetes: {}", c.x_feature, c.x_target));
            ui.label(format!("• Correlation of {} with diabetes: {}", c.y_feature, c.y_target));

            section(ui, "Feature Correlation Matrix");
            plot::heatmap(ui, &views.correlation_matrix);

            section(ui, "Diabetes Outcome Distribution");
            plot::outcome_pie(ui, &views.outcome_distribution);

            section(ui, "Feature Impact on Diabetes Risk");
            plot::feature_importance(ui, &views.feature_importance);

            section(ui, "Conclusion");
            ui.label(
                "Glucose, BMI, Age and family history (DiabetesPedigreeFunction) stand out as \
                 indicators. Use the controls on the left to explore further relationships.",
            );
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.heading(title);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &Session, status_message: &mut Option<String>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export report…").clicked() {
                export_report_dialog(session, status_message);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!(
            "source '{}': {} records, {} visible",
            session.config().source,
            session.dataset().len(),
            session.current().filtered.len()
        ));

        if let Some(msg) = status_message.as_deref() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_report_dialog(session: &Session, status_message: &mut Option<String>) {
    let file = rfd::FileDialog::new()
        .set_title("Export report")
        .add_filter("Markdown", &["md"])
        .set_file_name("diabetes_report.md")
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, report::render(session)) {
            Ok(()) => {
                log::info!("Exported report to {}", path.display());
                *status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export report: {e}");
                *status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
