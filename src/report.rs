//! Markdown rendering of a session, used by `--headless`.

use crate::data::model::{Dataset, Value};
use crate::data::query::RowSet;
use crate::data::stats::STATISTICS;
use crate::pipeline::Recomputed;
use crate::session::Session;

pub const TITLE: &str = "Diabetes Analysis Dashboard";

pub fn render(session: &Session) -> String {
    let mut out = String::new();
    let ds = session.dataset();
    let views = session.static_views();
    let current = session.current();
    let state = session.widgets();

    out.push_str(&format!("# {TITLE}\n\n"));
    out.push_str(&format!(
        "{} records from source `{}`; target field `{}`.\n\n",
        ds.len(),
        session.config().source,
        ds.target()
    ));

    out.push_str("## Sample Data Records\n\n");
    let sample = RowSet::from_view(ds, &views.sample);
    out.push_str(&rowset_table(&sample));

    out.push_str("\n## Summary Statistics\n\n");
    let mut headers = vec!["Statistic".to_string()];
    headers.extend(views.summary.fields.iter().map(|f| f.field.clone()));
    let rows: Vec<Vec<String>> = STATISTICS
        .iter()
        .enumerate()
        .map(|(i, stat)| {
            std::iter::once(stat.to_string())
                .chain(views.summary.fields.iter().map(|f| fmt_opt(f.values()[i])))
                .collect()
        })
        .collect();
    out.push_str(&markdown_table(&headers, &rows));

    out.push_str("\n## Feature Distributions\n\n");
    for h in &views.histograms {
        out.push_str(&format!(
            "- **{}**: {} bins of width {:.2}\n",
            h.field,
            h.bin_count(),
            h.bin_width()
        ));
    }

    out.push_str("\n## Interactive Feature Relationship Analysis\n\n");
    out.push_str(&format!(
        "X-axis: **{}**, Y-axis: **{}**, trend line: {}\n\n",
        state.x_feature,
        state.y_feature,
        if state.show_trend { "on" } else { "off" }
    ));
    render_recomputed(&mut out, ds, current, state.threshold);

    out.push_str("\n## Feature Correlation Matrix\n\n");
    let m = &views.correlation_matrix;
    let mut headers = vec![String::new()];
    headers.extend(m.fields.iter().cloned());
    let rows: Vec<Vec<String>> = m
        .fields
        .iter()
        .enumerate()
        .map(|(i, name)| {
            std::iter::once(name.clone())
                .chain((0..m.fields.len()).map(|j| m.get(i, j).to_string()))
                .collect()
        })
        .collect();
    out.push_str(&markdown_table(&headers, &rows));

    out.push_str("\n## Diabetes Outcome Distribution\n\n");
    let dist = &views.outcome_distribution;
    for (outcome, count) in dist.slices() {
        let share = if dist.total() == 0 {
            0.0
        } else {
            100.0 * count as f64 / dist.total() as f64
        };
        out.push_str(&format!("- {}: {count} ({share:.1}%)\n", outcome.label()));
    }

    out.push_str("\n## Feature Impact on Diabetes Risk\n\n");
    let rows: Vec<Vec<String>> = views
        .feature_importance
        .iter()
        .map(|f| vec![f.field.clone(), f.correlation.to_string()])
        .collect();
    out.push_str(&markdown_table(
        &["Feature".to_string(), "Correlation".to_string()],
        &rows,
    ));

    out
}

fn render_recomputed(out: &mut String, ds: &Dataset, current: &Recomputed, threshold: i64) {
    let scatter = &current.scatter;
    out.push_str(&format!(
        "Showing only data points where {} > {threshold}: {} of {} records.\n\n",
        scatter.x_feature,
        current.filtered.len(),
        ds.len()
    ));
    out.push_str(&format!("### {}\n\n", scatter.title));
    match &scatter.trend {
        Some(t) => out.push_str(&format!(
            "OLS trend: {} = {:.4} * {} + {:.4}\n\n",
            scatter.y_feature, t.slope, scatter.x_feature, t.intercept
        )),
        None => out.push_str("No trend line.\n\n"),
    }

    out.push_str(&format!("### SQL Query Results\n\n`{}`\n\n", current.query_sql));
    match &current.query {
        Ok(rows) => out.push_str(&rowset_table(rows)),
        Err(e) => out.push_str(&format!("> Query failed: {e}\n")),
    }

    let c = &current.correlations;
    out.push_str("\n**Analysis:**\n\n");
    out.push_str(&format!(
        "- Correlation between {} and {}: **{}**\n",
        c.x_feature, c.y_feature, c.x_y
    ));
    for (feature, r) in [(&c.x_feature, c.x_target), (&c.y_feature, c.y_target)] {
        out.push_str(&format!("- Correlation of {feature} with diabetes: **{r}**\n"));
    }
}

fn rowset_table(rows: &RowSet) -> String {
    if rows.is_empty() {
        return "_No rows._\n".to_string();
    }
    let body: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|r| r.iter().map(Value::to_string).collect())
        .collect();
    markdown_table(&rows.columns, &body)
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.3}")).unwrap_or_default()
}

pub fn markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str("|");
    out.push_str(&"---|".repeat(headers.len()));
    out.push('\n');
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::data::source::Catalog;
    use crate::state::WidgetEvent;
    use std::sync::Arc;

    fn session() -> Session {
        let ds = Dataset::from_numeric_columns(
            vec![
                ("Glucose".into(), vec![148.0, 85.0, 183.0]),
                ("BMI".into(), vec![33.6, 26.6, 23.3]),
                ("Outcome".into(), vec![1.0, 0.0, 1.0]),
            ],
            "Outcome",
        )
        .unwrap();
        let config = DashboardConfig::default();
        let mut catalog = Catalog::default();
        catalog.insert(&config.source, Arc::new(ds));
        Session::with_catalog(config, catalog).unwrap()
    }

    #[test]
    fn markdown_table_layout() {
        let t = markdown_table(
            &["a".to_string(), "b".to_string()],
            &[vec!["1".to_string(), "2".to_string()]],
        );
        assert_eq!(t, "| a | b |\n|---|---|\n| 1 | 2 |\n");
    }

    #[test]
    fn report_contains_every_section() {
        let report = render(&session());
        for heading in [
            "# Diabetes Analysis Dashboard",
            "## Sample Data Records",
            "## Summary Statistics",
            "## Feature Distributions",
            "## Interactive Feature Relationship Analysis",
            "### SQL Query Results",
            "## Feature Correlation Matrix",
            "## Diabetes Outcome Distribution",
            "## Feature Impact on Diabetes Risk",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains(r#"SELECT * FROM "diabetes_csv" WHERE "BMI" > 23 LIMIT 10"#));
        assert!(report.contains("- Diabetes: 2 (66.7%)"));
    }

    #[test]
    fn empty_filter_renders_without_rows() {
        let mut s = session();
        s.handle(WidgetEvent::SelectX("Glucose".into())).unwrap();
        s.handle(WidgetEvent::SetThreshold(183)).unwrap();
        let report = render(&s);
        assert!(report.contains("0 of 3 records"));
        assert!(report.contains("_No rows._"));
        assert!(report.contains("No trend line."));
    }
}
