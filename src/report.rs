use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::views::{BarView, Dashboard, ScatterView, View, ZoneView};

const SCATTER_PREVIEW: usize = 10;

pub fn build_report(source: &str, generated_at: DateTime<Utc>, dashboard: &Dashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Supply Chain Analytics Report");
    let _ = writeln!(
        output,
        "Generated from {} ({} records) at {}",
        source,
        dashboard.rows,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    for (idx, view) in dashboard.views.iter().enumerate() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}. {}", idx + 1, view.title());
        match view {
            View::Bar(bar) => write_bar(&mut output, bar),
            View::Scatter(scatter) => write_scatter(&mut output, scatter),
            View::Zones(zones) => write_zones(&mut output, zones),
        }
    }

    output
}

fn write_bar(output: &mut String, view: &BarView) {
    if view.bars.rows.is_empty() {
        let _ = writeln!(output, "No data for this view.");
        return;
    }
    let precision = view.bars.precision as usize;
    for row in &view.bars.rows {
        let _ = writeln!(
            output,
            "- {}: {:.*} ({} records)",
            row.key, precision, row.rounded, row.count
        );
    }
}

fn write_scatter(output: &mut String, view: &ScatterView) {
    let _ = writeln!(
        output,
        "{} points plotted ({} vs {}), {} rows without values.",
        view.points.len(),
        view.y_label,
        view.x_label,
        view.skipped
    );
    for point in view.points.iter().take(SCATTER_PREVIEW) {
        let series = point
            .series
            .as_deref()
            .map(|series| format!(" [{series}]"))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "- {}{}: {:.2}, {:.2}",
            point.sku, series, point.x, point.y
        );
    }
    if view.points.len() > SCATTER_PREVIEW {
        let _ = writeln!(
            output,
            "- ... {} more",
            view.points.len() - SCATTER_PREVIEW
        );
    }
}

fn write_zones(output: &mut String, view: &ZoneView) {
    for zone in view.zone_counts.iter().rev() {
        let _ = writeln!(output, "- {}: {} products", zone.label, zone.count);
    }
    if view.skipped > 0 {
        let _ = writeln!(
            output,
            "- {} rows could not be scored (missing values)",
            view.skipped
        );
    }

    let _ = writeln!(output);
    if view.annotations.is_empty() {
        let _ = writeln!(output, "No products in the top zone.");
        return;
    }
    let _ = writeln!(output, "Top flagged SKUs:");
    for annotation in &view.annotations {
        let _ = writeln!(
            output,
            "- {} score {:.2} ({} {:.0}, {} {:.0})",
            annotation.sku,
            annotation.score,
            view.x_label,
            annotation.x,
            view.y_label,
            annotation.y
        );
    }
}
