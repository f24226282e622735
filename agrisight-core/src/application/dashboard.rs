// agrisight-core/src/application/dashboard.rs

use chrono::Utc;
use serde::Serialize;
use std::path::Path;

use crate::application::ports::TemplateEngine;
use crate::application::session::DashboardView;
use crate::error::AgrisightError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

pub const DASHBOARD_FILE: &str = "dashboard.html";

// --- VIEW MODEL ---
// Bar widths are computed here so the template stays free of arithmetic.

#[derive(Serialize)]
struct RegionBar {
    key: String,
    coverage_rate: Option<f64>,
    claim_rate: Option<f64>,
    total_payout: f64,
    payout_width: f64,
}

#[derive(Serialize)]
struct IssueRow {
    issue: String,
    records: usize,
}

#[derive(Serialize)]
struct DashboardPage<'a> {
    project_name: &'a str,
    generated_at: String,
    view: &'a DashboardView,
    region_bars: Vec<RegionBar>,
    issues: Vec<IssueRow>,
    alert_message: String,
}

fn page<'a>(project_name: &'a str, view: &'a DashboardView) -> DashboardPage<'a> {
    let max_payout = view
        .regions
        .iter()
        .map(|g| g.summary.total_payout)
        .fold(0.0_f64, f64::max);
    let region_bars = view
        .regions
        .iter()
        .map(|g| RegionBar {
            key: g.key.clone(),
            coverage_rate: g.summary.coverage_rate,
            claim_rate: g.summary.claim_rate,
            total_payout: g.summary.total_payout,
            payout_width: if max_payout > 0.0 {
                (g.summary.total_payout / max_payout * 100.0).round()
            } else {
                0.0
            },
        })
        .collect();
    let issues = view
        .quality
        .issue_counts
        .iter()
        .map(|(issue, n)| IssueRow {
            issue: issue.to_string(),
            records: *n,
        })
        .collect();

    DashboardPage {
        project_name,
        generated_at: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        view,
        region_bars,
        issues,
        alert_message: view.alert_message(),
    }
}

pub fn render_dashboard(
    engine: &dyn TemplateEngine,
    project_name: &str,
    view: &DashboardView,
) -> Result<String, AgrisightError> {
    let context = serde_json::to_value(page(project_name, view))
        .map_err(|e| AgrisightError::Infrastructure(InfrastructureError::JsonError(e)))?;
    engine.render(DASHBOARD_TEMPLATE, &context)
}

/// Renders and writes `dashboard.html` into `target_dir`.
pub fn write_dashboard(
    engine: &dyn TemplateEngine,
    project_name: &str,
    view: &DashboardView,
    target_dir: &Path,
) -> Result<std::path::PathBuf, AgrisightError> {
    let html = render_dashboard(engine, project_name, view)?;
    let path = target_dir.join(DASHBOARD_FILE);
    atomic_write(&path, html)?;
    Ok(path)
}

// --- EMBEDDED HTML TEMPLATE ---
// Tailwind via CDN, no script: the file is a static snapshot of one selection.
const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ project_name }} · Farmer Survey Dashboard</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50 text-gray-900 font-sans">

    <nav class="bg-emerald-900 text-white p-4 shadow-lg">
        <div class="container mx-auto flex justify-between items-center">
            <div class="flex items-center space-x-2">
                <span class="text-2xl">🌾</span>
                <h1 class="text-xl font-bold tracking-tight">{{ project_name }}</h1>
            </div>
            <div class="text-sm text-emerald-200">Generated {{ generated_at }}</div>
        </div>
    </nav>

    <div class="container mx-auto p-6 space-y-8">

        <div class="bg-white p-4 rounded-lg shadow-sm border border-gray-200 text-sm">
            <span class="text-xs text-gray-500 uppercase font-bold mr-2">Selection</span>
            {{ view.filter_summary }} · {{ view.filtered_records | thousands }} records
            {% if view.options.min_date %}
            <span class="text-gray-400 ml-2">(survey dates {{ view.options.min_date }} to {{ view.options.max_date }})</span>
            {% endif %}
        </div>

        <div class="grid grid-cols-2 md:grid-cols-4 gap-6">
            <div class="bg-white p-4 rounded-lg shadow-sm border border-gray-200">
                <div class="text-xs text-gray-500 uppercase font-bold">Farmers Surveyed</div>
                <div class="text-3xl font-bold">{{ view.kpis.unique_farmers | thousands }}</div>
            </div>
            <div class="bg-white p-4 rounded-lg shadow-sm border border-gray-200">
                <div class="text-xs text-gray-500 uppercase font-bold">Insured Farmers</div>
                <div class="text-3xl font-bold">{{ view.kpis.insured | thousands }}</div>
                <div class="text-sm text-emerald-700">{{ view.kpis.coverage_rate | pct }} coverage</div>
            </div>
            <div class="bg-white p-4 rounded-lg shadow-sm border border-gray-200">
                <div class="text-xs text-gray-500 uppercase font-bold">Total Payout</div>
                <div class="text-3xl font-bold">{{ view.kpis.total_payout | usd }}</div>
                <div class="text-sm text-gray-500">{{ view.kpis.claim_rate | pct }} claim rate</div>
            </div>
            <div class="bg-white p-4 rounded-lg shadow-sm border border-gray-200">
                <div class="text-xs text-gray-500 uppercase font-bold">Avg Payout per Claim</div>
                <div class="text-3xl font-bold">{{ view.kpis.avg_payout_per_claim | usd }}</div>
            </div>
        </div>

        <section class="bg-white p-6 rounded-xl shadow-sm border border-gray-200">
            <h2 class="text-lg font-bold mb-4">Insurance Coverage vs Claim Rate by Region</h2>
            {% for r in region_bars %}
            <div class="mb-3">
                <div class="flex justify-between text-sm"><span class="font-medium">{{ r.key }}</span>
                    <span class="text-gray-500">{{ r.coverage_rate | pct }} / {{ r.claim_rate | pct }}</span></div>
                <div class="h-2 bg-gray-100 rounded"><div class="h-2 bg-emerald-500 rounded" style="width: {{ r.coverage_rate or 0 }}%"></div></div>
                <div class="h-2 bg-gray-100 rounded mt-1"><div class="h-2 bg-amber-500 rounded" style="width: {{ r.claim_rate or 0 }}%"></div></div>
            </div>
            {% else %}
            <p class="text-gray-500">No records in this selection.</p>
            {% endfor %}
        </section>

        <section class="bg-white p-6 rounded-xl shadow-sm border border-gray-200">
            <h2 class="text-lg font-bold mb-4">Total Payout by Region (USD)</h2>
            {% for r in region_bars %}
            <div class="flex items-center mb-2 text-sm">
                <span class="w-40 font-medium">{{ r.key }}</span>
                <div class="flex-1 h-3 bg-gray-100 rounded mr-3"><div class="h-3 bg-indigo-500 rounded" style="width: {{ r.payout_width }}%"></div></div>
                <span class="w-28 text-right font-mono">{{ r.total_payout | usd }}</span>
            </div>
            {% endfor %}
        </section>

        <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
            <section class="bg-white p-6 rounded-xl shadow-sm border border-gray-200">
                <h2 class="text-lg font-bold mb-4">Regional Risk Ranking</h2>
                <table class="w-full text-sm">
                    <thead><tr class="text-left text-xs uppercase text-gray-400">
                        <th>Region</th><th class="text-right">Records</th><th class="text-right">Insured</th><th class="text-right">Claims</th><th class="text-right">Claim Rate</th>
                    </tr></thead>
                    <tbody>
                    {% for g in view.risk_ranking %}
                    <tr class="border-t border-gray-100">
                        <td class="py-1">{{ g.key }}</td><td class="text-right">{{ g.records }}</td><td class="text-right">{{ g.insured }}</td><td class="text-right">{{ g.claims }}</td><td class="text-right">{{ g.claim_rate | pct }}</td>
                    </tr>
                    {% endfor %}
                    </tbody>
                </table>
            </section>

            <section class="bg-white p-6 rounded-xl shadow-sm border border-gray-200">
                <h2 class="text-lg font-bold mb-4">Agent Performance</h2>
                <table class="w-full text-sm">
                    <thead><tr class="text-left text-xs uppercase text-gray-400">
                        <th>Agent</th><th class="text-right">Records</th><th class="text-right">Coverage</th><th class="text-right">Payout</th>
                    </tr></thead>
                    <tbody>
                    {% for g in view.agents %}
                    <tr class="border-t border-gray-100">
                        <td class="py-1 font-mono">{{ g.key }}</td><td class="text-right">{{ g.records }}</td><td class="text-right">{{ g.coverage_rate | pct }}</td><td class="text-right">{{ g.total_payout | usd }}</td>
                    </tr>
                    {% endfor %}
                    </tbody>
                </table>
            </section>
        </div>

        <section class="bg-white p-6 rounded-xl shadow-sm border border-gray-200">
            <h2 class="text-lg font-bold mb-4">Data Quality</h2>
            <div class="text-sm mb-4">
                Clean rate <span class="font-bold">{{ view.quality.clean_rate | pct }}</span>
                ({{ view.quality.clean_records }} clean / {{ view.quality.flagged_records }} flagged)
            </div>
            <div class="grid grid-cols-2 md:grid-cols-5 gap-4 mb-4">
                {% for i in issues %}
                <div class="bg-slate-50 p-3 rounded text-center">
                    <div class="text-xs text-gray-500 font-mono">{{ i.issue }}</div>
                    <div class="text-xl font-bold">{{ i.records }}</div>
                </div>
                {% endfor %}
            </div>
            {% if view.alerts %}
            <div id="quality-alert" class="p-3 rounded border border-amber-400 bg-amber-50 text-amber-900 text-sm">⚠️ {{ alert_message }}</div>
            {% else %}
            <div id="quality-alert" class="p-3 rounded border border-emerald-400 bg-emerald-50 text-emerald-900 text-sm">✅ {{ alert_message }}</div>
            {% endif %}
        </section>

    </div>
</body>
</html>
"#;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::session::DashboardSession;
    use crate::domain::filter::SurveyFilter;
    use crate::domain::kpi::KpiConfig;
    use crate::domain::quality::{QualityConfig, QualityEngine};
    use crate::domain::survey::record::fixtures::*;
    use crate::infrastructure::template::JinjaRenderer;
    use anyhow::Result;

    fn view() -> DashboardView {
        let mut tigray = claimed("F-2", 30979.56);
        tigray.region = Some("Tigray".into());
        let records = vec![insured("F-1"), tigray, record("F-3")];
        let report = QualityEngine::new(QualityConfig::default()).evaluate(records);
        DashboardSession::new(report, KpiConfig::default()).recompute(&SurveyFilter::all())
    }

    #[test]
    fn test_dashboard_contains_cards_and_regions() -> Result<()> {
        let html = render_dashboard(&JinjaRenderer::new(), "east-africa-survey", &view())?;
        assert!(html.contains("east-africa-survey"));
        assert!(html.contains("$30,979.56"));
        assert!(html.contains("Tigray"));
        assert!(html.contains("Rift Valley"));
        assert!(html.contains("66.7% coverage"));
        assert!(html.contains("Data quality looks good"));
        Ok(())
    }

    #[test]
    fn test_payout_bars_are_relative_to_the_largest_region() {
        let v = view();
        let p = page("x", &v);
        let tigray = p.region_bars.iter().find(|b| b.key == "Tigray").unwrap();
        let rift = p.region_bars.iter().find(|b| b.key == "Rift Valley").unwrap();
        assert_eq!(tigray.payout_width, 100.0);
        assert_eq!(rift.payout_width, 0.0);
    }

    #[test]
    fn test_write_dashboard() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_dashboard(&JinjaRenderer::new(), "demo", &view(), dir.path())?;
        assert!(path.ends_with(DASHBOARD_FILE));
        assert!(std::fs::read_to_string(path)?.starts_with("<!DOCTYPE html>"));
        Ok(())
    }
}
