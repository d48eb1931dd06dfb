use crate::config::OutputFormat;
use crate::historical::utils::format_timestamp;
use crate::pipeline::ProfileReport;

/// Render a report in the configured format
pub fn render(report: &ProfileReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => render_json(report),
    }
}

pub fn render_json(report: &ProfileReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Plain-text table of the selected levels, one row per bin
pub fn render_table(report: &ProfileReport) -> String {
    let profile = &report.profile;
    let mut out = format!("{} {} ({})\n", report.symbol, report.interval, report.source);

    if let Some(span) = report.span {
        out.push_str(&format!(
            "span:   {} -> {}\n",
            format_timestamp(span.start),
            format_timestamp(span.end)
        ));
    }
    out.push_str(&format!(
        "range:  {} - {}  step {}  candles {}  total volume {}\n",
        profile.range.min, profile.range.max, profile.step, profile.candle_count, profile.total_volume
    ));
    out.push_str(&format!(
        "levels: {} of {} bins (top score {})\n",
        profile.levels.len(),
        profile.bins.len(),
        profile.top_score
    ));

    if profile.levels.is_empty() {
        out.push_str("no significant levels\n");
        return out;
    }

    out.push_str(&format!(
        "{:>5} {:>18} {:>8} {:>14} {:>7} {:>10}\n",
        "bin", "price", "hits", "volume", "weight", "score"
    ));
    for bin in &profile.levels {
        out.push_str(&format!(
            "{:>5} {:>18.6} {:>8} {:>14} {:>7} {:>10}\n",
            bin.index, bin.midpoint, bin.hits, bin.volume, bin.weight, bin.score
        ));
    }
    out
}
