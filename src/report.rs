//! Terminal rendering of analysis results.

use std::io::{self, Write};

use crate::{
    analysis::AnalysisResult,
    ranking::WeakPassages,
    scoring::ScoredPassage,
};

/// Width of the full chart bar (a score of 1.0).
const CHART_WIDTH: usize = 40;

/// Maximum characters of passage text shown in the summary table.
const TABLE_TEXT_CHARS: usize = 60;

pub const EMPTY_CONTENT_WARNING: &str = "Please paste some content to analyze.";
pub const NO_QUERY_NOTICE: &str = "You didn't enter a query, so retrievability scores were not \
     calculated. Add a query and re-run!";
pub const ALL_RELEVANT_NOTICE: &str =
    "All passages are relevant: no weak passages to rewrite!";
pub const NOT_ENOUGH_NOTICE: &str = "Not enough passages to show weak ones. Add more content for \
     better analysis.";

/// Format a score for display, `-` when absent.
pub fn format_score(score: Option<f32>) -> String {
    match score {
        Some(s) => format!("{s:.3}"),
        None => "-".to_string(),
    }
}

/// Write the full human-readable report.
pub fn write_human<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    chart: bool,
) -> io::Result<()> {
    writeln!(out, "Full Analysis Results")?;
    writeln!(out)?;
    write_table(out, result)?;

    if !result.is_scored() {
        writeln!(out)?;
        writeln!(out, "{NO_QUERY_NOTICE}")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Top Passages (High Relevance)")?;
    writeln!(out)?;
    for passage in result.top_passages() {
        write_passage(out, passage)?;
    }

    writeln!(out)?;
    writeln!(out, "Weak Passages (Low Relevance)")?;
    writeln!(out)?;
    match result.weak_status() {
        Some(WeakPassages::Found(_)) => {
            for passage in result.weak_passages() {
                write_passage(out, passage)?;
            }
        }
        Some(WeakPassages::AllRelevant) => writeln!(out, "{ALL_RELEVANT_NOTICE}")?,
        Some(WeakPassages::NotEnoughPassages) | None => {
            writeln!(out, "{NOT_ENOUGH_NOTICE}")?
        }
    }

    if chart {
        writeln!(out)?;
        writeln!(out, "Retrievability Score Chart")?;
        writeln!(out)?;
        write_chart(out, result)?;
    }

    Ok(())
}

/// Write one row per passage: label, score and a truncated preview.
pub fn write_table<W: Write>(out: &mut W, result: &AnalysisResult) -> io::Result<()> {
    let label_width = label_width(result);
    for passage in result.passages() {
        writeln!(
            out,
            "{:<label_width$}  {:>5}  {}",
            passage.label(),
            format_score(passage.score),
            preview(passage.text(), TABLE_TEXT_CHARS),
        )?;
    }
    writeln!(out, "\n{} passage(s)", result.len())
}

/// Write a horizontal bar per scored passage. Negative scores draw no bar.
pub fn write_chart<W: Write>(out: &mut W, result: &AnalysisResult) -> io::Result<()> {
    let label_width = label_width(result);
    let bar_width = CHART_WIDTH;
    for (label, score) in result.score_series() {
        let filled = (score.clamp(0.0, 1.0) * bar_width as f32).round() as usize;
        writeln!(
            out,
            "{label:<label_width$} |{:<bar_width$}| {score:.3}",
            "#".repeat(filled),
        )?;
    }
    Ok(())
}

fn write_passage<W: Write>(out: &mut W, passage: &ScoredPassage) -> io::Result<()> {
    writeln!(
        out,
        "{} | Score: {}",
        passage.label(),
        format_score(passage.score)
    )?;
    writeln!(out, "    {}", passage.text())?;
    writeln!(out, "---")
}

fn label_width(result: &AnalysisResult) -> usize {
    result
        .passages()
        .iter()
        .map(|p| p.label().len())
        .max()
        .unwrap_or(0)
}

/// Truncate text to `max_chars` characters, appending `...` when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

/// Print the result as JSON.
pub fn write_json<W: Write>(out: &mut W, result: &AnalysisResult) -> crate::Result<()> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out)?;
    Ok(())
}
