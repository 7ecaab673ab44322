// Round results: outcome, summary statistics, and the results-screen markup.
use super::session::{AnswerRecord, Mode};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    PracticeComplete,
    /// Steel-Grub ended on a wrong answer.
    GrubTrapped,
    /// Perfect Steel-Grub run inside the winning time.
    GrubMaster,
    /// Perfect Steel-Grub run, too slow for the certificate.
    AllFreed,
}

impl Outcome {
    pub fn decide(mode: Mode, incorrect: usize, total_ms: f64, winning_time_ms: f64) -> Self {
        match mode {
            Mode::Practice => Outcome::PracticeComplete,
            Mode::SteelGrub if incorrect > 0 => Outcome::GrubTrapped,
            Mode::SteelGrub if total_ms <= winning_time_ms => Outcome::GrubMaster,
            Mode::SteelGrub => Outcome::AllFreed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuizSummary {
    pub mode: Mode,
    pub outcome: Outcome,
    pub problems_completed: usize,
    pub total_problems: usize,
    pub incorrect: usize,
    pub total_ms: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakdownRow {
    pub number: usize,
    pub question: String,
    pub expected: i64,
    pub answer: Option<AnswerRecord>,
}

/// `"1m 5s"` from a minute upward, `"7.3s"` (tenths) below.
pub fn format_time(ms: f64) -> String {
    let ms = ms.max(0.0);
    let seconds = (ms / 1000.0).floor() as u64;
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    let tenths = ((ms % 1000.0) / 100.0).floor() as u64;
    if minutes > 0 {
        format!("{minutes}m {remaining_seconds}s")
    } else {
        format!("{remaining_seconds}.{tenths}s")
    }
}

/// Live timer text, `m:ss`.
pub fn format_clock(ms: f64) -> String {
    let seconds = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn render_results(summary: &QuizSummary, rows: &[BreakdownRow]) -> String {
    let mut html = String::from("<div class=\"results-header\">");
    match summary.outcome {
        Outcome::GrubTrapped => {
            html.push_str("<img src=\"assets/images/grub_bottle.png\" alt=\"Disappointed Grub\">");
            html.push_str("<h2>Grub Trapped!</h2>");
        }
        Outcome::GrubMaster => {
            html.push_str("<img src=\"assets/images/grub_freed.gif\" alt=\"Freed Grub\">");
            html.push_str("<div class=\"ticket\">");
            html.push_str("<h3>🎉 GRUB MASTER CERTIFICATE 🎉</h3>");
            html.push_str("<p>Screenshot this certificate to claim a special Grub Plush!</p>");
            let _ = write!(html, "<p class=\"ticket-time\">Time: {}</p>", format_time(summary.total_ms));
            html.push_str("</div>");
        }
        Outcome::AllFreed => {
            html.push_str("<img src=\"assets/images/grub_freed.gif\" alt=\"Freed Grub\">");
            html.push_str("<h2>All Grubs Freed!</h2>");
        }
        Outcome::PracticeComplete => html.push_str("<h2>Practice Complete!</h2>"),
    }
    html.push_str("</div>");

    html.push_str("<div class=\"results-summary\">");
    let _ = write!(
        html,
        "<p><strong>Problems Completed:</strong> {} / {}</p>",
        summary.problems_completed, summary.total_problems
    );
    let _ = write!(html, "<p><strong>Incorrect Answers:</strong> {}</p>", summary.incorrect);
    let _ = write!(html, "<p><strong>Total Time:</strong> {}</p>", format_time(summary.total_ms));
    html.push_str("</div>");

    html.push_str("<div class=\"results-actions\">");
    html.push_str("<button class=\"btn\" id=\"breakdown-toggle\">Show Detailed Breakdown</button>");
    html.push_str("<button class=\"btn\" id=\"play-again\">Play Again</button>");
    html.push_str("</div>");

    html.push_str("<div id=\"detailed-breakdown\" style=\"display: none;\">");
    html.push_str(&render_breakdown(rows));
    html.push_str("</div>");
    html
}

pub fn render_breakdown(rows: &[BreakdownRow]) -> String {
    let mut html = String::from("<div class=\"detailed-breakdown\"><h3>Problem Breakdown</h3>");
    html.push_str(
        "<div class=\"problem-row header\"><div>#</div><div>Problem</div><div>Your Answer</div><div class=\"time\">Time</div></div>",
    );
    for row in rows {
        html.push_str("<div class=\"problem-row\">");
        let _ = write!(html, "<div>{}</div><div>{} = {}</div>", row.number, row.question, row.expected);
        match &row.answer {
            Some(a) => {
                let (class, mark) = if a.correct { ("correct", "✓") } else { ("incorrect", "✗") };
                let _ = write!(html, "<div class=\"status {class}\">{} {mark}</div>", a.given);
                let _ = write!(html, "<div class=\"time\">{}</div>", format_time(a.elapsed_ms));
            }
            None => html.push_str("<div>—</div><div class=\"time\">—</div>"),
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}
