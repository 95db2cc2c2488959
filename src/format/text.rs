//! Text formatting functions for `deck`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - Status icons (◌ ○ ◐ ✓ ✗)
//! - Priority badges
//! - Issue line formatting with display-width aware padding

use deck_core::{Issue, Priority, Status};
use unicode_width::UnicodeWidthStr;

/// Status icon characters.
pub mod icons {
    /// Backlog - not yet planned (dotted circle).
    pub const BACKLOG: &str = "◌";
    /// Todo - planned (hollow circle).
    pub const TODO: &str = "○";
    /// In progress - active work (half-filled).
    pub const IN_PROGRESS: &str = "◐";
    /// Done - completed (checkmark).
    pub const DONE: &str = "✓";
    /// Canceled (X mark).
    pub const CANCELED: &str = "✗";
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Backlog => icons::BACKLOG,
        Status::Todo => icons::TODO,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Done => icons::DONE,
        Status::Canceled => icons::CANCELED,
    }
}

/// Short priority badge, e.g. "[urgent]". No priority renders as "[-]".
#[must_use]
pub fn format_priority(priority: Priority) -> String {
    match priority {
        Priority::NoPriority => "[-]".to_string(),
        other => format!("[{}]", other.as_str()),
    }
}

/// Pad `text` with spaces to `width` terminal columns.
#[must_use]
pub fn pad_display(text: &str, width: usize) -> String {
    let shown = UnicodeWidthStr::width(text);
    if shown >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - shown))
}

/// Format a single-line issue summary.
///
/// Format: `{icon} {identifier} {priority} {title} (@{assignee})`
#[must_use]
pub fn format_issue_line(issue: &Issue, assignee: Option<&str>) -> String {
    let mut line = format!(
        "{} {} {} {}",
        format_status_icon(issue.status),
        pad_display(&issue.identifier, 8),
        pad_display(&format_priority(issue.priority), 8),
        issue.title,
    );
    if let Some(name) = assignee {
        line.push_str(&format!(" (@{name})"));
    }
    line
}

/// Fixed-width completion bar, e.g. `[#####-----]  50%`.
#[must_use]
pub fn format_progress_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = (percent * width + 50) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}
