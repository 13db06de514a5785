//! Plain-text, JSON and HTML renderings of a projection.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use tasklist_core::{Counters, Filter, Projection, Task, TaskStats};
use time::{
    OffsetDateTime,
    format_description::{self, OwnedFormatItem},
};

/// Output format for `ls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON document.
    Json,
    /// HTML fragment with escaped task text.
    Html,
}

/// Compiled `time` format used for creation dates.
#[derive(Debug, Clone)]
pub struct DateStyle {
    items: OwnedFormatItem,
}

impl DateStyle {
    /// Compile a `time` format description such as `[day]/[month]/[year]`.
    pub fn parse(pattern: &str) -> Result<Self> {
        let items = format_description::parse_owned::<2>(pattern)
            .with_context(|| format!("invalid date format '{pattern}'"))?;
        Ok(Self { items })
    }

    /// Format `at`, falling back to the ISO date when the description needs
    /// components the timestamp does not carry.
    pub fn format(&self, at: OffsetDateTime) -> String {
        at.format(&self.items)
            .unwrap_or_else(|_| at.date().to_string())
    }
}

/// Long date shown above the list, e.g. `Friday, 16 October 2026`.
pub fn today_label(today: OffsetDateTime) -> String {
    today
        .format(time::macros::format_description!(
            "[weekday], [day padding:none] [month repr:long] [year]"
        ))
        .unwrap_or_else(|_| today.date().to_string())
}

/// Filter tabs with their counts; the active one is bracketed.
pub fn counters_line(active: Filter, counters: &Counters) -> String {
    Filter::VARIANTS
        .iter()
        .map(|filter| {
            let label = format!("{} ({})", capitalize(filter.as_str()), filter.count(counters));
            if *filter == active {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Message shown when the filter selects nothing.
pub const fn empty_message(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "No tasks yet. Add one with `add <text>`.",
        Filter::Pending => "No pending tasks.",
        Filter::Completed => "No completed tasks.",
    }
}

/// One row per visible task, headed by the date and the counters.
pub fn table(projection: &Projection<'_>, style: &DateStyle, today: OffsetDateTime) -> String {
    let mut lines = vec![
        format!("Tasks for {}", today_label(today)),
        counters_line(projection.filter, &projection.counters),
        String::new(),
    ];
    if projection.is_empty() {
        lines.push(empty_message(projection.filter).to_owned());
        return lines.join("\n");
    }

    let id_width = projection
        .visible
        .iter()
        .map(|task| task.id().get().to_string().len())
        .max()
        .unwrap_or(1);
    let text_width = projection
        .visible
        .iter()
        .map(|task| task.text().as_str().chars().count())
        .max()
        .unwrap_or(0);

    for task in &projection.visible {
        let marker = if task.is_completed() { "[x]" } else { "[ ]" };
        lines.push(format!(
            "{marker} #{id:<id_width$}  {text:<text_width$}  created {date}",
            id = task.id().get(),
            text = task.text().as_str(),
            date = style.format(task.created_at()),
        ));
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct Listing<'a> {
    filter: Filter,
    counters: Counters,
    tasks: &'a [&'a Task],
}

/// Visible tasks with the filter and counters as a pretty-printed JSON document.
pub fn json(projection: &Projection<'_>) -> Result<String> {
    let listing = Listing {
        filter: projection.filter,
        counters: projection.counters,
        tasks: &projection.visible,
    };
    Ok(serde_json::to_string_pretty(&listing)?)
}

/// HTML fragment of the visible tasks. Task text is escaped.
pub fn html(projection: &Projection<'_>, style: &DateStyle) -> String {
    let mut lines = vec![format!(
        "<ul class=\"task-list\" data-filter=\"{}\">",
        projection.filter
    )];
    for task in &projection.visible {
        let (class, checked) = if task.is_completed() {
            ("task-item completed", " checked")
        } else {
            ("task-item", "")
        };
        lines.push(format!(
            "  <li class=\"{class}\" data-task-id=\"{id}\"><input type=\"checkbox\" class=\"task-checkbox\" data-task-id=\"{id}\"{checked}> <span class=\"task-text\">{text}</span> <span class=\"task-date\">{date}</span></li>",
            id = task.id(),
            text = escape_html(task.text().as_str()),
            date = escape_html(&style.format(task.created_at())),
        ));
    }
    lines.push("</ul>".to_owned());
    if projection.is_empty() {
        lines.push(format!(
            "<p class=\"empty-state\">{}</p>",
            escape_html(empty_message(projection.filter))
        ));
    }
    lines.join("\n")
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// One-line summary used by `stats`.
pub fn stats_line(stats: &TaskStats) -> String {
    format!(
        "Total: {}  Pending: {}  Completed: {}  Completion: {}%",
        stats.total, stats.pending, stats.completed, stats.completion_rate
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
