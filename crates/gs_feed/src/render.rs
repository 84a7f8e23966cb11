use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gs_core::{Article, MAX_BATCH_SIZE};
use tracing::warn;

use crate::navigator::Direction;

/// Consumer of batches picked by the navigator.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Runs the exit transition of whatever is on screen. The navigator
    /// renders the next batch only after this returns.
    async fn transition_out(&self, direction: Direction);

    fn render(&self, batch: &[Article]);
}

/// Writes batches as plain text.
pub struct TextRenderer<W: Write + Send> {
    out: Mutex<W>,
    line_ending: &'static str,
    showing: AtomicBool,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            line_ending: "\n",
            showing: AtomicBool::new(false),
        }
    }

    /// Terminals in raw mode need an explicit carriage return.
    pub fn raw_mode(mut self) -> Self {
        self.line_ending = "\r\n";
        self
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let mut result = Ok(());
        for line in lines {
            result = write!(out, "{}{}", line, self.line_ending);
            if result.is_err() {
                break;
            }
        }
        if let Err(e) = result.and_then(|_| out.flush()) {
            warn!("Failed to write batch: {}", e);
        }
    }
}

#[async_trait]
impl<W: Write + Send> Renderer for TextRenderer<W> {
    async fn transition_out(&self, direction: Direction) {
        if !self.showing.swap(false, Ordering::SeqCst) {
            return;
        }
        let marker = match direction {
            Direction::Forward => "──────────── ▶ ────────────",
            Direction::Backward => "──────────── ◀ ────────────",
        };
        self.write_lines(&[marker.to_string()]);
    }

    fn render(&self, batch: &[Article]) {
        let mut lines = Vec::new();
        let visible = batch
            .iter()
            .filter(|a| !(a.title.is_empty() && a.description.is_empty() && a.content.is_empty()))
            .take(MAX_BATCH_SIZE);

        for (i, article) in visible.enumerate() {
            lines.extend(describe(i + 1, article));
        }
        if lines.is_empty() {
            lines.push("No news to show.".to_string());
        }

        self.write_lines(&lines);
        self.showing.store(true, Ordering::SeqCst);
    }
}

fn describe(number: usize, article: &Article) -> Vec<String> {
    let title = if article.title.is_empty() {
        "Untitled"
    } else {
        article.title.as_str()
    };
    let by = article
        .author
        .as_deref()
        .or(article.source.as_deref())
        .unwrap_or("Unknown");
    let byline = match format_date_dmy(&article.published_at) {
        Some(date) => format!("{}, Published on {}", by, date),
        None => by.to_string(),
    };
    let body = if article.description.is_empty() {
        article.content.as_str()
    } else {
        article.description.as_str()
    };

    let mut lines = vec![format!("[{}] {}", number, title), format!("    {}", byline)];
    if !body.is_empty() {
        lines.push(format!("    {}", body));
    }
    if !article.url.is_empty() {
        lines.push(format!("    {}", article.url));
    }
    lines.push(String::new());
    lines
}

/// Formats an ISO-8601 timestamp (or bare date) as `dd/mm/yyyy`.
pub fn format_date_dmy(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%d/%m/%Y").to_string())
}
