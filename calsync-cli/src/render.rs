//! TUI rendering traits for calsync types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to calsync-core types using owo_colors.

use calsync_core::diff::{DiffKind, ReconciliationPlan};
use calsync_core::{Account, EventRecord, SyncStats};
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize_diff(*self, self.symbol())
    }
}

/// Colorize text according to the diff kind
fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for Account {
    fn render(&self) -> String {
        format!("📅 {}", self.name)
    }
}

impl Render for EventRecord {
    fn render(&self) -> String {
        format!("{} {}", self.title, render_event_time(self).dimmed())
    }
}

fn render_event_time(event: &EventRecord) -> String {
    let local = |time: Option<DateTime<Utc>>| {
        time.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    format!("{} → {}", local(event.start()), local(event.end()))
}

impl Render for SyncStats {
    fn render(&self) -> String {
        if self.has_errors() {
            let mut failures = Vec::new();
            for (count, label) in [
                (self.io_errors, "network"),
                (self.parse_errors, "data"),
                (self.auth_errors, "authentication"),
                (self.store_errors, "database"),
            ] {
                if count > 0 {
                    failures.push(format!("{label} error"));
                }
            }
            return format!("   {}", format!("Failed: {}", failures.join(", ")).red());
        }

        if self.inserted + self.updated + self.deleted == 0 {
            return "   No changes".dimmed().to_string();
        }

        format!(
            "   Synced: {} created, {} updated, {} deleted",
            self.inserted.green(),
            self.updated.yellow(),
            self.deleted.red()
        )
    }
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Rendering for a reconciliation plan, full or compact
pub trait PlanRender {
    fn render(&self, all: bool) -> String;
}

impl PlanRender for ReconciliationPlan {
    fn render(&self, all: bool) -> String {
        if self.is_empty() {
            return "   No changes".dimmed().to_string();
        }

        let counts = self.counts();
        let total = counts.inserted + counts.updated + counts.deleted;
        let mut lines = Vec::new();

        if all || total <= COMPACT_THRESHOLD {
            for event in &self.to_insert {
                lines.push(render_entry(DiffKind::Create, &event.render()));
            }
            for update in &self.to_update {
                lines.push(render_entry(DiffKind::Update, &update.event.render()));
            }
            for local_id in &self.to_delete {
                lines.push(render_entry(
                    DiffKind::Delete,
                    &format!("local event #{local_id}"),
                ));
            }
        } else {
            for (kind, count, label) in [
                (DiffKind::Create, counts.inserted, "new"),
                (DiffKind::Update, counts.updated, "changed"),
                (DiffKind::Delete, counts.deleted, "deleted"),
            ] {
                if count > 0 {
                    let text = format!("({} {} {})", count, label, pluralize("event", count));
                    lines.push(render_entry(kind, &text));
                }
            }
        }

        lines.join("\n")
    }
}

fn render_entry(kind: DiffKind, text: &str) -> String {
    format!("   {} {}", kind.render(), colorize_diff(kind, text))
}
