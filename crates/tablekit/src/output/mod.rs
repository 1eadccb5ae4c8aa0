//! Output formatting functions.
//!
//! Results go to stdout as pretty text or JSON. Status lines are pretty-only
//! and suppressed by `--silent`.

pub mod json;
pub mod pretty;

use tablekit_core::storage::{Page, WriteOutcome};
use tablekit_core::table::TableDescription;
use tablekit_core::value::Item;

use crate::cli::{Global, OutputFormat};
use crate::loader::LoadSummary;
use crate::prelude::*;

/// Format a value for output.
pub fn format_output<T: serde::Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Writes command results in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
    silent: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, silent: bool) -> Self {
        Self { format, silent }
    }

    pub fn from_global(global: &Global) -> Self {
        Self::new(global.format, global.is_silent())
    }

    fn is_pretty(&self) -> bool {
        self.format == OutputFormat::Pretty
    }

    /// A progress or status line.
    pub fn status(&self, line: &str) {
        if self.is_pretty() && !self.silent {
            aprintln!("{line}");
        }
    }

    /// A section header.
    pub fn section(&self, title: &str) {
        if self.is_pretty() && !self.silent {
            aprintln!();
            aprintln!("{}", p_c(&format!("== {title} ==")));
        }
    }

    pub fn table(&self, description: &TableDescription) {
        match self.format {
            OutputFormat::Json => aprintln!("{}", format_output(&json::table(description), self.format)),
            OutputFormat::Pretty => aprintln!("{}", pretty::format_table(description)),
        }
    }

    pub fn item(&self, item: Option<&Item>) {
        match self.format {
            OutputFormat::Json => aprintln!("{}", format_output(&json::item(item), self.format)),
            OutputFormat::Pretty => aprintln!("{}", pretty::format_lookup(item)),
        }
    }

    pub fn outcome(&self, operation: &str, outcome: &WriteOutcome<Option<Item>>) {
        match self.format {
            OutputFormat::Json => aprintln!("{}", format_output(&json::outcome(outcome), self.format)),
            OutputFormat::Pretty => {
                let text = pretty::format_outcome(operation, outcome);
                if outcome.is_applied() {
                    aprintln!("{}", p_g(&text));
                } else {
                    aprintln!("{}", p_y(&text));
                }
            }
        }
    }

    /// One `year : title` line per item, then the counts.
    pub fn page(&self, page: &Page) {
        match self.format {
            OutputFormat::Json => aprintln!("{}", format_output(&json::page(page), self.format)),
            OutputFormat::Pretty => {
                for item in &page.items {
                    aprintln!("{}", pretty::format_result_line(item));
                }
                aprintln!("{}", p_b(&pretty::format_page_summary(page)));
            }
        }
    }

    pub fn load_summary(&self, summary: &LoadSummary) {
        match self.format {
            OutputFormat::Json => {
                aprintln!("{}", format_output(&json::load_summary(summary), self.format))
            }
            OutputFormat::Pretty if summary.failed.is_empty() => {
                aprintln!("{}", p_g(&pretty::format_load_summary(summary)))
            }
            OutputFormat::Pretty => aprintln!("{}", p_y(&pretty::format_load_summary(summary))),
        }
    }
}
