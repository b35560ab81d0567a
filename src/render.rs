//! Terminal output for the CLI.

use colored::*;
use terminal_size::{Width, terminal_size};

use jdocs::docs::DocKind;
use jdocs::provision::ProvisionOutcome;
use jdocs::query::SearchResults;
use jdocs::tools::ToolResponse;

use crate::syntax::highlight_java_blocks;

/// Get the current terminal width, defaulting to 80 if unable to detect
fn get_terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        w as usize
    } else {
        80
    }
}

/// Create a separator line that fits the terminal width
fn separator() -> String {
    let width = get_terminal_width().saturating_sub(2).max(40);
    "─".repeat(width.min(120))
}

fn kind_label(kind: DocKind) -> ColoredString {
    match kind {
        DocKind::Class => "class".green(),
        DocKind::Interface => "interface".cyan(),
        DocKind::Enum => "enum".magenta(),
    }
}

pub fn print_search_results(query: &str, results: &SearchResults) {
    if results.is_empty() {
        println!("{} {} ('{}')", "ℹ️".blue(), results, query);
        return;
    }

    println!("\n{} Found {} result(s):\n", "🔍".cyan(), results.len());
    for hit in &results.hits {
        println!("  {} {} {}", "•".cyan(), hit.name.green(), kind_label(hit.kind));
    }
}

pub fn print_document(name: &str, body: &str, highlight: bool) {
    println!("{}", separator().cyan());
    println!("{} {}", "📦".cyan(), name.yellow().bold());
    println!("{}", separator().cyan());
    if highlight {
        println!("{}", highlight_java_blocks(body));
    } else {
        println!("{}", body);
    }
}

/// Print a response from the operation surface; errors go to stderr.
pub fn print_response(response: &ToolResponse) {
    if response.is_error {
        eprintln!("{} {}", "❌".red(), response.text.red());
    } else {
        println!("{}", response.text);
    }
}

pub fn print_outcome(outcome: &ProvisionOutcome) {
    match outcome {
        ProvisionOutcome::LocalOnly => {
            println!("{} Using local documentation bundle", "📚".cyan())
        }
        ProvisionOutcome::Unchanged => {
            println!("{} Documentation up to date", "✅".green())
        }
        ProvisionOutcome::Refreshed { sha256 } => println!(
            "{} Documentation bundle installed ({})",
            "✅".green(),
            sha256[..12.min(sha256.len())].dimmed()
        ),
        ProvisionOutcome::Stale { reason } => {
            println!(
                "{} Refresh failed, serving previous bundle",
                "⚠️".yellow()
            );
            println!("   {}", reason.dimmed());
        }
    }
}
