//! Interactive lookup mode

use colored::*;
use std::io::{self, BufRead, Write};

use jdocs::error::QueryError;
use jdocs::query::QueryEngine;

use crate::render::{print_document, print_response, print_search_results};

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Help,
    Search(&'a str),
    Get(&'a str),
    Usage(&'static str),
}

fn parse_command(input: &str) -> Command<'_> {
    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    match head {
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => Command::Help,
        "search" if rest.is_empty() => Command::Usage("search <query>"),
        "search" => Command::Search(rest),
        "get" if rest.is_empty() => Command::Usage("get <fully.qualified.Name>"),
        "get" => Command::Get(rest),
        // Bare input is a search
        _ => Command::Search(input),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  {} <query>   - Search class names", "search".green());
    println!("  {} <name>       - Show documentation for a class", "get".green());
    println!("  {}                - Exit", "quit".green());
}

/// Offer close names after a failed lookup
fn suggest(engine: &QueryEngine, name: &str) {
    let Ok(results) = engine.search(name) else {
        return;
    };
    if results.is_empty() {
        return;
    }
    println!("\n{} Did you mean one of these?\n", "ℹ️".blue());
    for hit in results.hits.iter().take(5) {
        println!("  {} {}", "•".cyan(), hit.name.green());
    }
}

pub fn run_repl(engine: &QueryEngine, highlight: bool) -> io::Result<()> {
    println!("{}", "╔═══════════════════════════════════════════╗".cyan());
    println!("{}", "║   Java API Documentation Lookup           ║".cyan());
    println!("{}", "╚═══════════════════════════════════════════╝".cyan());
    println!();
    print_help();
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", "jdocs>".blue().bold());
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_command(input) {
            Command::Quit => {
                println!("Goodbye! 👋");
                break;
            }
            Command::Help => print_help(),
            Command::Usage(usage) => println!("{} Usage: {}", "⚠️".yellow(), usage),
            Command::Search(query) => match engine.search(query) {
                Ok(results) => print_search_results(query, &results),
                Err(e) => print_response(&e.into()),
            },
            Command::Get(name) => match engine.retrieve(name) {
                Ok(body) => print_document(name, &body, highlight),
                Err(e) => {
                    let not_found = matches!(e, QueryError::NameNotFound(_));
                    print_response(&e.into());
                    if not_found {
                        suggest(engine, name);
                    }
                }
            },
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("?"), Command::Help);
        assert_eq!(parse_command("search  Hash Map"), Command::Search("Hash Map"));
        assert_eq!(parse_command("get java.util.List"), Command::Get("java.util.List"));
        assert_eq!(parse_command("get"), Command::Usage("get <fully.qualified.Name>"));
        assert_eq!(parse_command("HashMap"), Command::Search("HashMap"));
    }
}
