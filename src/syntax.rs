use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Fenced ```java blocks in a markdown document.
static JAVA_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```java[ \t]*\n(.*?)^```[ \t]*$").expect("valid fence pattern")
});

pub fn highlight_java_code(code: &str) -> String {
    let syntax = SYNTAX_SET
        .find_syntax_by_extension("java")
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut h = HighlightLines::new(syntax, &THEME_SET.themes["base16-ocean.dark"]);

    let mut highlighted = String::new();
    for line in LinesWithEndings::from(code) {
        match h.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => {
                highlighted.push_str(&syntect::util::as_24_bit_terminal_escaped(&ranges, false))
            }
            Err(_) => highlighted.push_str(line),
        }
    }
    highlighted.push_str("\x1b[0m");
    highlighted
}

/// Highlight the Java code blocks of a documentation page, leaving the rest
/// of the text untouched.
pub fn highlight_java_blocks(markdown: &str) -> String {
    JAVA_FENCE
        .replace_all(markdown, |caps: &Captures| {
            format!("```java\n{}```", highlight_java_code(&caps[1]))
        })
        .into_owned()
}
