//! Error display with source context

use madlad_api::MadladError;

/// Lines shown before and after the offending one
const CONTEXT_LINES: usize = 5;

/// Print the error report, then the source around its location
pub fn print_error_with_source(e: &MadladError, source: &str) {
    eprintln!("error: {}", e.to_report());

    if let MadladError::Syntax(errors) = e {
        for extra in errors.iter().skip(1) {
            eprintln!("  also: {extra}");
        }
    }

    if let (Some(line), Some(col)) = (e.line(), e.column()) {
        print_source_context(source, line, col);
    }
}

pub fn print_source_context(source: &str, error_line: usize, error_col: usize) {
    eprint!("{}", render_source_context(source, error_line, error_col));
}

fn render_source_context(source: &str, error_line: usize, error_col: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return String::new();
    }

    let start = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end = (error_line + CONTEXT_LINES).min(lines.len());
    let width = end.to_string().len();
    let rule = format!("{}|--\n", "-".repeat(width + 1));

    let mut out = rule.clone();
    for (number, content) in (start..=end).zip(&lines[start - 1..end]) {
        out.push_str(&format!("{number:>width$} | {content}\n"));
        if number == error_line {
            let marker = " ".repeat(error_col.saturating_sub(1));
            out.push_str(&format!("{} | {marker}^\n", " ".repeat(width)));
        }
    }
    out.push_str(&rule);
    out
}
