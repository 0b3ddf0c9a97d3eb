//! Diagnostic rendering with source context.
//!
//! Formats diagnostics rustc-style: an `error[E0xx]` header, a `-->`
//! location line, the offending source line with the span underlined, and
//! an optional `help:` hint.

use colored::Colorize;

use crate::diagnostics::{Diagnostic, Severity};

/// Renders diagnostics against the source text they refer to.
pub struct ErrorReporter<'a> {
    source: &'a str,
    filename: Option<&'a str>,
}

impl<'a> ErrorReporter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            filename: None,
        }
    }

    /// Set the filename shown in location lines.
    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    /// Format one diagnostic with source context.
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        let header = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };

        output.push_str(&format!(
            "{}{}{}{} {}\n",
            header,
            "[".bold(),
            diagnostic.kind.code().yellow().bold(),
            "]".bold(),
            diagnostic.message().bold()
        ));

        if let Some(context) = self.source_context(diagnostic.span.start, diagnostic.span.end) {
            let location = if let Some(filename) = self.filename {
                format!("{}:{}:{}", filename, context.line, context.column)
            } else {
                format!("line {}:{}", context.line, context.column)
            };
            output.push_str(&format!("  {} {}\n", "-->".cyan().bold(), location));
            output.push_str(&format!("   {}\n", "|".cyan().bold()));
            output.push_str(&format!(
                " {} {} {}\n",
                format!("{:>3}", context.line).cyan().bold(),
                "|".cyan().bold(),
                context.line_text
            ));
            output.push_str(&format!(
                "   {} {}{}\n",
                "|".cyan().bold(),
                " ".repeat(context.column.saturating_sub(1)),
                "^".repeat(context.span_length.max(1)).red().bold(),
            ));
        }

        if let Some(help) = diagnostic.kind.help() {
            output.push_str(&format!(
                "   {} {}\n",
                "=".cyan().bold(),
                format!("help: {}", help).cyan()
            ));
        }

        output
    }

    /// Format every diagnostic, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn source_context(&self, start: usize, end: usize) -> Option<SourceContext> {
        if start > self.source.len() {
            return None;
        }

        let mut line = 1;
        let mut line_start = 0;
        for (idx, ch) in self.source.char_indices() {
            if idx >= start {
                break;
            }
            if ch == '\n' {
                line += 1;
                line_start = idx + 1;
            }
        }

        let line_end = self.source[line_start..]
            .find('\n')
            .map(|pos| line_start + pos)
            .unwrap_or(self.source.len());

        let line_text = self.source[line_start..line_end].to_string();
        let column = start.saturating_sub(line_start) + 1;
        let span_length = if end <= line_end {
            end.saturating_sub(start)
        } else {
            line_end.saturating_sub(start)
        };

        Some(SourceContext {
            line,
            column,
            line_text,
            span_length,
        })
    }
}

struct SourceContext {
    line: usize,
    column: usize,
    line_text: String,
    span_length: usize,
}
