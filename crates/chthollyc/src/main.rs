//! Chtholly compiler CLI
//!
//! The `chthollyc` command ties the pipeline together: lexer → parser →
//! semantic analyzer. `analyze <file>` exits 0 when the program is clean
//! and 1 when any error diagnostic was produced; diagnostics go to
//! standard error.

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use colored::Colorize;

use chtholly_sema::error_report::ErrorReporter;
use chtholly_sema::{Analysis, Analyzer};

#[derive(Parser)]
#[command(name = "chthollyc")]
#[command(author = "Chtholly Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chtholly compiler - statically-typed systems language with move semantics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run semantic analysis on a source file
    Analyze {
        /// Input source file (.cth)
        input: PathBuf,

        /// Show tokens (lexer output)
        #[arg(long)]
        show_tokens: bool,

        /// Show the AST (parser output)
        #[arg(long)]
        show_ast: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Analyze {
            input,
            show_tokens,
            show_ast,
        } => {
            let source = match fs::read_to_string(&input) {
                Ok(source) => source,
                Err(err) => {
                    eprintln!("{} cannot read {}: {}", "error:".red().bold(), input.display(), err);
                    exit(1);
                }
            };
            let filename = input.display().to_string();
            exit(run_analyze(&source, &filename, show_tokens, show_ast));
        }
    }
}

/// Run the pipeline over source text, printing diagnostics to stderr.
/// Returns the process exit code.
fn run_analyze(source: &str, filename: &str, show_tokens: bool, show_ast: bool) -> i32 {
    if show_tokens {
        match chtholly_lexer::tokenize(source) {
            Ok(tokens) => {
                for token in &tokens {
                    println!("{:?} @ {:?}", token.token, token.span);
                }
            }
            Err(err) => {
                eprintln!("{} {}", "error:".red().bold(), err);
                return 1;
            }
        }
    }

    let program = match chtholly_parser::parse(source) {
        Ok(program) => program,
        Err(err) => {
            match err.span() {
                Some(span) => eprintln!(
                    "{} {} (at byte {})",
                    "error:".red().bold(),
                    err,
                    span.start
                ),
                None => eprintln!("{} {}", "error:".red().bold(), err),
            }
            return 1;
        }
    };

    if show_ast {
        println!("{:#?}", program);
    }

    let analysis = Analyzer::new().analyze(&program);
    report(&analysis, source, filename);

    if analysis.has_errors() {
        1
    } else {
        0
    }
}

fn report(analysis: &Analysis, source: &str, filename: &str) {
    if analysis.diagnostics.is_empty() {
        return;
    }
    let reporter = ErrorReporter::new(source).with_filename(filename);
    eprint!("{}", reporter.format_all(&analysis.diagnostics));

    let errors = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity >= chtholly_sema::Severity::Error)
        .count();
    if errors > 0 {
        eprintln!(
            "\n{} {} previous {}",
            "error:".red().bold(),
            errors,
            if errors == 1 { "error" } else { "errors" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_program_exits_zero() {
        let code = run_analyze(
            "fn main(): void { let x: i32 = 10; }",
            "test.cth",
            false,
            false,
        );
        assert_eq!(code, 0);
    }

    #[test]
    fn test_semantic_error_exits_one() {
        let code = run_analyze(
            "fn main(): void { let x: string = \"a\"; let y: string = x; let z: string = x; }",
            "test.cth",
            false,
            false,
        );
        assert_eq!(code, 1);
    }

    #[test]
    fn test_parse_error_exits_one() {
        let code = run_analyze("fn main(: void {", "test.cth", false, false);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_lex_error_exits_one() {
        let code = run_analyze("let x = $;", "test.cth", true, false);
        assert_eq!(code, 1);
    }
}
