//! The Wyn compiler frontend CLI.
//!
//! `wync <file.wyn>` lexes, parses, and analyzes a Wyn source file and
//! reports diagnostics. Analysis always runs between parsing and any
//! later phase; a non-zero exit code means at least one error.
//!
//! Options:
//! - `--json` - emit diagnostics as JSON instead of rendered reports

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as ClapParser;

use wyn_common::span::LineIndex;

#[derive(ClapParser)]
#[command(name = "wync", version, about = "The Wyn compiler frontend")]
struct Cli {
    /// The Wyn source file to check
    file: PathBuf,

    /// Emit diagnostics as JSON, one object per error
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli.file, cli.json) {
        Ok(clean) => {
            if !clean {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Execute the pipeline: read -> parse -> analyze -> report.
/// Returns `Ok(false)` when diagnostics were reported.
fn run(file: &Path, json: bool) -> Result<bool, String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read '{}': {e}", file.display()))?;

    let parse = wyn_parser::parse(&source);
    let base_dir = file.parent().unwrap_or(Path::new("."));
    let sema = wyn_sema::check_in_dir(&parse, base_dir);

    let clean = if json {
        report_json(&source, &parse, &sema)
    } else {
        report_rendered(&source, file, &parse, &sema)
    };

    if clean {
        eprintln!("  Checked: {}", file.display());
    }
    Ok(clean)
}

/// Render lex, parse, and semantic diagnostics with ariadne.
/// Returns true when there were none.
fn report_rendered(
    source: &str,
    path: &Path,
    parse: &wyn_parser::Parse,
    sema: &wyn_sema::SemaResult,
) -> bool {
    use ariadne::{Config, Label, Report, ReportKind, Source};

    let file_name = path.display().to_string();
    let mut clean = true;

    let emit = |message: &str, range: std::ops::Range<usize>| {
        let range = clamp(range, source.len());
        let report = Report::build(ReportKind::Error, range.clone())
            .with_message(message)
            .with_config(Config::default().with_color(false))
            .with_label(Label::new(range).with_message(message))
            .finish();
        let _ = report.eprint(Source::from(source));
    };

    for err in &parse.lex_errors {
        clean = false;
        emit(&err.to_string(), err.span.range());
    }
    for err in &parse.errors {
        clean = false;
        emit(&err.to_string(), err.span.range());
    }
    for rendered in sema.render_errors(source, &file_name) {
        clean = false;
        eprint!("{rendered}");
    }

    clean && !sema.had_error
}

/// One JSON object per diagnostic on stdout.
/// Returns true when there were none.
fn report_json(source: &str, parse: &wyn_parser::Parse, sema: &wyn_sema::SemaResult) -> bool {
    let index = LineIndex::new(source);
    let mut diagnostics = Vec::new();

    for err in &parse.lex_errors {
        diagnostics.push(diag_json(&index, "lex", &err.to_string(), err.span.start, None));
    }
    for err in &parse.errors {
        diagnostics.push(diag_json(&index, "parse", &err.to_string(), err.span.start, None));
    }
    for err in &sema.errors {
        diagnostics.push(diag_json(
            &index,
            "sema",
            &err.to_string(),
            err.span().start,
            Some(wyn_sema::diagnostics::error_code(err)),
        ));
    }

    let clean = diagnostics.is_empty();
    let payload = serde_json::json!({ "diagnostics": diagnostics, "ok": clean });
    println!("{payload}");
    clean
}

fn diag_json(
    index: &LineIndex,
    phase: &str,
    message: &str,
    offset: u32,
    code: Option<&str>,
) -> serde_json::Value {
    let (line, column) = index.line_col(offset);
    serde_json::json!({
        "phase": phase,
        "message": message,
        "line": line,
        "column": column,
        "code": code,
    })
}

fn clamp(r: std::ops::Range<usize>, len: usize) -> std::ops::Range<usize> {
    let s = r.start.min(len);
    let e = r.end.min(len).max(s);
    if s == e {
        s..e.saturating_add(1).min(len)
    } else {
        s..e
    }
}
