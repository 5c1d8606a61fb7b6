//! Evalview: evaluation report generator CLI

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use evalview::document::EvalDocument;
use evalview::mapping::QuestionCaseMap;
use evalview::matcher;
use evalview::reporter::HtmlReporter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Evalview: HTML report generator for LLM evaluation results
#[derive(Parser, Debug)]
#[command(name = "evalview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Evaluation result JSON file
    results: PathBuf,

    /// Question-case map JSON file (default: question_case_map.json next to
    /// the results file, if present)
    #[arg(long, short)]
    map: Option<PathBuf>,

    /// Output HTML file
    #[arg(long, short, default_value = "report.html")]
    output: PathBuf,

    /// Quiet mode (minimal output)
    #[arg(long, short)]
    quiet: bool,

    /// Print per-case mapping diagnostics to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.results)
        .with_context(|| format!("Failed to read {}", args.results.display()))?;
    let doc = EvalDocument::parse(&raw)
        .with_context(|| format!("Rejected {}", args.results.display()))?;

    let map = load_map(&args);
    if map.is_empty() && !args.quiet {
        eprintln!(
            "{}: no question-case map loaded; all cases use fallback identifiers",
            "Warning".yellow().bold()
        );
    }

    let (resolved, stats) = matcher::resolve_cases(&doc, &map);
    if args.verbose {
        for case in &resolved {
            let question = doc.results.results[case.index].question_text(case.index);
            eprintln!(
                "{} {} -> {} ({}%, {})",
                "map".blue().bold(),
                truncate(&question, 60),
                case.id,
                case.match_result.confidence,
                case.match_result.match_type,
            );
        }
    }

    let map_report = map.validate();
    if args.verbose && !map_report.duplicate_questions.is_empty() {
        eprintln!(
            "{}: {} duplicate canonical question(s) in the mapping table",
            "Warning".yellow().bold(),
            map_report.duplicate_questions.len()
        );
    }

    let html = HtmlReporter::new().report(&doc, &resolved, &stats, &map_report);
    std::fs::write(&args.output, html)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if !args.quiet {
        let total = doc.results.results.len();
        let passed = doc.results.results.iter().filter(|r| r.success).count();
        println!(
            "{} {} · {} cases, {} passed, {} failed, {} mapped via table",
            "Wrote".green().bold(),
            args.output.display(),
            total,
            passed,
            total - passed,
            stats.mapped(),
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Load the mapping table: explicit --map path, else question_case_map.json
/// next to the results file, else empty.
fn load_map(args: &Args) -> QuestionCaseMap {
    if let Some(path) = &args.map {
        return QuestionCaseMap::load(path);
    }
    let sibling = args
        .results
        .parent()
        .map(|dir| dir.join("question_case_map.json"))
        .filter(|p| p.exists());
    match sibling {
        Some(path) => QuestionCaseMap::load(&path),
        None => QuestionCaseMap::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}
