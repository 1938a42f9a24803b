//! calcline command-line harness
//!
//! A standalone driver for the expression engine, useful for trying the
//! language out or for scripting against the same `interpret` entry point a
//! line-server embedding would call.

mod converter;
mod tracing_setup;

use std::fs;
use std::process::ExitCode;

use calcline_interp::Interpretation;
use converter::FixedRateConverter;

fn main() -> ExitCode {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let command = args[1].as_str();
    match command {
        "run" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: calcline run <file>");
                return ExitCode::FAILURE;
            };
            run_file(path)
        }
        "eval" => {
            let Some(expression) = args.get(2) else {
                eprintln!("Usage: calcline eval <expression>");
                return ExitCode::FAILURE;
            };
            run_eval(expression)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-v" => {
            println!("calcline {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => run_file(command),
    }
}

fn run_file(path: &str) -> ExitCode {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("calcline: couldn't read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    print_interpretations(&calcline_interp::interpret(&text, &FixedRateConverter))
}

fn run_eval(expression: &str) -> ExitCode {
    let annotated = format!("#| {expression}");
    print_interpretations(&calcline_interp::interpret(&annotated, &FixedRateConverter))
}

fn print_interpretations(interpretations: &[Interpretation]) -> ExitCode {
    let mut had_error = false;
    for interpretation in interpretations {
        if interpretation.diagnostics.is_empty() {
            println!("{}: {}", interpretation.line_index, interpretation.evaluation_text);
        } else {
            had_error = true;
            for diagnostic in &interpretation.diagnostics {
                println!("{}: error: {}", interpretation.line_index, diagnostic.message);
            }
        }
    }
    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_usage() {
    println!("calcline — a unit-aware, line-oriented expression calculator");
    println!();
    println!("Usage: calcline <command> [args]");
    println!();
    println!("Commands:");
    println!("  run <file>          Interpret every annotated line in a file");
    println!("  eval <expression>   Evaluate a single expression");
    println!("  help                Show this help message");
    println!("  version             Show version information");
    println!();
    println!("Examples:");
    println!("  calcline eval \"2 + 2 * 10\"");
    println!("  calcline run notes.txt");
    println!("  calcline notes.txt          (shorthand for 'run')");
}
