//! Brio CLI.
//!
//! Usage:
//!   brio <SCRIPT>             Run a script file
//!   brio -e '<SOURCE>'        Run source given on the command line
//!   brio < script.brio        Run source from stdin
//!   brio -o json <SCRIPT>     Emit a machine-readable run report

use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use brio_lang::interpreter::{StdoutSink, StringSink};
use brio_lang::runner;

mod output;
use output::{format_run_json, OutputMode};

/// Brio - a small statically-typed scripting language
#[derive(Parser, Debug)]
#[command(name = "brio")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The script file to run (stdin when omitted)
    script: Option<PathBuf>,

    /// Run source text given directly on the command line
    #[arg(short = 'e', long = "eval", conflicts_with = "script")]
    eval: Option<String>,

    /// Output mode
    #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
    output: OutputMode,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let source = match read_source(&args) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(1);
        }
    };

    match args.output {
        OutputMode::Text => {
            let mut sink = StdoutSink;
            let diagnostics = runner::run(&source, &mut sink);
            if diagnostics.had_error() {
                eprint!("{}", diagnostics.render(&source));
                return ExitCode::from(2);
            }
            ExitCode::SUCCESS
        }
        OutputMode::Json => {
            let mut sink = StringSink::default();
            let diagnostics = runner::run(&source, &mut sink);
            println!("{}", format_run_json(&diagnostics, &sink.contents));
            if diagnostics.had_error() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn read_source(args: &Args) -> Result<String, String> {
    if let Some(source) = &args.eval {
        return Ok(source.clone());
    }
    if let Some(path) = &args.script {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading file {:?}: {}", path, e));
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| format!("Error reading stdin: {}", e))?;
    Ok(source)
}
