//! lip: REPL when started without a script, batch evaluation otherwise.

use anyhow::{Context, Result};
use clap::Parser;
use lip::Evaluator;
use rustyline::error::ReadlineError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use tracing::{debug, Level};

// every lisp call nests a few native frames
const EVAL_STACK_SIZE: usize = 512 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "lip", version, about = "A small lisp")]
struct Args {
    /// Script to evaluate, starts a REPL when omitted
    script: Option<PathBuf>,

    /// Evaluate FILE instead of the bundled prelude
    #[arg(long, value_name = "FILE", conflicts_with = "no_prelude")]
    prelude: Option<PathBuf>,

    /// Start with builtins only
    #[arg(long)]
    no_prelude: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let worker = thread::Builder::new()
        .name("lip-eval".into())
        .stack_size(EVAL_STACK_SIZE)
        .spawn(move || run(args))
        .context("starting evaluator thread")?;
    worker.join().map_err(|_| anyhow::anyhow!("evaluator thread panicked"))?
}

fn run(args: Args) -> Result<ExitCode> {
    let ev = match evaluator(&args)? {
        Some(ev) => ev,
        None => return Ok(ExitCode::FAILURE),
    };
    match args.script {
        Some(ref path) => run_script(&ev, path),
        None => repl(&ev),
    }
}

// None when the prelude fails, after reporting why
fn evaluator(args: &Args) -> Result<Option<Evaluator>> {
    if args.no_prelude {
        return Ok(Some(Evaluator::bare()));
    }
    let loaded = match args.prelude {
        Some(ref path) => {
            let code = fs::read_to_string(path)
                .with_context(|| format!("reading prelude {}", path.display()))?;
            let ev = Evaluator::bare();
            ev.eval_source(&path.display().to_string(), &code).map(|_| ev)
        },
        None => Evaluator::new(),
    };
    match loaded {
        Ok(ev) => Ok(Some(ev)),
        Err(err) => {
            eprintln!("{}", err);
            Ok(None)
        }
    }
}

fn run_script(ev: &Evaluator, path: &Path) -> Result<ExitCode> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    debug!(script = %path.display(), "evaluating");
    match ev.eval_source(&path.display().to_string(), &code) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn repl(ev: &Evaluator) -> Result<ExitCode> {
    let mut rl = rustyline::DefaultEditor::new()
        .map_err(|e| anyhow::anyhow!("starting line editor: {}", e))?;
    loop {
        match rl.readline("> ") {
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(ExitCode::SUCCESS),
            Err(e) => anyhow::bail!("reading input: {}", e),
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                let forms = match ev.parse("repl", &line) {
                    Ok(forms) => forms,
                    Err(err) => {
                        println!("{}", err);
                        continue;
                    }
                };
                // a failing form does not stop the rest of the line
                for form in forms {
                    match ev.eval_top(&form) {
                        Ok(value) => println!("{}", value),
                        Err(err) => println!("{}", err),
                    }
                }
            }
        }
    }
}
