mod compare;
mod config;
mod error;
mod eval;
mod primitives;
mod reader;
mod scope;
mod streams;
mod symbols;
mod value;
mod writer;

use clap::Parser;
use error::ERR_UNEXPECTED_EOF;
use reader::ReadOutcome;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use scope::Scope;
use std::path::PathBuf;
use std::rc::Rc;
use symbols::intern_str;
use value::Value;

/// veclisp -- a small lisp of integers, symbols, pairs, and vectors
#[derive(Parser, Debug)]
#[command(name = "veclisp")]
#[command(version = config::VERSION)]
#[command(about = "A small lisp of integers, interned symbols, pairs, and vectors")]
struct CliArgs {
    /// Script file to execute (optional; starts an interactive REPL if absent)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Suppress the startup banner
    #[arg(long = "no-banner")]
    no_banner: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let root = Scope::root();
    primitives::register_all(&root);

    if let Some(script_path) = args.script {
        return run_script(&script_path, &root);
    }

    run_repl(&root, args.no_banner)
}

/// Runs `path` to completion via the same read/eval loop `load` uses,
/// exiting with a nonzero code if any form fails to evaluate.
fn run_script(path: &PathBuf, root: &Rc<Scope>) -> Result<(), Box<dyn std::error::Error>> {
    let path_str = path.to_string_lossy().into_owned();
    let handle = streams::open_read(&path_str)
        .map_err(|e| format!("cannot open {}: {e}", path.display()))?;

    loop {
        match reader::read(handle) {
            Ok(ReadOutcome::End) => break,
            Ok(ReadOutcome::Value(form)) => {
                if let Err(e) = eval::eval(root, &form) {
                    streams::close(handle);
                    return Err(format!("evaluation error: {}", e).into());
                }
            }
            Err(e) => {
                streams::close(handle);
                return Err(format!("read error: {}", e).into());
            }
        }
    }
    streams::close(handle);
    Ok(())
}

fn out_handle(scope: &Rc<Scope>) -> i64 {
    match scope.lookup(&intern_str("*Out")) {
        Value::Stream(h) => h,
        _ => streams::STDOUT,
    }
}

fn err_handle(scope: &Rc<Scope>) -> i64 {
    match scope.lookup(&intern_str("*Err")) {
        Value::Stream(h) => h,
        _ => streams::STDERR,
    }
}

/// Reads `*Prompt`/`*Response` from the scope, falling back to the
/// configured defaults if the binding is absent or not a symbol (the
/// reference implementation's "trust the binding only if it's the right
/// kind" rule, SPEC_FULL.md §F).
fn prompt_text(scope: &Rc<Scope>) -> String {
    match scope.lookup(&intern_str("*Prompt")) {
        Value::Symbol(s) => String::from_utf8_lossy(&s).into_owned(),
        _ => config::DEFAULT_PROMPT.to_string(),
    }
}

fn response_text(scope: &Rc<Scope>) -> String {
    match scope.lookup(&intern_str("*Response")) {
        Value::Symbol(s) => String::from_utf8_lossy(&s).into_owned(),
        _ => config::DEFAULT_RESPONSE.to_string(),
    }
}

/// Interactive protocol per spec.md §6: emit `*Prompt`; read one value;
/// evaluate; on success emit `*Response` then the written value and a
/// newline; on failure emit `"! "` then the written error and a newline (to
/// `*Err`). End-of-stream terminates the loop with success.
///
/// A single form may span several physical lines, so each turn keeps
/// calling `rl.readline` and re-attempting a read against the accumulated
/// buffer until either a complete form parses or a non-EOF read error
/// surfaces.
fn run_repl(root: &Rc<Scope>, no_banner: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), rustyline::history::DefaultHistory> =
        Editor::with_config(rl_config).map_err(|e| format!("failed to initialize REPL: {e}"))?;
    let _ = rl.load_history(config::HISTORY_FILE_NAME);

    if !no_banner {
        println!("{}", config::WELCOME_MESSAGE);
        println!("veclisp {}", config::VERSION);
    }

    'turn: loop {
        let mut buffer = String::new();
        let form = loop {
            let prompt = prompt_text(root);
            match rl.readline(&prompt) {
                Ok(line) => {
                    buffer.push_str(&line);
                    buffer.push('\n');
                    let handle = streams::open_in_memory_input(buffer.clone().into_bytes());
                    let outcome = reader::read(handle);
                    streams::close(handle);
                    match outcome {
                        Ok(ReadOutcome::Value(v)) => break Some(v),
                        Ok(ReadOutcome::End) => continue 'turn,
                        Err(e) if e.as_symbol().map(|s| s.as_ref() == ERR_UNEXPECTED_EOF.as_bytes()).unwrap_or(false) => {
                            continue;
                        }
                        Err(e) => {
                            report_error(root, &e);
                            continue 'turn;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => continue 'turn,
                Err(ReadlineError::Eof) => break None,
                Err(e) => return Err(format!("readline error: {e}").into()),
            }
        };

        let form = match form {
            Some(form) => form,
            None => break,
        };

        match eval::eval(root, &form) {
            Ok(value) => {
                let response = response_text(root);
                let handle = out_handle(root);
                let _ = streams::write_str(handle, &response);
                let _ = writer::write(handle, &value);
                let _ = streams::write_str(handle, "\n");
            }
            Err(e) => report_error(root, &e),
        }
    }

    let _ = rl.save_history(config::HISTORY_FILE_NAME);
    Ok(())
}

fn report_error(root: &Rc<Scope>, e: &Value) {
    let handle = err_handle(root);
    let _ = streams::write_str(handle, config::ERROR_PREFIX);
    let _ = writer::write(handle, e);
    let _ = streams::write_str(handle, "\n");
}
