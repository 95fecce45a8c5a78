use rpn::Evaluator;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper, Result as RlResult};
use std::io::{self, BufRead, IsTerminal, Write};

use crate::config::Config;
use crate::rcfile::load_rpnrc;
use crate::terminal::run_line;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">>> ";

// ============================================
// Line editor helper: name completion
// ============================================

struct RpnHelper {
    /// Names known to the evaluator, refreshed before each prompt
    names: Vec<String>,
}

impl Helper for RpnHelper {}

impl Completer for RpnHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Find the word being completed
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &line[start..pos];

        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }

        let pairs: Vec<Pair> = self
            .names
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();

        Ok((start, pairs))
    }
}

impl Hinter for RpnHelper {
    type Hint = String;
}

impl Highlighter for RpnHelper {}

impl Validator for RpnHelper {}

// ============================================
// REPL main loop
// ============================================

/// Set up the evaluator from the config and run until end of input
pub(crate) fn run(config: &Config) -> RlResult<()> {
    let mut eval = Evaluator::new();
    eval.set_trace_mode(config.trace);

    let mut stdout = io::stdout();
    if let Some(path) = &config.rc_path {
        load_rpnrc(&mut eval, path, &mut stdout);
    }

    if io::stdin().is_terminal() {
        run_interactive(&mut eval, config)
    } else {
        run_piped(&mut eval, io::stdin().lock(), &mut stdout)?;
        Ok(())
    }
}

/// Read lines from a non-terminal source until EOF, without a prompt
pub(crate) fn run_piped(
    eval: &mut Evaluator,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    for line in input.lines() {
        run_line(eval, &line?, out)?;
        out.flush()?;
    }
    Ok(())
}

fn run_interactive(eval: &mut Evaluator, config: &Config) -> RlResult<()> {
    let mut rl: Editor<RpnHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(RpnHelper { names: Vec::new() }));

    // Try to load history
    if let Some(path) = &config.history_path {
        let _ = rl.load_history(path);
    }

    if config.banner {
        println!("RPN calculator {}", VERSION);
        println!("Try help for commands.");
        println!();
    }

    let mut stdout = io::stdout();
    loop {
        // Update names in helper for tab completion
        if let Some(helper) = rl.helper_mut() {
            helper.names = eval.known_names();
        }

        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                run_line(eval, &line, &mut stdout)?;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C abandons the pending line only
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D - exit
                println!();
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(path) = &config.history_path {
        if let Err(e) = rl.save_history(path) {
            tracing::debug!(error = %e, "could not save history");
        }
    }
    Ok(())
}
