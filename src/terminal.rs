use rpn::{EvalError, Evaluator};
use std::io::{self, Write};
use thiserror::Error;

/// A failed input line
#[derive(Error, Debug)]
pub(crate) enum LineError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("exec: {0}")]
    Exec(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level REPL commands; anything else is an expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command<'a> {
    Help,
    Stack,
    Clear,
    Undo,
    Exec(&'a str),
    Evaluate(&'a str),
}

impl<'a> Command<'a> {
    pub(crate) fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "help" => Command::Help,
            "stack" | "debug" => Command::Stack,
            "clear" => Command::Clear,
            "undo" => Command::Undo,
            _ => match trimmed.split_once(char::is_whitespace) {
                Some(("exec", rest)) => Command::Exec(rest.trim()),
                _ if trimmed == "exec" => Command::Exec(""),
                _ => Command::Evaluate(trimmed),
            },
        }
    }
}

pub(crate) fn help_text(eval: &Evaluator, width: usize) -> String {
    format!(
        r#"RPN evaluates reverse-Polish expressions against a single stack.

COMMANDS:
    help                    Show this text
    stack, debug            Print the entire stack
    clear                   Empty the stack
    undo                    Restore the stack from before the last line
    exec NAME = WORDS       Evaluate WORDS on a scratch stack, bind NAME to the top

STACK ACTIONS:
    n collect               Pop n values and push them as one list (top first)
    dup                     Duplicate the top value
    n dups                  Pop n values and push them back in pop order

OPERATORS:
    ~ not                   Unary
    + - * / // % **         Arithmetic
    & | ^ << >>             Bitwise
    < <= == != >= >         Comparison
    in is @                 Membership, identity, matrix product

Callables pop as many values as they have required parameters; the value on
top of the stack is the first argument.

EXAMPLES:
    1 2 3                   Push 1, 2 and 3
    1 2 +                   Push 3
    1 2 3 3 collect sum print
                            Print 6

CALLABLES:
    {}

CONSTANTS:
    {}"#,
        wrap(&eval.registry().callable_names(), width.saturating_sub(4).max(20)),
        eval.registry().constant_names().join(" ")
    )
}

/// Get terminal width, defaulting to 80
pub(crate) fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Join words into lines no wider than `width`
fn wrap(words: &[&str], width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in words {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n    ")
}

/// `NAME = WORDS`
fn parse_exec(code: &str) -> Result<(&str, &str), LineError> {
    match code.split_once('=') {
        Some((name, expr)) if !name.trim().is_empty() => Ok((name.trim(), expr.trim())),
        _ => Err(LineError::Exec(format!(
            "unsupported: {:?} (use: exec NAME = WORDS)",
            code
        ))),
    }
}

/// Write buffered diagnostics, then `print` output.
///
/// Words are resolved before any runs, so resolver failures come first.
fn flush_buffers(eval: &mut Evaluator, out: &mut impl Write) -> io::Result<()> {
    for diagnostic in eval.drain_diagnostics() {
        writeln!(out, "fail: {}", diagnostic)?;
    }
    for line in eval.drain_output() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Execute a single line of input
pub(crate) fn execute_line(
    eval: &mut Evaluator,
    line: &str,
    out: &mut impl Write,
) -> Result<(), LineError> {
    let result = match Command::parse(line) {
        Command::Help => {
            writeln!(out, "{}", help_text(eval, terminal_width()))?;
            Ok(())
        }
        Command::Stack => {
            writeln!(out, "{}", eval.render_stack())?;
            Ok(())
        }
        Command::Clear => {
            eval.clear();
            Ok(())
        }
        Command::Undo => {
            eval.undo();
            Ok(())
        }
        Command::Exec(code) => parse_exec(code)
            .and_then(|(name, expr)| eval.define(name, expr).map(|_| ()).map_err(LineError::from)),
        // Empty input is OK
        Command::Evaluate("") => Ok(()),
        Command::Evaluate(expr) => eval.evaluate(expr).map_err(LineError::from),
    };
    flush_buffers(eval, out)?;
    result
}

/// Execute a line, reporting any failure as `fail: <error>`
pub(crate) fn run_line(eval: &mut Evaluator, line: &str, out: &mut impl Write) -> io::Result<()> {
    match execute_line(eval, line, out) {
        Ok(()) => Ok(()),
        Err(LineError::Io(e)) => Err(e),
        Err(e) => writeln!(out, "fail: {}", e),
    }
}
