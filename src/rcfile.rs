use crate::terminal::execute_line;
use rpn::Evaluator;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load and execute the startup file if it exists
pub(crate) fn load_rpnrc(eval: &mut Evaluator, path: &Path, out: &mut impl Write) {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no startup file");
            return;
        }
    };
    tracing::debug!(path = %path.display(), "loading startup file");
    load_rc_content(eval, &content, &path.display().to_string(), out);
}

/// Run each line through the REPL command dispatch.
///
/// Only bindings survive: the stack and its undo slot are emptied afterwards.
pub(crate) fn load_rc_content(
    eval: &mut Evaluator,
    content: &str,
    source: &str,
    out: &mut impl Write,
) {
    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Err(e) = execute_line(eval, trimmed, out) {
            eprintln!("Warning: {} line {}: {}", source, line_num + 1, e);
        }
    }
    eval.reset();
}
