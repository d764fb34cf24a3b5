//! Netlist line tokenizer.
//!
//! SPICE netlists are free-form ASCII: `*` opens a whole-line comment, `;`
//! a trailing comment, and a leading `+` continues the previous line.
//! Tokens are separated by runs of whitespace.

use std::fs;
use std::io;
use std::path::Path;

/// Split one netlist line into tokens.
///
/// A trailing `;` comment is stripped; lines whose first non-whitespace
/// character is `*` are comments and yield no tokens. Empty input yields
/// an empty vector.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let line = line.split(';').next().unwrap_or("");
    let trimmed = line.trim();

    if trimmed.starts_with('*') {
        return Vec::new();
    }

    trimmed.split_whitespace().map(str::to_string).collect()
}

/// Fold `+` continuation lines into their predecessor.
///
/// A line whose first character is `+` is appended (with a space, `+`
/// removed) to the previous retained line. A leading continuation with no
/// predecessor is kept as-is.
pub fn fold_continuations<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut folded: Vec<String> = Vec::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix('+') {
            if let Some(prev) = folded.last_mut() {
                prev.push(' ');
                prev.push_str(rest);
                continue;
            }
        }
        folded.push(line);
    }

    folded
}

/// Read a netlist file into continuation-folded lines.
pub fn load_lines(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(fold_continuations(text.lines().map(str::to_string)))
}
