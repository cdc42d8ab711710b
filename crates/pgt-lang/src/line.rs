use std::fmt;

use crate::tree::Scope;

// ── Line ──────────────────────────────────────────────────────────────────

/// One source line, classified by its prefix.
///
/// Borrowed slices point into the left-trimmed line; nothing is validated
/// beyond what is needed to split the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'s> {
    /// `%=name`
    Encoding(&'s str),
    /// `:: anything`
    Comment,
    /// `$$!` closes every set at `depth` and above.
    CloseSet { depth: usize },
    /// `$$name` opens a set at `depth`.
    OpenSet { depth: usize, name: &'s str },
    /// `@name`, waiting for continuation lines.
    Attribute { name: &'s str },
    /// `@name:value`
    InlineAttribute { name: &'s str, value: &'s str },
    /// `~@name:a.b` or `.~@name:a.b`
    Reference { name: &'s str, path: &'s str, scope: Scope },
    /// Continuation text for the pending attribute.
    Text { text: &'s str, newline: bool },
}

/// A reference line that cannot be split into `name:path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    MissingColon,
    ExtraColon,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::MissingColon => f.write_str("expected ':'"),
            LineError::ExtraColon => f.write_str("invalid syntax"),
        }
    }
}

// ── Classification ────────────────────────────────────────────────────────

/// Classify a left-trimmed, non-empty line.
pub fn classify(line: &str) -> Result<Line<'_>, LineError> {
    if let Some(name) = line.strip_prefix("%=") {
        return Ok(Line::Encoding(name.trim_end()));
    }
    if line.starts_with("::") {
        return Ok(Line::Comment);
    }
    if line.starts_with('$') {
        let rest = line.trim_start_matches('$');
        let depth = line.len() - rest.len();
        return Ok(if rest == "!" {
            Line::CloseSet { depth }
        } else {
            Line::OpenSet { depth, name: rest }
        });
    }
    if let Some(rest) = line.strip_prefix('@') {
        return Ok(match rest.split_once(':') {
            Some((name, value)) => Line::InlineAttribute { name, value },
            None => Line::Attribute { name: rest },
        });
    }
    if let Some(rest) = line.strip_prefix("~@") {
        return reference(rest, Scope::Absolute);
    }
    if let Some(rest) = line.strip_prefix(".~@") {
        return reference(rest, Scope::Relative);
    }

    Ok(if let Some(text) = line.strip_prefix('&') {
        Line::Text { text, newline: false }
    } else if let Some(text) = line.strip_prefix('\\') {
        Line::Text { text, newline: true }
    } else {
        Line::Text { text: line, newline: true }
    })
}

fn reference(rest: &str, scope: Scope) -> Result<Line<'_>, LineError> {
    let (name, path) = rest.split_once(':').ok_or(LineError::MissingColon)?;
    if path.contains(':') {
        return Err(LineError::ExtraColon);
    }
    Ok(Line::Reference { name, path, scope })
}

/// Whether `s` is a valid set, attribute or reference name.
///
/// Names are ASCII identifiers: a letter or `_`, then letters, digits or `_`.
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Yield `(line_number, trimmed_line)` for every line that is not blank.
///
/// Line numbers are 1-based and count blank lines too.
pub fn source_lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_start()))
        .filter(|(_, l)| !l.is_empty())
}
