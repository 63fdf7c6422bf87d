//! Language modes for indentation
//!
//! A [`Mode`] is the language-specific indentation policy consumed by the
//! re-indentation engine. It tokenizes lines into opaque [`LineState`]s,
//! computes the expected indent of the line following a given line, and
//! applies corrective outdenting (closing braces and the like).

use super::session::Session;
use crate::error::{Error, Result};
use log::trace;
use regex::Regex;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Line State
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque lexical state at the start of a line.
///
/// Produced by [`Mode::next_state`] from the lines above and consumed only by
/// the mode that produced it. The engine passes it around without looking
/// inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineState(u16);

impl LineState {
    /// The state of the first line of every buffer.
    pub const START: LineState = LineState(0);

    /// Wrap a mode-defined raw state value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// The mode-defined raw value.
    pub const fn raw(self) -> u16 {
        self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode Capability
// ─────────────────────────────────────────────────────────────────────────────

/// Language-specific indentation policy.
pub trait Mode {
    /// Short identifier of the mode (e.g. `c_cpp`).
    fn name(&self) -> &str;

    /// Lexical state at the start of the line following `line`, given the
    /// state at the start of `line`.
    fn next_state(&self, state: LineState, line: &str) -> LineState;

    /// Expected leading whitespace of the line after `prior_line`.
    ///
    /// `prior_state` is the state at the start of `prior_line`.
    fn next_line_indent(&self, prior_state: LineState, prior_line: &str, tab: &str)
        -> Result<String>;

    /// Apply a dedent correction to `row`, mutating the session in place
    /// when the mode's rules call for it.
    fn apply_outdent(&self, state: LineState, session: &mut dyn Session, row: usize)
        -> Result<()>;
}

/// Leading whitespace of a line.
pub fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

// ─────────────────────────────────────────────────────────────────────────────
// C-Style Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Outside of any multi-line construct.
const STATE_CODE: LineState = LineState::START;
/// Inside a `/* ... */` comment that continues onto the next line.
const STATE_BLOCK_COMMENT: LineState = LineState::new(1);
/// Inside a block comment whose `/*` opened its line; continuation lines
/// carry one extra alignment column.
const STATE_ALIGNED_COMMENT: LineState = LineState::new(2);

fn is_block_comment(state: LineState) -> bool {
    state == STATE_BLOCK_COMMENT || state == STATE_ALIGNED_COMMENT
}

/// How far back (in rows) the matching-brace search looks before giving up.
const MAX_BRACE_SCAN_ROWS: usize = 2000;

const OPENER_PATTERN: &str = r"[\{\(\[]\s*$";
const CLOSER_PATTERN: &str = r"^(\s*)\}";

static OPENER: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static CLOSER: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn cached_regex(
    cell: &'static OnceLock<std::result::Result<Regex, regex::Error>>,
    pattern: &'static str,
    row: usize,
) -> Result<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| Error::IndentComputation {
            row,
            message: format!("invalid indentation pattern '{}': {}", pattern, e),
        })
}

/// Brace-block indentation for C, C++ and similar languages.
///
/// - A line whose code ends with `{`, `(` or `[` indents the next line by one
///   tab level; other lines carry their indent forward.
/// - Inside a block comment opened at the start of a line, continuation
///   lines align one column past the `/*`; the line after the comment
///   drops that column again.
/// - A line starting with `}` takes the indent of the line holding its
///   matching `{`.
///
/// Comments and string literals are ignored when looking for brackets.
#[derive(Debug, Clone, Default)]
pub struct CStyleMode;

impl CStyleMode {
    /// Create the mode.
    pub fn new() -> Self {
        Self
    }

    /// Blank out comments and the contents of string/char literals.
    ///
    /// The returned characters line up one-to-one with the characters of
    /// `line`, so columns found in the result are columns in the line.
    fn scan_line(state: LineState, line: &str) -> (Vec<char>, LineState) {
        let chars: Vec<char> = line.chars().collect();
        let mut code = Vec::with_capacity(chars.len());
        let mut in_block_comment = is_block_comment(state);
        let mut closed_comment = false;
        let mut quote: Option<char> = None;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if in_block_comment {
                if c == '*' && next == Some('/') {
                    in_block_comment = false;
                    closed_comment = true;
                    code.extend([' ', ' ']);
                    i += 2;
                } else {
                    code.push(' ');
                    i += 1;
                }
                continue;
            }

            if let Some(q) = quote {
                if c == '\\' {
                    code.push(' ');
                    if next.is_some() {
                        code.push(' ');
                    }
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                    code.push(c);
                } else {
                    code.push(' ');
                }
                i += 1;
                continue;
            }

            match (c, next) {
                ('/', Some('/')) => {
                    code.resize(chars.len(), ' ');
                    break;
                }
                ('/', Some('*')) => {
                    in_block_comment = true;
                    code.extend([' ', ' ']);
                    i += 2;
                    continue;
                }
                ('"', _) | ('\'', _) => {
                    quote = Some(c);
                    code.push(c);
                }
                _ => code.push(c),
            }
            i += 1;
        }

        // String literals never continue onto the next line.
        let opened_line = !is_block_comment(state) && line.trim_start().starts_with("/*");
        let end_state = if !in_block_comment {
            STATE_CODE
        } else if !closed_comment && (state == STATE_ALIGNED_COMMENT || opened_line) {
            STATE_ALIGNED_COMMENT
        } else {
            STATE_BLOCK_COMMENT
        };
        (code, end_state)
    }

    /// Find the row holding the `{` that matches a `}` at `(row, column)`.
    fn find_opening_brace(session: &dyn Session, row: usize, column: usize) -> Result<Option<usize>> {
        let mut depth = 0usize;
        let first_row = row.saturating_sub(MAX_BRACE_SCAN_ROWS);

        for scan_row in (first_row..=row).rev() {
            let state = session.lexical_state(scan_row)?;
            let (code, _) = Self::scan_line(state, session.line(scan_row)?);
            let end = if scan_row == row {
                column.min(code.len())
            } else {
                code.len()
            };

            for &c in code[..end].iter().rev() {
                match c {
                    '}' => depth += 1,
                    '{' if depth == 0 => return Ok(Some(scan_row)),
                    '{' => depth -= 1,
                    _ => {}
                }
            }
        }

        Ok(None)
    }
}

impl Mode for CStyleMode {
    fn name(&self) -> &str {
        "c_cpp"
    }

    fn next_state(&self, state: LineState, line: &str) -> LineState {
        Self::scan_line(state, line).1
    }

    fn next_line_indent(
        &self,
        prior_state: LineState,
        prior_line: &str,
        tab: &str,
    ) -> Result<String> {
        let mut indent = leading_whitespace(prior_line);
        let (code, end_state) = Self::scan_line(prior_state, prior_line);

        if is_block_comment(end_state) {
            // Align continuation lines with the `*` of an opening `/*`.
            if end_state == STATE_ALIGNED_COMMENT && !is_block_comment(prior_state) {
                return Ok(format!("{} ", indent));
            }
            return Ok(indent.to_string());
        }

        // The aligned comment closed on the prior line: back to the opener's indent.
        if prior_state == STATE_ALIGNED_COMMENT {
            indent = indent.strip_suffix(' ').unwrap_or(indent);
        }

        let code: String = code.into_iter().collect();
        if cached_regex(&OPENER, OPENER_PATTERN, 0)?.is_match(&code) {
            Ok(format!("{}{}", indent, tab))
        } else {
            Ok(indent.to_string())
        }
    }

    fn apply_outdent(&self, state: LineState, session: &mut dyn Session, row: usize) -> Result<()> {
        let line = session.line(row)?.to_string();
        let (code, _) = Self::scan_line(state, &line);
        let code: String = code.into_iter().collect();

        let closer = cached_regex(&CLOSER, CLOSER_PATTERN, row)?;
        let Some(captures) = closer.captures(&code) else {
            return Ok(());
        };

        // Blanked comment text also looks like whitespace; only real
        // indentation may be replaced.
        let current_indent = leading_whitespace(&line);
        let brace_column = captures[1].chars().count();
        if brace_column != current_indent.chars().count() {
            return Ok(());
        }

        let Some(open_row) = Self::find_opening_brace(session, row, brace_column)? else {
            trace!("No opening brace for row {}, leaving indent as is", row);
            return Ok(());
        };

        let target_indent = leading_whitespace(session.line(open_row)?).to_string();
        if target_indent == current_indent {
            return Ok(());
        }

        let rest = &line[current_indent.len()..];
        session.replace_line(row, format!("{}{}", target_indent, rest))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
