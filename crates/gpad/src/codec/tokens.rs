//! Token splitting, quoting and escaping shared by the property codecs.
//!
//! A property value is a sequence of whitespace-separated tokens. Double
//! quotes group text (with `\n \t \r \" \\` escapes) and brackets nest, so
//! `rgb(x, y, z)` and `image="a b.png"` each stay a single token.

use std::borrow::Cow;

use crate::error::{ParseError, Result};

/// Whether `text` must be quoted to survive tokenization.
///
/// True for empty text, for text containing `,` `;` `}` whitespace, a
/// double quote, a backslash or `//`, and for text whose brackets do not
/// balance.
pub fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || text.contains("//")
        || !brackets_balance(text)
        || text
            .chars()
            .any(|c| matches!(c, ',' | ';' | '}' | '"' | '\\') || c.is_whitespace())
}

/// Bracket nesting as the sheet scanner counts it: any closer at depth 0 or
/// an opener left open breaks the value.
fn brackets_balance(text: &str) -> bool {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Wraps `text` in double quotes, escaping `\n \r \t " \\`.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quotes `text` only when [`needs_quoting`] says so.
pub fn quote_if_needed(text: &str) -> Cow<'_, str> {
    if needs_quoting(text) {
        Cow::Owned(quote(text))
    } else {
        Cow::Borrowed(text)
    }
}

/// Reads one quoted string starting at the opening quote of `text`.
///
/// Returns the unescaped content and the byte length consumed, including
/// both quotes.
pub fn read_quoted(text: &str) -> Result<(String, usize)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return Err(ParseError::new(format!("expected '\"' in {}", text))),
    }
    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, i + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            _ => out.push(c),
        }
    }
    Err(ParseError::new(format!("unterminated string: {}", text)))
}

/// Unquotes `text` if it is exactly one quoted string, otherwise returns it
/// trimmed.
pub fn scalar(text: &str) -> Result<String> {
    let text = text.trim();
    if text.starts_with('"') {
        let (content, used) = read_quoted(text)?;
        if used != text.len() {
            return Err(ParseError::new(format!(
                "unexpected text after string: {}",
                &text[used..]
            )));
        }
        Ok(content)
    } else {
        Ok(text.to_string())
    }
}

/// Splits a value into whitespace-separated tokens.
///
/// Quoted strings and bracketed groups are never split; quotes are kept in
/// the returned tokens so callers can tell quoted from bare text.
pub fn split_tokens(value: &str) -> Result<Vec<String>> {
    split_on(value, |c| c.is_whitespace())
}

/// Splits `value` on `sep` at bracket depth 0 and outside quotes, trimming
/// each part.
pub fn split_top_level(value: &str, sep: char) -> Result<Vec<String>> {
    split_on(value, |c| c == sep)
}

fn split_on(value: &str, is_sep: impl Fn(char) -> bool) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in value.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            _ if depth == 0 && is_sep(c) => {
                push_part(&mut parts, &mut current);
            }
            _ => current.push(c),
        }
    }
    if in_string {
        return Err(ParseError::new(format!("unterminated string in '{}'", value)));
    }
    push_part(&mut parts, &mut current);
    Ok(parts)
}

fn push_part(parts: &mut Vec<String>, current: &mut String) {
    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    current.clear();
}

/// Splits `key=value` when `key` is a plain identifier.
pub fn key_value(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once('=')?;
    let is_ident = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && key
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    is_ident.then_some((key, value))
}

/// Splits a `~name` negation into `(false, "name")`, plain `name` into
/// `(true, "name")`.
pub fn negation(token: &str) -> (bool, &str) {
    match token.strip_prefix('~') {
        Some(rest) => (false, rest),
        None => (true, token),
    }
}

/// Whether `text` is a plain unsigned decimal number (`12`, `0.25`).
pub fn is_plain_number(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let int = parts.next().unwrap_or_default();
    let frac = parts.next();
    !int.is_empty()
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.map_or(true, |f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()))
}

/// Parses a number, naming `what` in the error.
pub fn number(text: &str, what: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::new(format!("invalid number for {}: '{}'", what, text)))
}

/// Parses a number and truncates it toward zero.
pub fn truncated(text: &str, what: &str) -> Result<i64> {
    Ok(number(text, what)?.trunc() as i64)
}

/// Truncates a numeric string for display, keeping non-numbers as they are.
pub fn truncate_text(text: &str) -> String {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{}", v.trunc() as i64),
        _ => text.to_string(),
    }
}

/// Numeric-aware equality: `"5"` equals `"5.0"`, `"NaN"` equals `"NaN"`.
pub fn same_value(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => false,
    }
}
