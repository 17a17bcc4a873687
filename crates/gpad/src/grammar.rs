//! Gpad grammar: source text → syntax items.
//!
//! ```text
//! document   := item*
//! item       := sheet-def | macro | statement
//! sheet-def  := '@' name '=' '{' body '}'
//! macro      := '@@macro' Name '(' labels? ')' '{' item* '@@return' labels '}'
//! statement  := target (',' target)* '=' rhs
//! target     := label flags? style-ref*
//! flags      := ('*' | '~')+
//! style-ref  := '@' name | '{' body '}'
//! body       := entry ((';' | newline) entry)*
//! entry      := name ':' value | name | '~' name
//! ```
//!
//! Items are separated by newlines or `;`. Property values and right-hand
//! sides are kept as raw text; the codecs and the host interpret them.

use crate::error::{ParseError, Position, Result};
use crate::host::{LabelSpec, Visibility};
use crate::lexer::Scanner;

/// One sheet body entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// `name: value`, or a bare `name` with an empty value.
    Set(String),
    /// `~name`.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StyleRef {
    Named { name: String, position: Position },
    Inline(Vec<Entry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub labels: Vec<LabelSpec>,
    pub styles: Vec<StyleRef>,
    pub rhs: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetDef {
    pub name: String,
    pub entries: Vec<Entry>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MacroBlock {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub body: Vec<Item>,
    /// Body text between the braces, trimmed.
    pub source: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    Sheet(SheetDef),
    Statement(Statement),
    Macro(MacroBlock),
}

/// Parses a whole document.
pub(crate) fn parse_document(text: &str) -> Result<Vec<Item>> {
    let mut scanner = Scanner::new(text);
    let mut items = Vec::new();
    loop {
        scanner.skip_separators();
        if scanner.is_eof() {
            return Ok(items);
        }
        if scanner.peek() == Some('}') {
            return Err(scanner.error("unexpected '}'"));
        }
        items.push(item(&mut scanner, None)?);
    }
}

/// Parses one item. `in_macro` names the enclosing macro, if any.
fn item(s: &mut Scanner<'_>, in_macro: Option<&str>) -> Result<Item> {
    let position = s.position();
    if s.starts_with("@@") {
        s.bump();
        s.bump();
        if s.eat_keyword("macro") {
            if let Some(outer) = in_macro {
                return Err(ParseError::at(
                    format!("nested @@macro inside macro '{}'", outer),
                    position,
                ));
            }
            return macro_block(s, position).map(Item::Macro);
        }
        if s.eat_keyword("return") {
            return Err(ParseError::at(
                "@@return outside of a macro",
                position,
            ));
        }
        return Err(s.error("expected 'macro' after '@@'"));
    }
    if s.eat('@') {
        return sheet_def(s, position).map(Item::Sheet);
    }
    statement(s, position).map(Item::Statement)
}

fn sheet_def(s: &mut Scanner<'_>, position: Position) -> Result<SheetDef> {
    let name = s
        .identifier()
        .ok_or_else(|| s.error("expected style sheet name after '@'"))?
        .to_string();
    s.skip_inline();
    s.expect('=', &format!("after '@{}'", name))?;
    s.skip_inline();
    if s.peek() != Some('{') {
        return Err(s.error(format!(
            "expected '{{' to start style sheet '@{}', found {}",
            name,
            s.describe_next()
        )));
    }
    let entries = sheet_body(s)?;
    Ok(SheetDef {
        name,
        entries,
        position,
    })
}

/// Parses `{ entries }`, starting at the opening brace.
fn sheet_body(s: &mut Scanner<'_>) -> Result<Vec<Entry>> {
    let open = s.position();
    s.expect('{', "to start a style sheet")?;
    let mut entries = Vec::new();
    loop {
        s.skip_separators();
        if s.eat('}') {
            return Ok(entries);
        }
        if s.is_eof() {
            return Err(ParseError::at("unterminated style sheet", open));
        }
        entries.push(entry(s)?);
        s.skip_inline();
        if !(s.at_line_end() || s.peek() == Some('}')) {
            return Err(s.error(format!(
                "expected ';', newline or '}}' after property, found {}",
                s.describe_next()
            )));
        }
    }
}

fn entry(s: &mut Scanner<'_>) -> Result<Entry> {
    let position = s.position();
    if s.eat('~') {
        s.skip_inline();
        let name = property_name(s)?;
        return Ok(Entry {
            name,
            kind: EntryKind::Reset,
            position,
        });
    }
    let name = property_name(s)?;
    s.skip_inline();
    let value = if s.eat(':') {
        s.skip_inline();
        s.raw_until(|c| c == '}')?.to_string()
    } else {
        String::new()
    };
    Ok(Entry {
        name,
        kind: EntryKind::Set(value),
        position,
    })
}

/// Property names are identifiers, plus the `@screen` pseudo-property.
fn property_name(s: &mut Scanner<'_>) -> Result<String> {
    if s.eat('@') {
        return match s.identifier() {
            Some(name) => Ok(format!("@{}", name)),
            None => Err(s.error("expected property name after '@'")),
        };
    }
    s.identifier()
        .map(str::to_string)
        .ok_or_else(|| s.error(format!("expected property name, found {}", s.describe_next())))
}

fn statement(s: &mut Scanner<'_>, position: Position) -> Result<Statement> {
    let mut labels = Vec::new();
    let mut styles = Vec::new();
    loop {
        let name = s
            .label()?
            .ok_or_else(|| s.error(format!("expected a label, found {}", s.describe_next())))?
            .to_string();
        s.skip_inline();
        labels.push(LabelSpec::new(name, flags(s)));
        s.skip_inline();
        loop {
            match s.peek() {
                Some('@') => {
                    let at = s.position();
                    s.bump();
                    let name = s
                        .identifier()
                        .ok_or_else(|| s.error("expected style sheet name after '@'"))?;
                    styles.push(StyleRef::Named {
                        name: name.to_string(),
                        position: at,
                    });
                }
                Some('{') => styles.push(StyleRef::Inline(sheet_body(s)?)),
                _ => break,
            }
            s.skip_inline();
        }
        if !s.eat(',') {
            break;
        }
        s.skip_inline();
    }
    s.expect('=', "after labels")?;
    s.skip_inline();
    let rhs_at = s.position();
    let rhs = s.raw_until(|_| false)?;
    if rhs.is_empty() {
        return Err(ParseError::at(
            "missing right-hand side after '='",
            rhs_at,
        ));
    }
    Ok(Statement {
        labels,
        styles,
        rhs: rhs.to_string(),
        position,
    })
}

fn flags(s: &mut Scanner<'_>) -> Visibility {
    let mut visibility = Visibility::default();
    loop {
        match s.peek() {
            Some('*') => visibility.object = false,
            Some('~') => visibility.label = false,
            _ => return visibility,
        }
        s.bump();
        s.skip_inline();
    }
}

fn macro_block(s: &mut Scanner<'_>, position: Position) -> Result<MacroBlock> {
    s.skip_inline();
    let name = s
        .identifier()
        .ok_or_else(|| s.error("expected macro name after '@@macro'"))?
        .to_string();
    s.skip_inline();
    s.expect('(', &format!("after macro name '{}'", name))?;
    let inputs = label_list(s, |c| c == ')')?;
    s.expect(')', "to close the macro parameters")?;
    s.skip_blank();
    s.expect('{', &format!("to open macro '{}'", name))?;
    let body_start = s.offset();

    let mut body = Vec::new();
    loop {
        s.skip_separators();
        if s.is_eof() || s.peek() == Some('}') {
            return Err(s.error(format!("missing @@return in macro '{}'", name)));
        }
        if s.starts_with("@@") {
            let checkpoint = s.position();
            s.bump();
            s.bump();
            if s.eat_keyword("return") {
                break;
            }
            if s.eat_keyword("macro") {
                return Err(ParseError::at(
                    format!("nested @@macro inside macro '{}'", name),
                    checkpoint,
                ));
            }
            return Err(s.error("expected 'return' after '@@'"));
        }
        body.push(item(s, Some(&name))?);
    }

    s.skip_inline();
    let outputs = label_list(s, |c| c == '}')?;
    if outputs.is_empty() {
        return Err(s.error(format!("@@return in macro '{}' names no outputs", name)));
    }
    let body_end = s.offset();
    s.skip_separators();
    if s.peek() != Some('}') {
        return Err(s.error(format!(
            "expected '}}' after @@return in macro '{}', found {}",
            name,
            s.describe_next()
        )));
    }
    let source = s.slice(body_start, body_end).trim().to_string();
    s.bump();
    Ok(MacroBlock {
        name,
        inputs,
        outputs,
        body,
        source,
        position,
    })
}

/// Comma-separated labels, ending before a line end or `close`.
fn label_list(s: &mut Scanner<'_>, close: impl Fn(char) -> bool) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    s.skip_inline();
    if s.at_line_end() || s.peek().is_some_and(&close) {
        return Ok(labels);
    }
    loop {
        let label = s
            .label()?
            .ok_or_else(|| s.error(format!("expected a label, found {}", s.describe_next())))?;
        labels.push(label.to_string());
        s.skip_inline();
        if !s.eat(',') {
            return Ok(labels);
        }
        s.skip_inline();
    }
}
