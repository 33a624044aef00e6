//! Relative-reference translation of formula text.
//!
//! Shared formulas are stored once, on the top-left cell of their range. Every
//! other cell of the group gets the master's text with its relative references
//! moved by the cell's offset from the master, the same way a copy-paste would.

use crate::utils::{column_to_letter, letter_to_column, MAX_COLUMN, MAX_ROW};

const REF_ERROR: &str = "#REF!";

/// Move every relative reference in `formula` by `rows` and `columns`.
///
/// `$`-anchored parts stay put. A reference pushed off the grid becomes `#REF!`.
/// String literals, quoted sheet names, structured references, function names and
/// defined names are copied unchanged.
pub fn translate_formula(formula: &str, rows: i64, columns: i64) -> String {
    if rows == 0 && columns == 0 {
        return formula.to_string();
    }

    let mut out = String::with_capacity(formula.len() + 8);
    let mut rest = formula;
    while let Some(c) = rest.chars().next() {
        let consumed = match c {
            '"' | '\'' => {
                let end = quoted_len(rest, c);
                out.push_str(&rest[..end]);
                end
            }
            '[' => {
                let end = bracketed_len(rest);
                out.push_str(&rest[..end]);
                end
            }
            c if is_token_char(c) => translate_token(rest, rows, columns, &mut out),
            c => {
                out.push(c);
                c.len_utf8()
            }
        };
        rest = &rest[consumed..];
    }
    out
}

/// Translate the token at the start of `s` (plus a `:` partner for ranges) and
/// return how many bytes were consumed.
fn translate_token(s: &str, rows: i64, columns: i64, out: &mut String) -> usize {
    let end = token_len(s);
    let token = &s[..end];
    let after = &s[end..];
    if is_qualifier(after) {
        out.push_str(token);
        return end;
    }
    let Some(first) = RefPart::parse(token) else {
        out.push_str(token);
        return end;
    };

    if let Some(partner) = after.strip_prefix(':') {
        let partner_end = token_len(partner);
        let second = RefPart::parse(&partner[..partner_end])
            .filter(|second| second.same_kind(&first) && !is_qualifier(&partner[partner_end..]));
        if let Some(second) = second {
            match (first.shift(rows, columns), second.shift(rows, columns)) {
                (Some(a), Some(b)) => {
                    a.write(out);
                    out.push(':');
                    b.write(out);
                }
                _ => out.push_str(REF_ERROR),
            }
            return end + 1 + partner_end;
        }
    }

    match first {
        RefPart::Cell { .. } => match first.shift(rows, columns) {
            Some(moved) => moved.write(out),
            None => out.push_str(REF_ERROR),
        },
        // A lone column or row part is a name or a number literal.
        RefPart::Column(_) | RefPart::Row(_) => out.push_str(token),
    }
    end
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '\\') || (!c.is_ascii() && c.is_alphabetic())
}

/// Tokens followed by these are function names, sheet names or table names.
fn is_qualifier(after: &str) -> bool {
    after.starts_with(['(', '!', '['])
}

fn token_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !is_token_char(*c))
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Length of a `"..."` or `'...'` run, doubled quotes included.
fn quoted_len(s: &str, quote: char) -> usize {
    let mut chars = s.char_indices().skip(1).peekable();
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            match chars.peek() {
                Some((_, next)) if *next == quote => {
                    chars.next();
                }
                _ => return idx + c.len_utf8(),
            }
        }
    }
    s.len()
}

fn bracketed_len(s: &str) -> usize {
    let mut depth = 0usize;
    for (idx, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return idx + 1;
                }
            }
            _ => {}
        }
    }
    s.len()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Axis {
    index: u32,
    absolute: bool,
}

impl Axis {
    fn shift(self, delta: i64, max: u32) -> Option<Axis> {
        if self.absolute {
            return Some(self);
        }
        let index = i64::from(self.index) + delta;
        u32::try_from(index)
            .ok()
            .filter(|index| (1..=max).contains(index))
            .map(|index| Axis { index, absolute: false })
    }
}

/// A1-style reference part: a cell, a whole column or a whole row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RefPart {
    Cell { column: Axis, row: Axis },
    Column(Axis),
    Row(Axis),
}

impl RefPart {
    fn parse(token: &str) -> Option<RefPart> {
        let (column, rest) = split_column(token);
        let (row, rest) = split_row(rest);
        if !rest.is_empty() {
            return None;
        }
        match (column, row) {
            (Some(column), Some(row)) => Some(RefPart::Cell { column, row }),
            (Some(column), None) => Some(RefPart::Column(column)),
            (None, Some(row)) => Some(RefPart::Row(row)),
            (None, None) => None,
        }
    }

    fn same_kind(&self, other: &RefPart) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn shift(self, rows: i64, columns: i64) -> Option<RefPart> {
        Some(match self {
            RefPart::Cell { column, row } => RefPart::Cell {
                column: column.shift(columns, MAX_COLUMN)?,
                row: row.shift(rows, MAX_ROW)?,
            },
            RefPart::Column(column) => RefPart::Column(column.shift(columns, MAX_COLUMN)?),
            RefPart::Row(row) => RefPart::Row(row.shift(rows, MAX_ROW)?),
        })
    }

    fn write(self, out: &mut String) {
        let push_column = |axis: Axis, out: &mut String| {
            if axis.absolute {
                out.push('$');
            }
            out.push_str(&column_to_letter(axis.index));
        };
        let push_row = |axis: Axis, out: &mut String| {
            if axis.absolute {
                out.push('$');
            }
            let mut buf = itoa::Buffer::new();
            out.push_str(buf.format(axis.index));
        };
        match self {
            RefPart::Cell { column, row } => {
                push_column(column, out);
                push_row(row, out);
            }
            RefPart::Column(column) => push_column(column, out),
            RefPart::Row(row) => push_row(row, out),
        }
    }
}

fn split_anchor(s: &str) -> (bool, &str) {
    match s.strip_prefix('$') {
        Some(body) => (true, body),
        None => (false, s),
    }
}

fn split_column(s: &str) -> (Option<Axis>, &str) {
    let (absolute, body) = split_anchor(s);
    let len = body.bytes().take_while(u8::is_ascii_alphabetic).count();
    if len == 0 || len > 3 {
        return (None, s);
    }
    match letter_to_column(&body[..len]) {
        Ok(index) => (Some(Axis { index, absolute }), &body[len..]),
        Err(_) => (None, s),
    }
}

fn split_row(s: &str) -> (Option<Axis>, &str) {
    let (absolute, body) = split_anchor(s);
    let len = body.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return (None, s);
    }
    match body[..len].parse::<u32>() {
        Ok(index) if (1..=MAX_ROW).contains(&index) => (Some(Axis { index, absolute }), &body[len..]),
        _ => (None, s),
    }
}
