// ABOUTME: Hand-rolled recursive-descent reader turning source bytes into heap values

use crate::error::{ErrorKind, LispError};
use crate::heap::{Heap, ObjRef};
use crate::value::Payload;

const COMMENT: u8 = b';';

/// Byte-oriented view over the input, tracking the current index so errors
/// can be reported with an offset the caller converts to a line number.
struct Cursor<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor {
            bytes: input.as_bytes(),
            index: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.index += 1;
        Some(b)
    }

    fn skip_space_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
                self.index += 1;
            }
            if self.peek() == Some(COMMENT) {
                while matches!(self.peek(), Some(b) if b != b'\n') {
                    self.index += 1;
                }
            } else {
                return;
            }
        }
    }

    fn syntax_err(&self, message: impl Into<String>) -> LispError {
        LispError::new(ErrorKind::Syntax, message).with_line(line_at(self.bytes, self.index))
    }

    fn eof_err(&self, message: impl Into<String>) -> LispError {
        LispError::new(ErrorKind::Eof, message).with_line(line_at(self.bytes, self.index))
    }
}

/// 1-based line number of the byte at `index`, counting newlines before it.
fn line_at(bytes: &[u8], index: usize) -> usize {
    1 + bytes[..index.min(bytes.len())].iter().filter(|&&b| b == b'\n').count()
}

/// The escape table from spec.md's reader grammar: `\a \b \f \n \t \v` map
/// to the usual control bytes; `\r` maps to backspace, matching a defect in
/// the reference reader that is preserved for bit-exact round-tripping.
/// Any other escaped byte is literal.
fn unescape(b: u8) -> u8 {
    match b {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => 0x08,
        b't' => b'\t',
        b'v' => 0x0b,
        other => other,
    }
}

fn is_symbol_boundary(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b')' || b == b'\'' || b == COMMENT
}

fn parse_integer(heap: &mut Heap, cur: &mut Cursor) -> Result<ObjRef, LispError> {
    let start = cur.index;
    if cur.peek() == Some(b'-') {
        cur.index += 1;
    }
    let digits_start = cur.index;
    while matches!(cur.peek(), Some(b) if b.is_ascii_digit()) {
        cur.index += 1;
    }
    if cur.index == digits_start {
        return Err(cur.syntax_err("error parsing integer"));
    }
    let text = std::str::from_utf8(&cur.bytes[start..cur.index]).expect("ascii digits are valid utf8");
    let n: i64 = text
        .parse()
        .map_err(|_| cur.syntax_err("error parsing integer"))?;
    Ok(heap.allocate(Payload::Int(n)))
}

fn parse_string(heap: &mut Heap, cur: &mut Cursor) -> Result<ObjRef, LispError> {
    cur.index += 1; // opening quote
    let mut bytes = Vec::new();
    loop {
        match cur.advance() {
            None => return Err(cur.eof_err("unexpected eof while parsing string")),
            Some(b'"') => break,
            Some(b'\\') => {
                let escaped = cur.advance().ok_or_else(|| cur.eof_err("unexpected eof while parsing string"))?;
                bytes.push(unescape(escaped));
            }
            Some(b) => bytes.push(b),
        }
    }
    Ok(heap.allocate(Payload::Str { bytes }))
}

/// Rewrites a dotted symbol `a.b.c` into nested attribute access:
/// `(getattr (getattr a (quote b)) (quote c))`, left to right.
fn split_symbol(heap: &mut Heap, text: &str) -> ObjRef {
    let mut parts = text.split('.');
    let head = parts.next().expect("split always yields at least one part");
    let mut result = heap.allocate(Payload::Symbol(head.to_string()));
    for attr in parts {
        let getattr = heap.allocate(Payload::Symbol("getattr".to_string()));
        let quote = heap.allocate(Payload::Symbol("quote".to_string()));
        let attr_sym = heap.allocate(Payload::Symbol(attr.to_string()));
        let quoted_attr = heap.cons(quote, heap.cons(attr_sym, heap.nil()));
        let args = heap.cons(result, heap.cons(quoted_attr, heap.nil()));
        result = heap.cons(getattr, args);
    }
    result
}

fn parse_symbol(heap: &mut Heap, cur: &mut Cursor) -> Result<ObjRef, LispError> {
    let start = cur.index;
    let mut dotcount = 0;
    while matches!(cur.peek(), Some(b) if !is_symbol_boundary(b)) {
        if cur.peek() == Some(b'.') {
            dotcount += 1;
        }
        cur.index += 1;
    }
    if cur.index == start {
        return Err(cur.eof_err("unexpected eof while parsing symbol"));
    }
    let text = std::str::from_utf8(&cur.bytes[start..cur.index])
        .map_err(|_| cur.syntax_err("symbol is not valid utf8"))?;

    if dotcount > 0 {
        if text.starts_with('.') || text.ends_with('.') {
            return Err(cur.syntax_err("unexpected '.' at beginning or end of symbol"));
        }
        return Ok(split_symbol(heap, text));
    }

    Ok(heap.allocate(Payload::Symbol(text.to_string())))
}

/// `'x`, `` `x ``, `,x` desugar to `(quote x)`, `(quasiquote x)`,
/// `(unquote x)` respectively.
fn parse_quote(heap: &mut Heap, cur: &mut Cursor) -> Result<ObjRef, LispError> {
    let marker = cur.advance().expect("caller already peeked a quote marker");
    let name = match marker {
        b'\'' => "quote",
        b'`' => "quasiquote",
        b',' => "unquote",
        _ => unreachable!("caller only dispatches here on a quote marker"),
    };
    let inner = parse_value_internal(heap, cur)?;
    let sym = heap.allocate(Payload::Symbol(name.to_string()));
    Ok(heap.cons(sym, heap.cons(inner, heap.nil())))
}

/// Parses a list or s-expression after the opening `(` has been consumed.
/// `.` immediately before the final element makes it a dotted tail; `)`
/// at the head of an otherwise-empty list yields nil.
fn parse_list(heap: &mut Heap, cur: &mut Cursor) -> Result<ObjRef, LispError> {
    cur.skip_space_and_comments();
    if cur.peek().is_none() {
        return Err(cur.eof_err("unexpected eof while parsing list"));
    }
    if cur.peek() == Some(b')') {
        cur.index += 1;
        return Ok(heap.nil());
    }

    let mut items = Vec::new();
    let mut tail = heap.nil();

    loop {
        let item = parse_value_internal(heap, cur)?;
        items.push(item);

        cur.skip_space_and_comments();
        match cur.peek() {
            None => return Err(cur.eof_err("unexpected eof while parsing list")),
            Some(b')') => {
                cur.index += 1;
                break;
            }
            Some(b'.') => {
                cur.index += 1;
                tail = parse_value_internal(heap, cur)?;
                cur.skip_space_and_comments();
                if cur.peek() != Some(b')') {
                    return Err(cur.syntax_err("bad s-expression form"));
                }
                cur.index += 1;
                break;
            }
            Some(_) => continue,
        }
    }

    let mut result = tail;
    for &item in items.iter().rev() {
        result = heap.cons(item, result);
    }
    Ok(result)
}

/// Returns `Ok(None)` at end of input, matching `parse_value_internal`'s
/// original C counterpart where a NUL byte yields a null result rather
/// than an error — callers use this to detect "no more top-level forms".
fn parse_value_internal(heap: &mut Heap, cur: &mut Cursor) -> Result<ObjRef, LispError> {
    cur.skip_space_and_comments();
    match cur.peek() {
        Some(b'"') => parse_string(heap, cur),
        Some(b'(') => {
            cur.index += 1;
            parse_list(heap, cur)
        }
        Some(b')') => {
            cur.index += 1;
            Ok(heap.nil())
        }
        Some(b'\'') | Some(b'`') | Some(b',') => parse_quote(heap, cur),
        Some(b) if b.is_ascii_digit() => parse_integer(heap, cur),
        Some(b'-') if matches!(cur.bytes.get(cur.index + 1), Some(b) if b.is_ascii_digit()) => {
            parse_integer(heap, cur)
        }
        Some(_) => parse_symbol(heap, cur),
        None => unreachable!("callers check for end of input before calling"),
    }
}

fn at_end(cur: &mut Cursor) -> bool {
    cur.skip_space_and_comments();
    cur.peek().is_none()
}

/// Parses a single expression starting at `offset` bytes into `input`.
/// Returns the value and the number of bytes consumed from `offset`.
pub fn parse_value(heap: &mut Heap, input: &str, offset: usize) -> Result<(ObjRef, usize), LispError> {
    let mut cur = Cursor {
        bytes: input.as_bytes(),
        index: offset,
    };
    let value = parse_value_internal(heap, &mut cur)?;
    Ok((value, cur.index - offset))
}

/// Parses every top-level form in `input` and wraps them in `(progn …)`,
/// so evaluating the result runs each in order and yields the last one's
/// value (nil if `input` held no forms).
pub fn parse_program(heap: &mut Heap, input: &str) -> Result<ObjRef, LispError> {
    let mut cur = Cursor::new(input);
    let mut forms = Vec::new();
    loop {
        if at_end(&mut cur) {
            break;
        }
        forms.push(parse_value_internal(heap, &mut cur)?);
    }
    let progn = heap.allocate(Payload::Symbol("progn".to_string()));
    let body = heap.vec_to_list(&forms);
    Ok(heap.cons(progn, body))
}
