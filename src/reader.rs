use logos::{Logos, Span};

use crate::error::{EvalResult, RascalError};
use crate::heap::Heap;
use crate::value::ObjRef;

//===----------------------------------------------------------------------===//
// Utils
//===----------------------------------------------------------------------===//

/// Unescapes a string literal by converting escape sequences to their
/// actual characters. Unknown sequences keep the backslash as written.
fn unescape_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some('0') => result.push('\0'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

//===----------------------------------------------------------------------===//
// Token
//
// Uses the logos crate for the tokenizer. The surface is small: two list
// bracket styles, quote/unquote prefixes, strings, integers, symbols.
//===----------------------------------------------------------------------===//

#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    // Whitespace and ;-comments are ignored.
    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[regex(r";[^\n]*", logos::skip)]
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Reader macros: `:expr` quotes, `$expr` unquotes.
    #[token(":")]
    Quote,
    #[token("$")]
    Unquote,

    #[regex(r#""([^"\\]|\\.)*""#,
      callback = |lex| {
        let slice = lex.slice();
        let content = &slice[1..slice.len()-1];
        unescape_string(content)
      })]
    Str(String),

    // Unterminated string: starts with " and runs to EOF without a closing
    // quote. Must stay lower priority than the proper Str rule.
    #[regex(r#""([^"\\]|\\.)*"#, priority = 0)]
    UnterminatedStr,

    #[regex(r"-?[0-9]+",
      priority = 3,
      callback = |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    // Everything else that is not whitespace or reserved punctuation.
    // A lone `-` lands here rather than in Int.
    #[regex(r#"[^ \t\r\n()\[\]:$";]+"#,
      priority = 1,
      callback = |lex| lex.slice().to_owned())]
    Symbol(String),
}

/// A token plus its source span, kept for error reporting.
#[derive(Debug, PartialEq, Clone)]
struct SpannedToken {
    token: Token,
    span: Span,
}

#[derive(Debug)]
pub struct Reader {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl Reader {
    fn next(&mut self) -> EvalResult<&SpannedToken> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or_else(|| RascalError::ReadError("unexpected end of input".to_string()))?;
        self.position += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

//===----------------------------------------------------------------------===//
// Tokenizer
//===----------------------------------------------------------------------===//

pub fn tokenize(source: &str) -> EvalResult<Reader> {
    let mut lexer = Token::lexer(source);
    let mut tokens: Vec<SpannedToken> = vec![];

    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(SpannedToken { token, span: lexer.span() }),
            Err(()) => {
                return Err(RascalError::ReadError(format!(
                    "unrecognized input at byte {}",
                    lexer.span().start
                )));
            }
        }
    }

    Ok(Reader { tokens, position: 0 })
}

//===----------------------------------------------------------------------===//
// Reader
//===----------------------------------------------------------------------===//

fn read_atom(heap: &mut Heap, reader: &mut Reader) -> EvalResult<ObjRef> {
    let spanned = reader.next()?;
    match spanned.token.clone() {
        Token::Int(n) => Ok(heap.number(n)),
        Token::Str(s) => Ok(heap.string(&s)),
        Token::Symbol(name) => Ok(heap.symbol(&name)),
        Token::UnterminatedStr => {
            Err(RascalError::ReadError("unterminated string literal".to_string()))
        }
        other => Err(RascalError::ReadError(format!(
            "unexpected token {:?} at byte {}",
            other, spanned.span.start
        ))),
    }
}

/// Read list elements up to the matching close bracket.
fn read_list(heap: &mut Heap, reader: &mut Reader, close: Token) -> EvalResult<ObjRef> {
    let mut elements = Vec::new();
    loop {
        let token = reader
            .peek()
            .ok_or_else(|| RascalError::ReadError("unexpected end of input in list".to_string()))?
            .token
            .clone();
        if token == close {
            let _ = reader.next();
            break;
        }
        if matches!(token, Token::RParen | Token::RBracket) {
            return Err(RascalError::ReadError("mismatched closing bracket".to_string()));
        }
        elements.push(read_form(heap, reader)?);
    }
    Ok(heap.list(&elements))
}

/// Expand a one-token reader macro into `(name form)`.
fn read_prefixed(heap: &mut Heap, reader: &mut Reader, name: &str) -> EvalResult<ObjRef> {
    let head = heap.symbol(name);
    let form = read_form(heap, reader)?;
    Ok(heap.list(&[head, form]))
}

fn read_form(heap: &mut Heap, reader: &mut Reader) -> EvalResult<ObjRef> {
    let spanned = reader
        .peek()
        .ok_or_else(|| RascalError::ReadError("unexpected end of input".to_string()))?;
    match spanned.token {
        Token::Quote => {
            let _ = reader.next();
            read_prefixed(heap, reader, "quote")
        }
        Token::Unquote => {
            let _ = reader.next();
            read_prefixed(heap, reader, "unquote")
        }
        Token::LParen => {
            let _ = reader.next();
            read_list(heap, reader, Token::RParen)
        }
        Token::LBracket => {
            let _ = reader.next();
            read_list(heap, reader, Token::RBracket)
        }
        Token::RParen | Token::RBracket => {
            Err(RascalError::ReadError(format!("unexpected ')' at byte {}", spanned.span.start)))
        }
        _ => read_atom(heap, reader),
    }
}

/// Read the first form in `source`.
pub fn read(heap: &mut Heap, source: &str) -> EvalResult<ObjRef> {
    let mut reader = tokenize(source)?;
    read_form(heap, &mut reader)
}

/// Read every top-level form in `source`, in order.
pub fn read_all(heap: &mut Heap, source: &str) -> EvalResult<Vec<ObjRef>> {
    let mut reader = tokenize(source)?;
    let mut forms = Vec::new();
    while !reader.at_end() {
        forms.push(read_form(heap, &mut reader)?);
    }
    Ok(forms)
}
