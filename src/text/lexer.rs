//! Script Source Tokenizer
//!
//! Splits script source into delimiters, quoted strings and bare words. Comments are
//! dropped here so the parser never sees them.

use crate::errors::{MdsError, MdsResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBrace,
    RBrace,
    /// `"..."` with the quotes removed
    Quoted(String),
    /// Anything else up to the next delimiter: keywords, numbers, `R:1000`, `M.`
    Word(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based source line
    pub line: usize,
}

impl Token {
    /// Rendering used in error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::Quoted(value) => format!("\"{}\"", value),
            TokenKind::Word(value) => format!("'{}'", value),
        }
    }
}

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b'{' | b'}' | b'"') || byte.is_ascii_whitespace()
}

fn starts_comment(bytes: &[u8], pos: usize) -> bool {
    bytes[pos] == b'/' && matches!(bytes.get(pos + 1), Some(b'/') | Some(b'*'))
}

pub fn tokenize(source: &str) -> MdsResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        match byte {
            b'\n' => {
                line += 1;
                pos += 1;
            },
            _ if byte.is_ascii_whitespace() => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            },
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let start_line = line;
                pos += 2;
                loop {
                    match bytes.get(pos) {
                        None => {
                            return Err(MdsError::UnexpectedToken {
                                line: start_line,
                                expected: "end of block comment".to_string(),
                                found: "end of input".to_string(),
                            })
                        },
                        Some(b'*') if bytes.get(pos + 1) == Some(&b'/') => {
                            pos += 2;
                            break;
                        },
                        Some(b'\n') => {
                            line += 1;
                            pos += 1;
                        },
                        Some(_) => pos += 1,
                    }
                }
            },
            b'(' | b')' | b'{' | b'}' => {
                let kind = match byte {
                    b'(' => TokenKind::LParen,
                    b')' => TokenKind::RParen,
                    b'{' => TokenKind::LBrace,
                    _ => TokenKind::RBrace,
                };
                tokens.push(Token { kind, line });
                pos += 1;
            },
            b'"' => {
                let start = pos + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'"' && bytes[end] != b'\n' {
                    end += 1;
                }
                if end >= bytes.len() || bytes[end] != b'"' {
                    let found = if end >= bytes.len() { "end of input" } else { "end of line" };
                    return Err(MdsError::UnexpectedToken {
                        line,
                        expected: "closing quote".to_string(),
                        found: found.to_string(),
                    });
                }
                tokens.push(Token {
                    kind: TokenKind::Quoted(source[start..end].to_string()),
                    line,
                });
                pos = end + 1;
            },
            _ => {
                let start = pos;
                while pos < bytes.len() && !is_delimiter(bytes[pos]) && !starts_comment(bytes, pos)
                {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Word(source[start..pos].to_string()),
                    line,
                });
            },
        }
    }

    Ok(tokens)
}
