//! Tokenizer for the Thrift IDL subset.
//!
//! Identifiers may contain dots (qualified references like `Core.Location`
//! and namespace names tokenize as one identifier).

use crate::error::IdlError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    StringLit(String),
    IntLit(i64),
    FloatLit(f64),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Semi,
    Colon,
    Equals,
    Star,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub fn tokenize(file: &str, source: &str) -> Result<Vec<Spanned>, IdlError> {
    let mut tokens = Vec::new();
    let bytes = source.as_bytes();
    let mut pos = 0usize;
    let mut line = 1u32;

    let err = |line: u32, message: String| IdlError::Parse {
        file: file.to_string(),
        line,
        message,
    };

    while pos < bytes.len() {
        let c = bytes[pos] as char;
        match c {
            '\n' => {
                line += 1;
                pos += 1;
            }
            ' ' | '\t' | '\r' => pos += 1,
            '#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            '/' if bytes.get(pos + 1) == Some(&b'/') => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            '/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos += 2;
                loop {
                    match bytes.get(pos) {
                        None => return Err(err(line, "unterminated block comment".to_string())),
                        Some(b'\n') => {
                            line += 1;
                            pos += 1;
                        }
                        Some(b'*') if bytes.get(pos + 1) == Some(&b'/') => {
                            pos += 2;
                            break;
                        }
                        Some(_) => pos += 1,
                    }
                }
            }
            '"' | '\'' => {
                let quote = bytes[pos];
                pos += 1;
                let start = pos;
                while pos < bytes.len() && bytes[pos] != quote {
                    if bytes[pos] == b'\n' {
                        line += 1;
                    }
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(err(line, "unterminated string literal".to_string()));
                }
                let text = std::str::from_utf8(&bytes[start..pos])
                    .map_err(|_| err(line, "string literal is not UTF-8".to_string()))?;
                tokens.push(Spanned {
                    token: Token::StringLit(text.to_string()),
                    line,
                });
                pos += 1;
            }
            '{' | '}' | '(' | ')' | '[' | ']' | '<' | '>' | ',' | ';' | ':' | '=' | '*' => {
                let token = match c {
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '<' => Token::LAngle,
                    '>' => Token::RAngle,
                    ',' => Token::Comma,
                    ';' => Token::Semi,
                    ':' => Token::Colon,
                    '=' => Token::Equals,
                    _ => Token::Star,
                };
                tokens.push(Spanned { token, line });
                pos += 1;
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let start = pos;
                pos += 1;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric()
                        || bytes[pos] == b'.'
                        || bytes[pos] == b'-'
                        || bytes[pos] == b'+')
                {
                    pos += 1;
                }
                let text = &source[start..pos];
                let token = if let Some(hex) =
                    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
                {
                    Token::IntLit(
                        i64::from_str_radix(hex, 16)
                            .map_err(|_| err(line, format!("bad hex literal '{text}'")))?,
                    )
                } else if text.contains('.') || text.contains('e') || text.contains('E') {
                    Token::FloatLit(
                        text.parse::<f64>()
                            .map_err(|_| err(line, format!("bad number literal '{text}'")))?,
                    )
                } else {
                    Token::IntLit(
                        text.parse::<i64>()
                            .map_err(|_| err(line, format!("bad number literal '{text}'")))?,
                    )
                };
                tokens.push(Spanned { token, line });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                while pos < bytes.len()
                    && ((bytes[pos] as char).is_ascii_alphanumeric()
                        || bytes[pos] == b'_'
                        || bytes[pos] == b'.')
                {
                    pos += 1;
                }
                tokens.push(Spanned {
                    token: Token::Ident(source[start..pos].to_string()),
                    line,
                });
            }
            other => return Err(err(line, format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}
