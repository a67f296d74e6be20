//! Tokenizer for the formula grammar: `+ - * /`, parentheses, decimal number
//! literals, and cell references. Whitespace is permitted between tokens and
//! otherwise ignored.

use crate::error::SheetError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    /// Raw `[A-Za-z]+[0-9]+` text; the parser is responsible for validating
    /// it as a [`crate::position::Position`].
    Cell(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, SheetError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let mut seen_dot = false;
                while i < bytes.len() {
                    let b = bytes[i] as char;
                    if b.is_ascii_digit() {
                        i += 1;
                    } else if b == '.' && !seen_dot {
                        seen_dot = true;
                        i += 1;
                    } else {
                        break;
                    }
                }
                let text = &src[start..i];
                let value: f64 = text
                    .parse()
                    .map_err(|_| SheetError::ParsingError(format!("invalid number: {text}")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] as char).is_ascii_alphabetic() {
                    i += 1;
                }
                let letters_end = i;
                while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                    i += 1;
                }
                if i == letters_end {
                    return Err(SheetError::ParsingError(format!(
                        "expected digits after '{}' in cell reference",
                        &src[start..letters_end]
                    )));
                }
                tokens.push(Token::Cell(src[start..i].to_string()));
            }
            other => {
                return Err(SheetError::ParsingError(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}
