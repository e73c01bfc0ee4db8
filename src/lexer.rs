use std::{convert::TryFrom, fmt};

use lazy_static::lazy_static;
use log::trace;
use regex::{Captures, Regex};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
        }
    }

    pub fn is_right_associative(self) -> bool {
        self == Operator::Pow
    }
}

impl TryFrom<char> for Operator {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Operator::Add),
            '-' => Ok(Operator::Sub),
            '*' => Ok(Operator::Mul),
            '/' => Ok(Operator::Div),
            '^' => Ok(Operator::Pow),
            other => Err(other),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    OpenParen,
    CloseParen,
    Comma,
    /// the square root prefix `√`
    Root,
    Ident(String),
    Operator(Operator),
    Number(f64),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Root => write!(f, "'√'"),
            Token::Ident(name) => write!(f, "identifier `{}`", name),
            Token::Operator(op) => write!(f, "operator '{}'", op),
            Token::Number(num) => write!(f, "number {}", num),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with its character offset in the normalized input.
#[derive(Debug, PartialEq, Clone)]
pub struct Lexeme {
    pub token: Token,
    pub pos: usize,
}

impl Lexeme {
    pub fn new(token: Token, pos: usize) -> Self {
        Self { token, pos }
    }
}

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("malformed number `{text}` at position {pos}")]
    InvalidNumber { text: String, pos: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { pos, .. } | LexError::InvalidNumber { pos, .. } => *pos,
        }
    }
}

lazy_static! {
    static ref SYMBOL_RE: Regex = Regex::new("[×÷−π]").unwrap();
    static ref TOKEN_RE: Regex = Regex::new(&[
        r"(?P<space>\s+)",
        r"(?P<number>(?:[0-9]|\.[0-9])[0-9.]*(?:[eE][+-]?[0-9]*)?)",
        r"(?P<ident>\p{Alphabetic}[\p{Alphabetic}0-9_]*)",
        r"(?P<operator>[-+*/^])",
        r"(?P<oppar>\()",
        r"(?P<clpar>\))",
        r"(?P<comma>,)",
        r"(?P<root>√)",
        r"(?P<invalid>(?s:.))"
    ].join("|"))
    .unwrap();
}

/// Replace the calculator display symbols with their canonical spelling.
///
/// `√` is left in place; the parser treats it as a prefix operator.
pub fn normalize(input: &str) -> String {
    SYMBOL_RE
        .replace_all(input, |caps: &Captures| match &caps[0] {
            "×" => "*",
            "÷" => "/",
            "−" => "-",
            _ => "pi",
        })
        .to_string()
}

/// lex the given input string - returns a stack, so first-on last-off.
///
/// The bottom of the stack is always a `Token::Eof` positioned at the end of
/// the normalized input.
pub fn lex(input: &str) -> Result<Vec<Lexeme>, LexError> {
    let normalized = normalize(input);

    let mut res = Vec::new();
    let mut pos = 0;
    for cap in TOKEN_RE.captures_iter(&normalized) {
        let text = &cap[0];
        let width = text.chars().count();

        let token = if cap.name("space").is_some() {
            pos += width;
            continue;
        } else if let Some(inner) = cap.name("number") {
            let num = inner
                .as_str()
                .parse()
                .map_err(|_| LexError::InvalidNumber {
                    text: inner.as_str().to_string(),
                    pos,
                })?;
            Token::Number(num)
        } else if let Some(ident) = cap.name("ident") {
            Token::Ident(ident.as_str().to_string())
        } else if let Some(op) = cap.name("operator") {
            let c = op.as_str().chars().next().unwrap_or_default();
            let op = Operator::try_from(c).map_err(|ch| LexError::UnexpectedChar { ch, pos })?;
            Token::Operator(op)
        } else if cap.name("oppar").is_some() {
            Token::OpenParen
        } else if cap.name("clpar").is_some() {
            Token::CloseParen
        } else if cap.name("comma").is_some() {
            Token::Comma
        } else if cap.name("root").is_some() {
            Token::Root
        } else {
            let ch = text.chars().next().unwrap_or_default();
            return Err(LexError::UnexpectedChar { ch, pos });
        };

        res.push(Lexeme::new(token, pos));
        pos += width;
    }
    res.push(Lexeme::new(Token::Eof, pos));

    trace!("lexed {:?} into {} tokens", input, res.len());
    res.reverse();
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).unwrap().into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn normalize_works() {
        assert_eq!(normalize("6×4÷2−π"), "6*4/2-pi");
        assert_eq!(normalize("√9"), "√9");
    }

    #[test]
    fn lex_works() {
        let input = "max(x, 1.5) ^ 2";
        let tokenized = vec![
            Token::Eof,
            Token::Number(2.0),
            Token::Operator(Operator::Pow),
            Token::CloseParen,
            Token::Number(1.5),
            Token::Comma,
            Token::Ident("x".to_string()),
            Token::OpenParen,
            Token::Ident("max".to_string()),
        ];
        assert_eq!(tokens(input), tokenized);
    }

    #[test]
    fn lex_records_positions() {
        let lexemes = lex(" 12 +ab").unwrap();
        let positions: Vec<usize> = lexemes.iter().rev().map(|l| l.pos).collect();
        assert_eq!(positions, vec![1, 4, 5, 7]);
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            tokens("1.5e3 .25 2E-2 7."),
            vec![
                Token::Eof,
                Token::Number(7.0),
                Token::Number(0.02),
                Token::Number(0.25),
                Token::Number(1500.0),
            ]
        );
    }

    #[test]
    fn lex_rejects_malformed_numbers() {
        assert_eq!(
            lex("1.2.3"),
            Err(LexError::InvalidNumber {
                text: "1.2.3".to_string(),
                pos: 0
            })
        );
        assert_eq!(
            lex("2 + 3e"),
            Err(LexError::InvalidNumber {
                text: "3e".to_string(),
                pos: 4
            })
        );
        assert_eq!(lex("1e+ 2").unwrap_err().position(), 0);
    }

    #[test]
    fn lex_display_symbols() {
        assert_eq!(
            tokens("√π×2"),
            vec![
                Token::Eof,
                Token::Number(2.0),
                Token::Operator(Operator::Mul),
                Token::Ident("pi".to_string()),
                Token::Root,
            ]
        );
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert_eq!(
            tokens("Pi pi_2"),
            vec![
                Token::Eof,
                Token::Ident("pi_2".to_string()),
                Token::Ident("Pi".to_string()),
            ]
        );
    }

    #[test]
    fn lex_rejects_unknown_characters() {
        assert_eq!(
            lex("2 + 3 % 4"),
            Err(LexError::UnexpectedChar { ch: '%', pos: 6 })
        );
        assert_eq!(lex("1 $").unwrap_err().position(), 2);
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(lex("   ").unwrap(), vec![Lexeme::new(Token::Eof, 3)]);
    }
}
