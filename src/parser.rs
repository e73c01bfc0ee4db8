use std::collections::HashMap;

use log::debug;

use crate::ast::{Expression, UnaryOperator};
use crate::lexer::{lex, LexError, Lexeme, Operator, Token};

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("expected an operand but found {found} at position {pos}")]
    MissingOperand { found: String, pos: usize },
    #[error("unclosed '(' at position {pos}")]
    UnclosedParen { pos: usize },
    #[error("unmatched ')' at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("',' outside of a function argument list at position {pos}")]
    MisplacedComma { pos: usize },
    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },
}

impl ParseError {
    /// Character offset in the normalized input the error points at.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.position(),
            ParseError::MissingOperand { pos, .. }
            | ParseError::UnclosedParen { pos }
            | ParseError::UnmatchedParen { pos }
            | ParseError::MisplacedComma { pos }
            | ParseError::UnexpectedToken { pos, .. } => *pos,
        }
    }
}

pub type PartialParseResult = Result<Expression, ParseError>;

fn peek(input: &[Lexeme]) -> Option<&Token> {
    input.last().map(|lexeme| &lexeme.token)
}

fn position(input: &[Lexeme]) -> usize {
    input.last().map_or(0, |lexeme| lexeme.pos)
}

fn describe(input: &[Lexeme]) -> String {
    peek(input).unwrap_or(&Token::Eof).to_string()
}

fn missing_operand(input: &[Lexeme]) -> ParseError {
    ParseError::MissingOperand {
        found: describe(input),
        pos: position(input),
    }
}

#[derive(Debug, Clone)]
pub struct Parser {
    pub operator_precedence: HashMap<Operator, u32>,
}

impl std::default::Default for Parser {
    fn default() -> Self {
        let mut operator_precedence = HashMap::new();
        operator_precedence.insert(Operator::Pow, 60);
        operator_precedence.insert(Operator::Mul, 40);
        operator_precedence.insert(Operator::Div, 40);
        operator_precedence.insert(Operator::Add, 20);
        operator_precedence.insert(Operator::Sub, 20);
        Self {
            operator_precedence,
        }
    }
}

impl Parser {
    fn peek_operator(&self, input: &[Lexeme]) -> Option<(Operator, u32)> {
        match peek(input) {
            Some(Token::Operator(op)) => self
                .operator_precedence
                .get(op)
                .map(|precedence| (*op, *precedence)),
            _ => None,
        }
    }

    fn parse_number(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        match input.last() {
            Some(Lexeme {
                token: Token::Number(num),
                ..
            }) => {
                let num = *num;
                input.pop();
                Ok(Expression::Literal(num))
            }
            _ => Err(missing_operand(input)),
        }
    }

    fn parse_identifier(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        let ident = match input.pop() {
            Some(Lexeme {
                token: Token::Ident(ident),
                ..
            }) => ident,
            Some(other) => {
                input.push(other);
                return Err(missing_operand(input));
            }
            None => return Err(missing_operand(input)),
        };

        if let Some(Token::OpenParen) = peek(input) {
            let args = self.parse_args(input)?;
            Ok(Expression::Call(ident, args))
        } else {
            Ok(Expression::Variable(ident))
        }
    }

    fn parse_args(&self, input: &mut Vec<Lexeme>) -> Result<Vec<Expression>, ParseError> {
        let open = position(input);
        input.pop();

        let mut args = Vec::new();
        if let Some(Token::CloseParen) = peek(input) {
            input.pop();
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr(input)?);
            match peek(input) {
                Some(Token::Comma) => {
                    input.pop();
                }
                Some(Token::CloseParen) => {
                    input.pop();
                    return Ok(args);
                }
                Some(Token::Eof) | None => return Err(ParseError::UnclosedParen { pos: open }),
                Some(_) => {
                    return Err(ParseError::UnexpectedToken {
                        found: describe(input),
                        pos: position(input),
                    })
                }
            }
        }
    }

    fn parse_nested(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        let open = position(input);
        input.pop();

        let res = self.parse_expr(input)?;
        match peek(input) {
            Some(Token::CloseParen) => {
                input.pop();
                Ok(res)
            }
            Some(Token::Eof) | None => Err(ParseError::UnclosedParen { pos: open }),
            Some(Token::Comma) => Err(ParseError::MisplacedComma {
                pos: position(input),
            }),
            Some(_) => Err(ParseError::UnexpectedToken {
                found: describe(input),
                pos: position(input),
            }),
        }
    }

    /// `√x` is shorthand for `sqrt(x)` where `x` is the following primary.
    fn parse_root(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        input.pop();
        let operand = self.parse_primary(input)?;
        Ok(Expression::Call("sqrt".to_string(), vec![operand]))
    }

    fn parse_primary(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        match peek(input) {
            Some(Token::Number(_)) => self.parse_number(input),
            Some(Token::Ident(_)) => self.parse_identifier(input),
            Some(Token::OpenParen) => self.parse_nested(input),
            Some(Token::Root) => self.parse_root(input),
            _ => Err(missing_operand(input)),
        }
    }

    /// Unary minus binds looser than `^` but tighter than `*` and `/`,
    /// so `-2^2` is `-(2^2)` while `-2*3` is `(-2)*3`.
    fn parse_unary(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        if let Some(Token::Operator(Operator::Sub)) = peek(input) {
            input.pop();
            let operand = self.parse_unary(input)?;
            let power = self
                .operator_precedence
                .get(&Operator::Pow)
                .copied()
                .unwrap_or(u32::MAX);
            let operand = self.parse_rhs(input, power, operand)?;
            Ok(Expression::unary(UnaryOperator::Neg, operand))
        } else {
            self.parse_primary(input)
        }
    }

    fn parse_rhs(
        &self,
        input: &mut Vec<Lexeme>,
        expr_precedence: u32,
        lhs: Expression,
    ) -> PartialParseResult {
        let mut result = lhs;

        loop {
            let (operator, precedence) = match self.peek_operator(input) {
                Some((op, pr)) if pr >= expr_precedence => (op, pr),
                _ => break,
            };
            input.pop();

            let mut rhs = self.parse_unary(input)?;

            loop {
                match self.peek_operator(input) {
                    Some((_, next_precedence)) if next_precedence > precedence => {
                        rhs = self.parse_rhs(input, precedence + 1, rhs)?
                    }
                    Some((next, next_precedence))
                        if next_precedence == precedence && next.is_right_associative() =>
                    {
                        rhs = self.parse_rhs(input, precedence, rhs)?
                    }
                    _ => break,
                }
            }

            result = Expression::binary(operator, result, rhs);
        }

        Ok(result)
    }

    fn parse_expr(&self, input: &mut Vec<Lexeme>) -> PartialParseResult {
        let lhs = self.parse_unary(input)?;

        let expr = self.parse_rhs(input, 0, lhs)?;
        Ok(expr)
    }

    /// Parse a token stack as produced by [`lex`], consuming all of it.
    pub fn parse(&self, mut input: Vec<Lexeme>) -> PartialParseResult {
        let terminated = matches!(
            input.first(),
            Some(Lexeme {
                token: Token::Eof,
                ..
            })
        );
        if !terminated {
            let end = input.iter().map(|lexeme| lexeme.pos + 1).max().unwrap_or(0);
            input.insert(0, Lexeme::new(Token::Eof, end));
        }

        let expr = self.parse_expr(&mut input)?;

        match peek(&input) {
            Some(Token::Eof) | None => {
                debug!("parsed {}", expr);
                Ok(expr)
            }
            Some(Token::Comma) => Err(ParseError::MisplacedComma {
                pos: position(&input),
            }),
            Some(Token::CloseParen) => Err(ParseError::UnmatchedParen {
                pos: position(&input),
            }),
            Some(_) => Err(ParseError::UnexpectedToken {
                found: describe(&input),
                pos: position(&input),
            }),
        }
    }

    pub fn parse_str(&self, input: &str) -> PartialParseResult {
        let tokens = lex(input)?;
        self.parse(tokens)
    }
}
