//! Arithmetic over values read from exhibits, e.g. `$293 * 2.061`.
//!
//! Only numbers, `+ - * /`, unary signs and parentheses are accepted, so an
//! expression assembled from table cells can never do anything but compute.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("expression is empty")]
    Empty,

    #[error("invalid expression: contains disallowed character '{0}'")]
    DisallowedCharacter(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression nests deeper than {} levels", MAX_NESTING)]
    NestingTooDeep,
}

/// Parentheses plus unary signs allowed around a single operand.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    /// Expression as given, before `$` and `,` were stripped
    pub expression: String,
    pub value: f64,
}

impl Calculation {
    /// Value rounded to 10 decimal places with trailing zeros removed, so
    /// `293 * 2.061` shows as `603.873`.
    pub fn formatted_value(&self) -> String {
        format_number(self.value)
    }
}

pub fn format_number(value: f64) -> String {
    let fixed = format!("{value:.10}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Evaluate an arithmetic expression. Currency symbols and thousands
/// separators are ignored.
pub fn calculate(expression: &str) -> Result<Calculation, CalcError> {
    let cleaned: String = expression.chars().filter(|c| *c != '$' && *c != ',').collect();
    if cleaned.trim().is_empty() {
        return Err(CalcError::Empty);
    }

    let tokens = tokenize(&cleaned)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
    };
    let value = parser.expression()?;

    if let Some(token) = parser.peek() {
        return Err(match token.kind {
            TokenKind::CloseParen => CalcError::UnbalancedParentheses,
            _ => parser.unexpected(),
        });
    }

    Ok(Calculation {
        expression: expression.to_string(),
        value,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        let kind = match c {
            ' ' => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(literal.clone()))?;
                tokens.push(Token {
                    kind: TokenKind::Number(number),
                    position,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            other => return Err(CalcError::DisallowedCharacter(other)),
        };
        tokens.push(Token { kind, position });
        chars.next();
    }

    Ok(tokens)
}

// expression := term (('+' | '-') term)*
// term       := factor (('*' | '/') factor)*
// factor     := ('+' | '-') factor | number | '(' expression ')'
struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.position += 1;
        token
    }

    /// Run `f` one nesting level deeper.
    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64, CalcError>) -> Result<f64, CalcError> {
        if self.depth >= MAX_NESTING {
            return Err(CalcError::NestingTooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn unexpected(&self) -> CalcError {
        match self.peek() {
            Some(token) => CalcError::UnexpectedToken {
                found: format!("{:?}", token.kind).to_lowercase(),
                position: token.position,
            },
            None => CalcError::UnexpectedToken {
                found: "end of expression".to_string(),
                position: self.tokens.last().map(|t| t.position + 1).unwrap_or(0),
            },
        }
    }

    fn expression(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Plus => {
                    self.advance();
                    value += self.term()?;
                }
                TokenKind::Minus => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Star => {
                    self.advance();
                    value *= self.factor()?;
                }
                TokenKind::Slash => {
                    self.advance();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };

        match token.kind {
            TokenKind::Plus => {
                self.advance();
                self.nested(Self::factor)
            }
            TokenKind::Minus => {
                self.advance();
                Ok(-self.nested(Self::factor)?)
            }
            TokenKind::Number(number) => {
                self.advance();
                Ok(number)
            }
            TokenKind::OpenParen => {
                self.advance();
                let value = self.nested(Self::expression)?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::CloseParen,
                        ..
                    }) => Ok(value),
                    _ => Err(CalcError::UnbalancedParentheses),
                }
            }
            _ => Err(self.unexpected()),
        }
    }
}
