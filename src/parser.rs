//! Parser for rule antecedents such as
//! `(not Location is Warehouse) and Activity is Moderate`.
//!
//! Operands are `<name> is <term>` propositions. From tightest to loosest
//! binding the operators are `is`, `not` (prefix, right associative), `and`
//! and `or` (both left associative); parentheses group. Keywords are
//! lowercase, any other whitespace- or parenthesis-delimited word is a name.

use std::fmt;
use std::str::FromStr;

use crate::dsl::Expr;
use crate::error::ParseError;

// Binding powers, left/right for infix operators
const OR_BP: (u8, u8) = (1, 2);
const AND_BP: (u8, u8) = (3, 4);
const NOT_BP: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'s> {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Is,
    Word(&'s str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::Is => "is",
            Token::Word(word) => *word,
        };

        f.write_str(s)
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    fn word(s: &str) -> Token<'_> {
        match s {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "is" => Token::Is,
            _ => Token::Word(s),
        }
    }

    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            if let Some(s) = start.take() {
                tokens.push(word(&text[s..i]));
            }

            match c {
                '(' => tokens.push(Token::LParen),
                ')' => tokens.push(Token::RParen),
                _ => {},
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        tokens.push(word(&text[s..]));
    }

    tokens
}

struct Parser<'s> {
    tokens: Vec<Token<'s>>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<(usize, Token<'s>)> {
        let token = self.peek()?;
        let pos = self.pos;

        self.pos += 1;

        Some((pos, token))
    }

    fn expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let (pos, token) = self.next().ok_or(ParseError::UnexpectedEnd)?;

        let mut lhs = match token {
            Token::LParen => {
                let inner = self.expr(0)?;

                match self.next() {
                    Some((_, Token::RParen)) => inner,
                    Some((position, token)) => {
                        return Err(ParseError::UnexpectedToken {
                            token: token.to_string(),
                            position,
                        })
                    },
                    None => return Err(ParseError::UnbalancedParens { position: pos }),
                }
            },
            Token::Not => !self.operand("not", pos, NOT_BP)?,
            Token::Word(variable) => self.literal(variable, pos)?,
            Token::And => return Err(ParseError::MissingOperand { operator: "and", position: pos }),
            Token::Or => return Err(ParseError::MissingOperand { operator: "or", position: pos }),
            Token::Is => return Err(ParseError::MalformedLiteral { position: pos }),
            Token::RParen => return Err(ParseError::UnbalancedParens { position: pos }),
        };

        loop {
            let (operator, (l_bp, r_bp)) = match self.peek() {
                Some(Token::And) => ("and", AND_BP),
                Some(Token::Or) => ("or", OR_BP),
                _ => break,
            };

            if l_bp < min_bp {
                break;
            }

            let (op_pos, _) = self.next().ok_or(ParseError::UnexpectedEnd)?;
            let rhs = self.operand(operator, op_pos, r_bp)?;

            lhs = match operator {
                "and" => lhs.and(rhs),
                _ => lhs.or(rhs),
            };
        }

        Ok(lhs)
    }

    /// Parses the operand following `operator`, reporting an arity error if there is none.
    fn operand(&mut self, operator: &'static str, position: usize, bp: u8) -> Result<Expr, ParseError> {
        match self.peek() {
            None | Some(Token::And | Token::Or | Token::RParen) => {
                Err(ParseError::MissingOperand { operator, position })
            },
            Some(_) => self.expr(bp),
        }
    }

    fn literal(&mut self, variable: &str, pos: usize) -> Result<Expr, ParseError> {
        match (self.next(), self.next()) {
            (Some((_, Token::Is)), Some((_, Token::Word(term)))) => Ok(Expr::is(variable, term)),
            _ => Err(ParseError::MalformedLiteral { position: pos }),
        }
    }
}

/// Parses antecedent text into an expression tree.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text);

    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr(0)?;

    match parser.next() {
        None => Ok(expr),
        Some((position, Token::RParen)) => Err(ParseError::UnbalancedParens { position }),
        Some((position, token)) => Err(ParseError::UnexpectedToken {
            token: token.to_string(),
            position,
        }),
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[test]
fn test_tokenize() {
    assert_eq!(
        tokenize("(not Location is Warehouse)and X is y"),
        vec![
            Token::LParen,
            Token::Not,
            Token::Word("Location"),
            Token::Is,
            Token::Word("Warehouse"),
            Token::RParen,
            Token::And,
            Token::Word("X"),
            Token::Is,
            Token::Word("y"),
        ]
    );
}

#[test]
fn test_precedence() {
    let a = || Expr::is("A", "a");
    let b = || Expr::is("B", "b");
    let c = || Expr::is("C", "c");

    assert_eq!(parse("A is a"), Ok(a()));
    // and binds tighter than or
    assert_eq!(parse("A is a or B is b and C is c"), Ok(a().or(b().and(c()))));
    assert_eq!(parse("A is a and B is b or C is c"), Ok(a().and(b()).or(c())));
    // Left associative
    assert_eq!(parse("A is a and B is b and C is c"), Ok(a().and(b()).and(c())));
    assert_eq!(parse("A is a or B is b or C is c"), Ok(a().or(b()).or(c())));
    // not binds tighter than and, and nests to the right
    assert_eq!(parse("not A is a and B is b"), Ok((!a()).and(b())));
    assert_eq!(parse("not not A is a"), Ok(!!a()));
    assert_eq!(parse("not (A is a and B is b)"), Ok(!a().and(b())));
    assert_eq!(parse("A is a and (B is b or C is c)"), Ok(a().and(b().or(c()))));
    assert_eq!(parse("((A is a))"), Ok(a()));
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse("   "), Err(ParseError::Empty));
    assert_eq!(parse("(A is a"), Err(ParseError::UnbalancedParens { position: 0 }));
    assert_eq!(parse("A is a)"), Err(ParseError::UnbalancedParens { position: 3 }));
    assert_eq!(parse(")"), Err(ParseError::UnbalancedParens { position: 0 }));
    assert_eq!(
        parse("A is a and"),
        Err(ParseError::MissingOperand {
            operator: "and",
            position: 3
        })
    );
    assert_eq!(
        parse("or A is a"),
        Err(ParseError::MissingOperand {
            operator: "or",
            position: 0
        })
    );
    assert_eq!(
        parse("not"),
        Err(ParseError::MissingOperand {
            operator: "not",
            position: 0
        })
    );
    assert_eq!(parse("A is"), Err(ParseError::MalformedLiteral { position: 0 }));
    assert_eq!(parse("A a"), Err(ParseError::MalformedLiteral { position: 0 }));
    assert_eq!(parse("is a"), Err(ParseError::MalformedLiteral { position: 0 }));
    assert_eq!(
        parse("A is a B is b"),
        Err(ParseError::UnexpectedToken {
            token: "B".into(),
            position: 3
        })
    );
}

#[test]
fn test_display_parses_back() {
    for text in [
        "Location is Warehouse",
        "Activity is Static and not Distance is Close",
        "(not Location is Warehouse) and Activity is Moderate",
        "Latency is High or Throughput is Low and not (A is a or B is b)",
    ] {
        let expr = parse(text).unwrap();

        assert_eq!(parse(&expr.to_string()), Ok(expr));
    }
}
