use crate::lexer::{Token, TokenType};

/// A parsed program: the top-level statement sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assignment {
        name: String,
        value: Expr,
        line: usize,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        // The grammar accepts an else suite; the lowering stage decides
        // whether it is supported.
        else_body: Vec<Stmt>,
        line: usize,
    },
    If {
        condition: Expr,
        body: Vec<Stmt>,
        else_body: Vec<Stmt>,
        line: usize,
    },
    Expression {
        expr: Expr,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i64),
    Identifier(String),
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        line: usize,
    },
    Call {
        name: String,
        arguments: Vec<Expr>,
        line: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        if self.check(&TokenType::While) {
            return self.parse_while();
        }
        if self.check(&TokenType::If) {
            return self.parse_if();
        }
        self.parse_simple_statement()
    }

    /// A statement that fits on one line: an assignment or an expression.
    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        if let TokenType::Identifier(_) = self.peek().token_type {
            if self.peek_next().map(|t| &t.token_type) == Some(&TokenType::Equal) {
                return self.parse_assignment();
            }
        }

        let line = self.peek().line;
        let expr = self.parse_expression()?;
        self.end_of_statement()?;
        Ok(Stmt::Expression { expr, line })
    }

    fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let name_token = self.advance();
        let line = name_token.line;

        let name = match &name_token.token_type {
            TokenType::Identifier(name) => name.clone(),
            _ => return Err(ParseError::ExpectedIdentifier(line)),
        };

        self.consume(TokenType::Equal, "Expected '=' after variable name")?;
        let value = self.parse_expression()?;
        self.end_of_statement()?;

        Ok(Stmt::Assignment { name, value, line })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line; // consume 'while'
        let condition = self.parse_expression()?;
        let body = self.parse_suite()?;
        let else_body = self.parse_else_suite()?;

        Ok(Stmt::While {
            condition,
            body,
            else_body,
            line,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line; // consume 'if'
        let condition = self.parse_expression()?;
        let body = self.parse_suite()?;
        let else_body = self.parse_else_suite()?;

        Ok(Stmt::If {
            condition,
            body,
            else_body,
            line,
        })
    }

    /// The statement block after a `while`/`if`/`else` header: either a
    /// single statement on the header line, or an indented block.
    fn parse_suite(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.consume(TokenType::Colon, "Expected ':' before a block")?;

        if self.match_token_types(&[TokenType::Newline]) {
            self.consume(TokenType::Indent, "Expected an indented block")?;
            let mut statements = Vec::new();
            while !self.check(&TokenType::Dedent) && !self.is_at_end() {
                statements.push(self.parse_statement()?);
            }
            self.consume(TokenType::Dedent, "Expected the block to end")?;
            Ok(statements)
        } else {
            let statement = self.parse_simple_statement()?;
            Ok(vec![statement])
        }
    }

    fn parse_else_suite(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.check(&TokenType::Else) {
            self.advance();
            self.parse_suite()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_comparison()
    }

    /// Comparisons bind loosest and do not chain: `a < b < c` is an error.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        if self.match_token_types(&[
            TokenType::EqualEqual,
            TokenType::BangEqual,
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::Greater,
            TokenType::GreaterEqual,
        ]) {
            let operator_token = self.previous();
            let operator = match operator_token.token_type {
                TokenType::EqualEqual => BinaryOp::Equal,
                TokenType::BangEqual => BinaryOp::NotEqual,
                TokenType::Less => BinaryOp::Less,
                TokenType::LessEqual => BinaryOp::LessEqual,
                TokenType::Greater => BinaryOp::Greater,
                TokenType::GreaterEqual => BinaryOp::GreaterEqual,
                _ => unreachable!(),
            };
            let line = operator_token.line;
            let right = self.parse_additive()?;
            return Ok(Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                line,
            });
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        while self.match_token_types(&[TokenType::Plus, TokenType::Minus]) {
            let operator_token = self.previous();
            let operator = match operator_token.token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };
            let line = operator_token.line;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                line,
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while self.match_token_types(&[TokenType::Star, TokenType::Slash, TokenType::Percent]) {
            let operator_token = self.previous();
            let operator = match operator_token.token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                TokenType::Percent => BinaryOp::Modulo,
                _ => unreachable!(),
            };
            let line = operator_token.line;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                line,
            };
        }

        Ok(left)
    }

    /// A leading '-' negates an integer literal; general negation is not
    /// part of the language.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_token_types(&[TokenType::Minus]) {
            let line = self.previous().line;
            let token = self.advance();
            return match token.token_type {
                TokenType::Number(n) => Ok(Expr::Number(n.wrapping_neg())),
                _ => Err(ParseError::ExpectedNumber(line)),
            };
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();

        match &token.token_type {
            TokenType::Number(n) => Ok(Expr::Number(*n)),
            TokenType::Identifier(name) => {
                let name = name.clone();
                let line = token.line;

                if self.check(&TokenType::LeftParen) {
                    self.advance(); // consume '('
                    let mut arguments = Vec::new();

                    if !self.check(&TokenType::RightParen) {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if !self.match_token_types(&[TokenType::Comma]) {
                                break;
                            }
                        }
                    }

                    self.consume(TokenType::RightParen, "Expected ')' after call arguments")?;

                    Ok(Expr::Call {
                        name,
                        arguments,
                        line,
                    })
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            TokenType::LeftParen => {
                let expr = self.parse_expression()?;
                self.consume(TokenType::RightParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            _ => Err(ParseError::UnexpectedToken(
                token.token_type.clone(),
                token.line,
            )),
        }
    }

    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenType::Eof) {
            return Ok(());
        }
        self.consume(TokenType::Newline, "Expected end of line after statement")?;
        Ok(())
    }

    // Helper methods

    fn match_token_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(token_type)
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> Option<&Token> {
        if self.current + 1 < self.tokens.len() {
            Some(&self.tokens[self.current + 1])
        } else {
            None
        }
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, ParseError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(ParseError::ExpectedToken(
                token_type,
                self.peek().line,
                message.to_string(),
            ))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected token {0} at line {1}")]
    UnexpectedToken(TokenType, usize),

    #[error("Expected identifier at line {0}")]
    ExpectedIdentifier(usize),

    #[error("Expected an integer literal after '-' at line {0}")]
    ExpectedNumber(usize),

    #[error("Expected token {0} at line {1}: {2}")]
    ExpectedToken(TokenType, usize, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize().unwrap();
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    #[test]
    fn test_simple_assignment() {
        let program = parse_source("x = 42\n").unwrap();
        assert_eq!(
            program.statements,
            vec![Stmt::Assignment {
                name: "x".to_string(),
                value: Expr::Number(42),
                line: 1,
            }]
        );
    }

    #[test]
    fn test_negative_literal() {
        let program = parse_source("x = -5\n").unwrap();
        assert_eq!(
            program.statements,
            vec![Stmt::Assignment {
                name: "x".to_string(),
                value: Expr::Number(-5),
                line: 1,
            }]
        );
    }

    #[test]
    fn test_negation_of_non_literal_rejected() {
        let err = parse_source("x = -y\n").unwrap_err();
        assert!(matches!(err, ParseError::ExpectedNumber(1)));
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let program = parse_source("x = 1 + 2 * 3\n").unwrap();
        let Stmt::Assignment { value, .. } = &program.statements[0] else {
            panic!("Expected assignment");
        };
        assert_eq!(
            *value,
            Expr::Binary {
                left: Box::new(Expr::Number(1)),
                operator: BinaryOp::Add,
                right: Box::new(Expr::Binary {
                    left: Box::new(Expr::Number(2)),
                    operator: BinaryOp::Multiply,
                    right: Box::new(Expr::Number(3)),
                    line: 1,
                }),
                line: 1,
            }
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        // (1 + 2) * 3 parses as (1 + 2) * 3
        let program = parse_source("x = (1 + 2) * 3\n").unwrap();
        let Stmt::Assignment { value, .. } = &program.statements[0] else {
            panic!("Expected assignment");
        };
        assert_eq!(
            *value,
            Expr::Binary {
                left: Box::new(Expr::Binary {
                    left: Box::new(Expr::Number(1)),
                    operator: BinaryOp::Add,
                    right: Box::new(Expr::Number(2)),
                    line: 1,
                }),
                operator: BinaryOp::Multiply,
                right: Box::new(Expr::Number(3)),
                line: 1,
            }
        );
    }

    #[test]
    fn test_comparison_binds_loosest() {
        // x + 1 < y * 2
        let program = parse_source("c = x + 1 < y * 2\n").unwrap();
        let Stmt::Assignment { value, .. } = &program.statements[0] else {
            panic!("Expected assignment");
        };
        let Expr::Binary { operator, .. } = value else {
            panic!("Expected binary expression");
        };
        assert_eq!(*operator, BinaryOp::Less);
    }

    #[test]
    fn test_while_with_indented_body() {
        let program = parse_source("while x:\n    x = x - 1\n").unwrap();
        let Stmt::While {
            condition,
            body,
            else_body,
            line,
        } = &program.statements[0]
        else {
            panic!("Expected while");
        };
        assert_eq!(*condition, Expr::Identifier("x".to_string()));
        assert_eq!(body.len(), 1);
        assert!(else_body.is_empty());
        assert_eq!(*line, 1);
    }

    #[test]
    fn test_if_with_inline_body() {
        let program = parse_source("if x: x = 99\n").unwrap();
        let Stmt::If { body, .. } = &program.statements[0] else {
            panic!("Expected if");
        };
        assert_eq!(
            body[0],
            Stmt::Assignment {
                name: "x".to_string(),
                value: Expr::Number(99),
                line: 1,
            }
        );
    }

    #[test]
    fn test_else_suite_is_captured() {
        let program = parse_source("if x:\n    y = 1\nelse:\n    y = 2\n").unwrap();
        let Stmt::If { body, else_body, .. } = &program.statements[0] else {
            panic!("Expected if");
        };
        assert_eq!(body.len(), 1);
        assert_eq!(else_body.len(), 1);
    }

    #[test]
    fn test_nested_blocks() {
        let source = "while a:\n    if b:\n        a = a - 1\n    b = b + 1\n";
        let program = parse_source(source).unwrap();
        let Stmt::While { body, .. } = &program.statements[0] else {
            panic!("Expected while");
        };
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0], Stmt::If { .. }));
        assert!(matches!(body[1], Stmt::Assignment { .. }));
    }

    #[test]
    fn test_call_statement_and_arguments() {
        let program = parse_source("min(x, 2 + 3)\n").unwrap();
        let Stmt::Expression { expr, .. } = &program.statements[0] else {
            panic!("Expected expression statement");
        };
        let Expr::Call {
            name, arguments, ..
        } = expr
        else {
            panic!("Expected call");
        };
        assert_eq!(name, "min");
        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments[0], Expr::Identifier("x".to_string()));
    }

    #[test]
    fn test_missing_colon_rejected() {
        let err = parse_source("while x\n    x = x - 1\n").unwrap_err();
        assert!(matches!(err, ParseError::ExpectedToken(TokenType::Colon, 1, _)));
    }

    #[test]
    fn test_two_statements_on_one_line_rejected() {
        let err = parse_source("x = 1 y = 2\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::ExpectedToken(TokenType::Newline, 1, _)
        ));
    }

    #[test]
    fn test_program_without_trailing_newline() {
        let program = parse_source("x = 1").unwrap();
        assert_eq!(program.statements.len(), 1);
    }
}
