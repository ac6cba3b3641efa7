use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Literals
    Number(i64),
    Identifier(String),

    // Keywords
    While,
    If,
    Else,

    // Punctuation
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,
    Colon,      // :

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    Equal,        // =
    EqualEqual,   // ==
    BangEqual,    // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=

    // Layout. The lexer turns leading whitespace into explicit block
    // structure so the parser never has to count spaces.
    Newline,
    Indent,
    Dedent,

    // End of file
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(token_type: TokenType, line: usize, column: usize) -> Self {
        Self {
            token_type,
            line,
            column,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Number(n) => write!(f, "{}", n),
            TokenType::Identifier(s) => write!(f, "{}", s),
            TokenType::While => write!(f, "while"),
            TokenType::If => write!(f, "if"),
            TokenType::Else => write!(f, "else"),
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::Comma => write!(f, ","),
            TokenType::Colon => write!(f, ":"),
            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Star => write!(f, "*"),
            TokenType::Slash => write!(f, "/"),
            TokenType::Percent => write!(f, "%"),
            TokenType::Equal => write!(f, "="),
            TokenType::EqualEqual => write!(f, "=="),
            TokenType::BangEqual => write!(f, "!="),
            TokenType::Less => write!(f, "<"),
            TokenType::LessEqual => write!(f, "<="),
            TokenType::Greater => write!(f, ">"),
            TokenType::GreaterEqual => write!(f, ">="),
            TokenType::Newline => write!(f, "end of line"),
            TokenType::Indent => write!(f, "indent"),
            TokenType::Dedent => write!(f, "dedent"),
            TokenType::Eof => write!(f, "EOF"),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    indents: Vec<usize>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            indents: vec![0],
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            // Each pass through this loop handles one source line.
            let indent = self.measure_indent()?;

            if self.is_at_end() {
                break;
            }

            // Blank and comment-only lines do not affect the layout.
            if self.peek() == '\n' {
                self.consume_newline();
                continue;
            }
            if self.peek() == '#' {
                self.skip_comment();
                if !self.is_at_end() {
                    self.consume_newline();
                }
                continue;
            }

            self.apply_indentation(indent, &mut tokens)?;

            while !self.is_at_end() && self.peek() != '\n' {
                match self.peek() {
                    ' ' | '\r' => {
                        self.advance();
                    }
                    '#' => {
                        self.skip_comment();
                    }
                    _ => tokens.push(self.next_token()?),
                }
            }

            tokens.push(Token::new(TokenType::Newline, self.line, self.column));
            if !self.is_at_end() {
                self.consume_newline();
            }
        }

        // Close any blocks still open at end of input.
        while self.indents.len() > 1 {
            self.indents.pop();
            tokens.push(Token::new(TokenType::Dedent, self.line, self.column));
        }
        tokens.push(Token::new(TokenType::Eof, self.line, self.column));
        Ok(tokens)
    }

    fn measure_indent(&mut self) -> Result<usize, LexError> {
        let mut indent = 0;
        while !self.is_at_end() {
            match self.peek() {
                ' ' => {
                    indent += 1;
                    self.advance();
                }
                '\r' => {
                    self.advance();
                }
                '\t' => return Err(LexError::TabIndentation(self.line)),
                _ => break,
            }
        }
        Ok(indent)
    }

    fn apply_indentation(
        &mut self,
        indent: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), LexError> {
        let current = *self.indents.last().expect("indent stack is never empty");

        if indent > current {
            self.indents.push(indent);
            tokens.push(Token::new(TokenType::Indent, self.line, self.column));
        } else if indent < current {
            while *self.indents.last().expect("indent stack is never empty") > indent {
                self.indents.pop();
                tokens.push(Token::new(TokenType::Dedent, self.line, self.column));
            }
            // A dedent must land back on an enclosing indentation level.
            if *self.indents.last().expect("indent stack is never empty") != indent {
                return Err(LexError::InconsistentIndentation(self.line));
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start_line = self.line;
        let start_column = self.column;

        let ch = self.advance();

        let token_type = match ch {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            ',' => TokenType::Comma,
            ':' => TokenType::Colon,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '*' => TokenType::Star,
            '/' => TokenType::Slash,
            '%' => TokenType::Percent,
            '=' => {
                if self.matches('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                }
            }
            '!' => {
                if self.matches('=') {
                    TokenType::BangEqual
                } else {
                    return Err(LexError::UnexpectedCharacter('!', start_line, start_column));
                }
            }
            '<' => {
                if self.matches('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                }
            }
            '>' => {
                if self.matches('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                }
            }
            _ if ch.is_ascii_digit() => {
                self.position -= 1;
                self.column -= 1;
                self.number()?
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                self.position -= 1;
                self.column -= 1;
                self.identifier_or_keyword()
            }
            _ => return Err(LexError::UnexpectedCharacter(ch, start_line, start_column)),
        };

        Ok(Token::new(token_type, start_line, start_column))
    }

    fn number(&mut self) -> Result<TokenType, LexError> {
        let start_line = self.line;
        let start_column = self.column;

        let mut digits = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            digits.push(self.advance());
        }

        digits
            .parse::<i64>()
            .map(TokenType::Number)
            .map_err(|_| LexError::InvalidNumber(digits, start_line, start_column))
    }

    fn identifier_or_keyword(&mut self) -> TokenType {
        let mut identifier = String::new();
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            identifier.push(self.advance());
        }

        match identifier.as_str() {
            "while" => TokenType::While,
            "if" => TokenType::If,
            "else" => TokenType::Else,
            _ => TokenType::Identifier(identifier),
        }
    }

    fn skip_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn consume_newline(&mut self) {
        self.position += 1; // the '\n'
        self.line += 1;
        self.column = 1;
    }

    fn advance(&mut self) -> char {
        let ch = self.input[self.position];
        self.position += 1;
        self.column += 1;
        ch
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn matches(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{0}' at line {1}, column {2}")]
    UnexpectedCharacter(char, usize, usize),

    #[error("Invalid integer literal '{0}' at line {1}, column {2}")]
    InvalidNumber(String, usize, usize),

    #[error("Tab indentation at line {0}; indent with spaces")]
    TabIndentation(usize),

    #[error("Inconsistent indentation at line {0}")]
    InconsistentIndentation(usize),
}
