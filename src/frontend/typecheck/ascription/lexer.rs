//! 类型声明注释的词法分析

use std::iter::Peekable;
use std::str::Chars;

/// 词法单元种类
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Eq,
    Minus,
    Eof,
}

impl TokenKind {
    /// 用于错误信息的描述
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Str(s) => format!("string {:?}", s),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Eq => "'='".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Eof => "end of annotation".to_string(),
        }
    }
}

/// 词法单元（`offset` 是在声明文本中的字节偏移）
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// 词法错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at column {}", .offset + 1)]
pub struct LexError {
    pub message: String,
    pub offset: usize,
}

/// 声明文本的词法分析器
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            offset: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// 下一个词法单元
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
        let start = self.offset;
        let Some(c) = self.advance() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset: start,
            });
        };
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Eq,
            '-' => TokenKind::Minus,
            '"' | '\'' => TokenKind::Str(self.scan_string(c, start)?),
            c if c.is_ascii_digit() => TokenKind::Number(self.scan_number(c, start)?),
            c if is_identifier_start(c) => {
                let mut name = String::from(c);
                while let Some(next) = self.peek().filter(|&n| is_identifier_char(n)) {
                    name.push(next);
                    self.advance();
                }
                TokenKind::Identifier(name)
            }
            other => {
                return Err(LexError {
                    message: format!("unexpected character '{}'", other),
                    offset: start,
                })
            }
        };
        Ok(Token {
            kind,
            offset: start,
        })
    }

    fn scan_number(
        &mut self,
        first: char,
        start: usize,
    ) -> Result<f64, LexError> {
        let mut text = String::from(first);
        while let Some(c) = self
            .peek()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
        {
            // 只有指数部分允许出现符号
            if matches!(c, '+' | '-') && !text.ends_with(['e', 'E']) {
                break;
            }
            text.push(c);
            self.advance();
        }
        text.replace('_', "").parse::<f64>().map_err(|_| LexError {
            message: format!("invalid number literal '{}'", text),
            offset: start,
        })
    }

    fn scan_string(
        &mut self,
        quote: char,
        start: usize,
    ) -> Result<String, LexError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => {
                    let escaped = match self.advance() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('u') => self.scan_unicode_escape(start)?,
                        Some(other) => other,
                        None => break,
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
                None => break,
            }
        }
        Err(LexError {
            message: "unterminated string".to_string(),
            offset: start,
        })
    }

    fn scan_unicode_escape(
        &mut self,
        start: usize,
    ) -> Result<char, LexError> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            match self.advance() {
                Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                _ => break,
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexError {
                message: format!("invalid unicode escape '\\u{}'", hex),
                offset: start,
            })
    }
}

/// 分析整段声明文本
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    unicode_ident::is_xid_start(c) || c == '_' || c == '$'
}

fn is_identifier_char(c: char) -> bool {
    unicode_ident::is_xid_continue(c) || c == '$'
}
