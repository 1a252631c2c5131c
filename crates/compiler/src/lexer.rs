//! Lexer for Patito source text
//!
//! Hand-rolled, single pass, tracks 1-indexed line/column for diagnostics.
//! Reserved words are recognized by looking up an already-scanned
//! identifier in a table, same as `examples/original_source/patito/scanner.py`.

use crate::error::LexError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Id(String),
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),

    // reserved words
    Programa,
    Vars,
    Inicio,
    Fin,
    Funcs,
    Func,
    Finf,
    Entero,
    Flotante,
    Nula,
    Escribe,
    Si,
    Sino,
    Mientras,
    Haz,
    Ret,

    // punctuation / operators
    Igual,
    Mas,
    Menos,
    Mult,
    Div,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Colon,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

fn reserved(word: &str) -> Option<TokenKind> {
    Some(match word {
        "programa" => TokenKind::Programa,
        "vars" => TokenKind::Vars,
        "inicio" => TokenKind::Inicio,
        "fin" => TokenKind::Fin,
        "funcs" => TokenKind::Funcs,
        "func" => TokenKind::Func,
        "finf" => TokenKind::Finf,
        "entero" => TokenKind::Entero,
        "flotante" => TokenKind::Flotante,
        "nula" => TokenKind::Nula,
        "escribe" | "imprime" => TokenKind::Escribe,
        "si" => TokenKind::Si,
        "sino" => TokenKind::Sino,
        "mientras" => TokenKind::Mientras,
        "haz" => TokenKind::Haz,
        "ret" | "regresa" => TokenKind::Ret,
        _ => return None,
    })
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn err(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c == ' ' || c == '\t' || c == '\n' || c == '\r' => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            None => break,
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
        };

        if c.is_ascii_digit() {
            return self.lex_number(line, column);
        }
        if c.is_alphabetic() || c == '_' {
            return self.lex_ident(line, column);
        }
        if c == '"' {
            return self.lex_string(line, column);
        }

        let two = self.peek_at(1);
        let kind = match (c, two) {
            ('<', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Le
            }
            ('>', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Ge
            }
            ('=', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Eq
            }
            ('!', Some('=')) => {
                self.advance();
                self.advance();
                TokenKind::Neq
            }
            ('<', _) => {
                self.advance();
                TokenKind::Lt
            }
            ('>', _) => {
                self.advance();
                TokenKind::Gt
            }
            ('=', _) => {
                self.advance();
                TokenKind::Igual
            }
            ('+', _) => {
                self.advance();
                TokenKind::Mas
            }
            ('-', _) => {
                self.advance();
                TokenKind::Menos
            }
            ('*', _) => {
                self.advance();
                TokenKind::Mult
            }
            ('/', _) => {
                self.advance();
                TokenKind::Div
            }
            ('(', _) => {
                self.advance();
                TokenKind::LParen
            }
            (')', _) => {
                self.advance();
                TokenKind::RParen
            }
            ('{', _) => {
                self.advance();
                TokenKind::LBrace
            }
            ('}', _) => {
                self.advance();
                TokenKind::RBrace
            }
            (';', _) => {
                self.advance();
                TokenKind::Semicolon
            }
            (',', _) => {
                self.advance();
                TokenKind::Comma
            }
            (':', _) => {
                self.advance();
                TokenKind::Colon
            }
            (other, _) => return Err(self.err(format!("illegal character '{other}'"))),
        };
        Ok(Token { kind, line, column })
    }

    fn lex_number(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            let text: String = self.chars[start..self.pos].iter().collect();
            let value: f64 = text
                .parse()
                .map_err(|_| self.err(format!("invalid float literal '{text}'")))?;
            return Ok(Token {
                kind: TokenKind::FloatLit(value),
                line,
                column,
            });
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let value: i64 = text
            .parse()
            .map_err(|_| self.err(format!("invalid integer literal '{text}'")))?;
        Ok(Token {
            kind: TokenKind::IntLit(value),
            line,
            column,
        })
    }

    fn lex_ident(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = reserved(&text).unwrap_or(TokenKind::Id(text));
        Ok(Token { kind, line, column })
    }

    fn lex_string(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(self.err("unterminated string literal")),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => value.push(other),
                    None => return Err(self.err("unterminated string literal")),
                },
                Some(c) => value.push(c),
            }
        }
        Ok(Token {
            kind: TokenKind::StrLit(value),
            line,
            column,
        })
    }
}

/// Tokenize `source`, returning an EOF-terminated token stream.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn recognizes_reserved_words_and_aliases() {
        assert_eq!(kinds("escribe")[0], TokenKind::Escribe);
        assert_eq!(kinds("imprime")[0], TokenKind::Escribe);
        assert_eq!(kinds("ret")[0], TokenKind::Ret);
        assert_eq!(kinds("regresa")[0], TokenKind::Ret);
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        assert_eq!(kinds("42")[0], TokenKind::IntLit(42));
        assert_eq!(kinds("3.14")[0], TokenKind::FloatLit(3.14));
    }

    #[test]
    fn two_char_operators_take_priority() {
        assert_eq!(kinds("<=")[0], TokenKind::Le);
        assert_eq!(kinds("==")[0], TokenKind::Eq);
        assert_eq!(kinds("<")[0], TokenKind::Lt);
    }

    #[test]
    fn skips_line_and_block_comments() {
        let toks = kinds("// hi\nx /* block \n comment */ = 1;");
        assert_eq!(
            toks,
            vec![
                TokenKind::Id("x".to_string()),
                TokenKind::Igual,
                TokenKind::IntLit(1),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literal_handles_escapes() {
        assert_eq!(kinds(r#""a\nb""#)[0], TokenKind::StrLit("a\nb".to_string()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"abc").is_err());
    }

    #[test]
    fn illegal_character_is_an_error() {
        assert!(tokenize("x = 1 @ 2;").is_err());
    }

    #[test]
    fn line_and_column_tracking_survives_newlines() {
        let toks = tokenize("x\n  y").unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[1].column, 3);
    }
}
