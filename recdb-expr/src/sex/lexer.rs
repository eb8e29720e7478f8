//! Tokenizer for the selection-expression surface syntax.

use crate::error::ExprError;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Int(i64),
    Real(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Question,
    Colon,
    Bang,
    Hash,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    Tilde,
    AndAnd,
    OrOr,
    Implies,
    Before,
    After,
    SameTime,
    Eof,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.char_indices().peekable(),
            src,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Tok>, ExprError> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok == Tok::Eof;
            out.push(tok);
            if done {
                break;
            }
        }
        Ok(out)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn next_token(&mut self) -> Result<Tok, ExprError> {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        let Some((pos, c)) = self.bump() else {
            return Ok(Tok::Eof);
        };
        match c {
            '(' => Ok(Tok::LParen),
            ')' => Ok(Tok::RParen),
            '[' => Ok(Tok::LBracket),
            ']' => Ok(Tok::RBracket),
            '?' => Ok(Tok::Question),
            ':' => Ok(Tok::Colon),
            '#' => Ok(Tok::Hash),
            '+' => Ok(Tok::Plus),
            '-' => Ok(Tok::Minus),
            '*' => Ok(Tok::Star),
            '%' => Ok(Tok::Percent),
            '~' => Ok(Tok::Tilde),
            '/' => Ok(Tok::Slash),
            '!' => {
                if self.peek_char() == Some('=') {
                    self.bump();
                    Ok(Tok::Ne)
                } else {
                    Ok(Tok::Bang)
                }
            }
            '=' => {
                if self.peek_char() == Some('>') {
                    self.bump();
                    Ok(Tok::Implies)
                } else {
                    Ok(Tok::Eq)
                }
            }
            '&' => {
                if self.peek_char() == Some('&') {
                    self.bump();
                    Ok(Tok::AndAnd)
                } else {
                    Err(ExprError::UnexpectedChar('&', pos))
                }
            }
            '|' => {
                if self.peek_char() == Some('|') {
                    self.bump();
                    Ok(Tok::OrOr)
                } else {
                    Err(ExprError::UnexpectedChar('|', pos))
                }
            }
            '<' => {
                if self.peek_char() == Some('-') {
                    self.bump();
                    if self.peek_char() == Some('>') {
                        self.bump();
                        Ok(Tok::SameTime)
                    } else {
                        Err(ExprError::UnexpectedChar('-', pos))
                    }
                } else if self.peek_char() == Some('<') {
                    self.bump();
                    Ok(Tok::Before)
                } else if self.peek_char() == Some('=') {
                    self.bump();
                    Ok(Tok::Le)
                } else {
                    Ok(Tok::Lt)
                }
            }
            '>' => {
                if self.peek_char() == Some('>') {
                    self.bump();
                    Ok(Tok::After)
                } else if self.peek_char() == Some('=') {
                    self.bump();
                    Ok(Tok::Ge)
                } else {
                    Ok(Tok::Gt)
                }
            }
            '"' => self.string_literal(pos),
            c if c.is_ascii_digit() => self.number(pos, c),
            c if c.is_alphabetic() || c == '_' => self.ident(pos, c),
            c => Err(ExprError::UnexpectedChar(c, pos)),
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<Tok, ExprError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some((_, '"')) => return Ok(Tok::Str(out)),
                Some((_, '\\')) => match self.bump() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, c)) => out.push(c),
                    None => return Err(ExprError::Syntax("unterminated string".to_string())),
                },
                Some((_, c)) => out.push(c),
                None => {
                    let _ = start;
                    return Err(ExprError::Syntax("unterminated string".to_string()));
                }
            }
        }
    }

    fn number(&mut self, start: usize, first: char) -> Result<Tok, ExprError> {
        let mut end = start + first.len_utf8();
        let mut is_real = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                end += c.len_utf8();
                self.bump();
            } else if c == '.' && !is_real {
                is_real = true;
                end += c.len_utf8();
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.src[start..end];
        if is_real {
            text.parse::<f64>()
                .map(Tok::Real)
                .map_err(|_| ExprError::Syntax(format!("invalid number {text:?}")))
        } else {
            text.parse::<i64>()
                .map(Tok::Int)
                .map_err(|_| ExprError::Syntax(format!("invalid number {text:?}")))
        }
    }

    fn ident(&mut self, start: usize, first: char) -> Result<Tok, ExprError> {
        let mut end = start + first.len_utf8();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '%' {
                end += c.len_utf8();
                self.bump();
            } else {
                break;
            }
        }
        Ok(Tok::Ident(self.src[start..end].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_longest_match_first() {
        let toks = Lexer::new("<-> << >> <= >= => != &&").tokenize().unwrap();
        assert_eq!(
            toks,
            vec![
                Tok::SameTime,
                Tok::Before,
                Tok::After,
                Tok::Le,
                Tok::Ge,
                Tok::Implies,
                Tok::Ne,
                Tok::AndAnd,
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_name_number_and_string() {
        let toks = Lexer::new(r#"Year > 1990 && Title ~ "^The""#).tokenize().unwrap();
        assert_eq!(
            toks,
            vec![
                Tok::Ident("Year".to_string()),
                Tok::Gt,
                Tok::Int(1990),
                Tok::AndAnd,
                Tok::Ident("Title".to_string()),
                Tok::Tilde,
                Tok::Str("^The".to_string()),
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn unexpected_char_reports_position() {
        let err = Lexer::new("Year @ 1").tokenize().unwrap_err();
        assert_eq!(err, ExprError::UnexpectedChar('@', 5));
    }
}
