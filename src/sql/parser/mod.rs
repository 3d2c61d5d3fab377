use std::iter::Peekable;

use crate::error::{Error, Result};
use crate::sql::parser::lexer::{Keyword, Lexer, Token};
use crate::sql::types::DataType;

pub mod ast;
mod lexer;

/// SQL Parser - Converts tokens into Abstract Syntax Tree (AST)
///
/// Statement recognition mirrors the command dispatcher contract: an unknown
/// leading keyword, CREATE without TABLE, INSERT without INTO, or trailing
/// input after a transaction keyword is `Error::UnknownCommand`. A grammar
/// violation inside a recognized statement collapses to that statement's
/// single syntax message.
pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given SQL input
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input).peekable(),
        }
    }

    /// Parses the input into a statement
    pub fn parse(&mut self) -> Result<ast::Statement> {
        let token = match self.peek() {
            Ok(Some(token)) => token,
            // Empty or unlexable input matches no command
            _ => return Err(Error::UnknownCommand),
        };
        match token {
            Token::Keyword(Keyword::Create) => self.parse_create_table(),
            Token::Keyword(Keyword::Insert) => self.parse_insert(),
            Token::Keyword(Keyword::Select) => self.parse_select(),
            Token::Keyword(Keyword::Update) => self.parse_update(),
            Token::Keyword(Keyword::Delete) => self.parse_delete(),
            Token::Keyword(Keyword::Begin) => self.parse_transaction(ast::Statement::Begin),
            Token::Keyword(Keyword::Commit) => self.parse_transaction(ast::Statement::Commit),
            Token::Keyword(Keyword::Rollback) => self.parse_transaction(ast::Statement::Rollback),
            _ => Err(Error::UnknownCommand),
        }
    }

    /// Parses CREATE TABLE
    fn parse_create_table(&mut self) -> Result<ast::Statement> {
        self.next()?;
        // Dispatch is on the two-word prefix: bare CREATE is not a command
        if self.next_if_token(Token::Keyword(Keyword::Table)).is_none() {
            return Err(Error::UnknownCommand);
        }
        self.create_table_body()
            .map_err(|_| Error::Syntax("Syntax Error in CREATE TABLE".to_string()))
    }

    fn create_table_body(&mut self) -> Result<ast::Statement> {
        let name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_ddl_column()?);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        self.next_expect(Token::CloseParen)?;
        self.expect_end()?;
        Ok(ast::Statement::CreateTable { name, columns })
    }

    /// Parses a column definition: name, type, constraint keywords
    fn parse_ddl_column(&mut self) -> Result<ast::Column> {
        let mut column = ast::Column {
            name: self.next_ident()?,
            datatype: match self.next()? {
                Token::Keyword(Keyword::Int) | Token::Keyword(Keyword::Integer) => {
                    DataType::Integer
                }
                Token::Keyword(Keyword::Bool) | Token::Keyword(Keyword::Boolean) => {
                    DataType::Boolean
                }
                Token::Keyword(Keyword::Text)
                | Token::Keyword(Keyword::String)
                | Token::Keyword(Keyword::Varchar) => DataType::Text,
                token => {
                    return Err(Error::Syntax(format!("[Parser] Unexpected token {}", token)));
                }
            },
            primary_key: false,
            unique: false,
        };

        // Constraint keywords (PRIMARY KEY, UNIQUE) may repeat and combine
        while let Some(Token::Keyword(keyword)) = self.next_if_keyword() {
            match keyword {
                Keyword::Primary => {
                    self.next_expect(Token::Keyword(Keyword::Key))?;
                    column.primary_key = true;
                }
                Keyword::Unique => column.unique = true,
                k => return Err(Error::Syntax(format!("[Parser] Unexpected keyword {}", k))),
            }
        }

        Ok(column)
    }

    /// Parses INSERT
    fn parse_insert(&mut self) -> Result<ast::Statement> {
        self.next()?;
        if self.next_if_token(Token::Keyword(Keyword::Into)).is_none() {
            return Err(Error::UnknownCommand);
        }
        self.insert_body()
            .map_err(|_| Error::Syntax("Syntax Error in INSERT".to_string()))
    }

    fn insert_body(&mut self) -> Result<ast::Statement> {
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Values))?;

        self.next_expect(Token::OpenParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_expression()?);
            match self.next()? {
                Token::CloseParen => break,
                Token::Comma => {}
                token => {
                    return Err(Error::Syntax(format!("[Parser] Unexpected token {}", token)));
                }
            }
        }
        self.expect_end()?;
        Ok(ast::Statement::Insert { table_name, values })
    }

    /// Parses SELECT
    fn parse_select(&mut self) -> Result<ast::Statement> {
        self.select_body()
            .map_err(|_| Error::Syntax("Syntax Error in SELECT".to_string()))
    }

    fn select_body(&mut self) -> Result<ast::Statement> {
        self.next()?;
        // The projection is accepted and ignored: skip everything up to FROM
        loop {
            if let Token::Keyword(Keyword::From) = self.next()? {
                break;
            }
        }
        let table_name = self.next_ident()?;

        let join = if self.next_if_token(Token::Keyword(Keyword::Join)).is_some() {
            let join_table = self.next_ident()?;
            self.next_expect(Token::Keyword(Keyword::On))?;
            let left_column = self.parse_qualified_column()?;
            self.next_expect(Token::Equal)?;
            let right_column = self.parse_qualified_column()?;
            Some(ast::Join {
                table_name: join_table,
                left_column,
                right_column,
            })
        } else {
            None
        };

        let where_clause = self.parse_where_clause()?;
        self.expect_end()?;
        Ok(ast::Statement::Select {
            table_name,
            join,
            where_clause,
        })
    }

    /// Parses UPDATE - exactly one assignment and one predicate
    fn parse_update(&mut self) -> Result<ast::Statement> {
        self.update_body()
            .map_err(|_| Error::Syntax("Syntax Error or complex UPDATE not supported".to_string()))
    }

    fn update_body(&mut self) -> Result<ast::Statement> {
        self.next()?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;

        let column = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let value = self.parse_expression()?;

        self.next_expect(Token::Keyword(Keyword::Where))?;
        let where_column = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let where_value = self.parse_expression()?;

        self.expect_end()?;
        Ok(ast::Statement::Update {
            table_name,
            column,
            value,
            where_clause: (where_column, where_value),
        })
    }

    /// Parses DELETE
    fn parse_delete(&mut self) -> Result<ast::Statement> {
        self.delete_body()
            .map_err(|_| Error::Syntax("Syntax Error in DELETE".to_string()))
    }

    fn delete_body(&mut self) -> Result<ast::Statement> {
        self.next()?;
        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;

        self.next_expect(Token::Keyword(Keyword::Where))?;
        let column = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let value = self.parse_expression()?;

        self.expect_end()?;
        Ok(ast::Statement::Delete {
            table_name,
            where_clause: (column, value),
        })
    }

    /// Parses BEGIN / COMMIT / ROLLBACK
    fn parse_transaction(&mut self, stmt: ast::Statement) -> Result<ast::Statement> {
        self.next()?;
        self.next_if_token(Token::Semicolon);
        // The whole line must be the bare keyword to count as a command
        match self.peek() {
            Ok(None) => Ok(stmt),
            _ => Err(Error::UnknownCommand),
        }
    }

    /// Parses an expression (constants only)
    fn parse_expression(&mut self) -> Result<ast::Expression> {
        Ok(match self.next()? {
            Token::Number(n) => {
                if n.chars().all(|c| c.is_ascii_digit()) {
                    ast::Consts::Integer(n.parse()?).into()
                } else {
                    // Decimal literals are stored as text; there is no float type
                    ast::Consts::String(n).into()
                }
            }
            Token::Minus => match self.next()? {
                Token::Number(n) if n.chars().all(|c| c.is_ascii_digit()) => {
                    ast::Consts::Integer(-n.parse::<i64>()?).into()
                }
                Token::Number(n) => ast::Consts::String(format!("-{}", n)).into(),
                token => {
                    return Err(Error::Syntax(format!("[Parser] Unexpected token {}", token)));
                }
            },
            Token::String(s) => ast::Consts::String(s).into(),
            // Unquoted words are text literals
            Token::Ident(s) => ast::Consts::String(s).into(),
            Token::Keyword(Keyword::True) => ast::Consts::Boolean(true).into(),
            Token::Keyword(Keyword::False) => ast::Consts::Boolean(false).into(),
            Token::Keyword(k) => ast::Consts::String(k.to_str().to_string()).into(),
            t => {
                return Err(Error::Syntax(format!(
                    "[Parser] Unexpected expression token {}",
                    t
                )));
            }
        })
    }

    /// Parses a WHERE clause: column = value
    fn parse_where_clause(&mut self) -> Result<Option<(String, ast::Expression)>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }
        let col = self.next_ident()?;
        self.next_expect(Token::Equal)?;
        let val = self.parse_expression()?;
        Ok(Some((col, val)))
    }

    /// Parses a qualified column reference, returning the column part only
    fn parse_qualified_column(&mut self) -> Result<String> {
        self.next_ident()?;
        self.next_expect(Token::Dot)?;
        self.next_ident()
    }

    /// Consumes an optional trailing semicolon and expects end of input
    fn expect_end(&mut self) -> Result<()> {
        self.next_if_token(Token::Semicolon);
        match self.peek()? {
            Some(token) => Err(Error::Syntax(format!("[Parser] Unexpected token {}", token))),
            None => Ok(()),
        }
    }

    /// Peeks at the next token
    fn peek(&mut self) -> Result<Option<Token>> {
        self.lexer.peek().cloned().transpose()
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        self.lexer
            .next()
            .unwrap_or_else(|| Err(Error::Syntax("[Parser] Unexpected end of input".to_string())))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            token => Err(Error::Syntax(format!(
                "[Parser] Expected ident, got token {}",
                token
            ))),
        }
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next()?;
        if token != expect {
            return Err(Error::Syntax(format!(
                "[Parser] Expected token {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Consumes next token if it satisfies the predicate
    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<Token> {
        self.peek().unwrap_or(None).filter(|t| predicate(t))?;
        self.next().ok()
    }

    /// Consumes next token if it's a keyword
    fn next_if_keyword(&mut self) -> Option<Token> {
        self.next_if(|t| matches!(t, Token::Keyword(_)))
    }

    /// Consumes next token if it matches the given token
    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.next_if(|t| t == &token)
    }
}
