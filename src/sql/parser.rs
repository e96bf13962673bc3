//! SQL Parser
//!
//! This module parses statement tokens into an AST. Statements are
//! classified by their leading keyword; an unknown keyword is reported as
//! an unknown command, any other shape mismatch as a syntax error.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::error::{Error, Result};

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a statement string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = match lexer.tokenize() {
            Ok(tokens) => tokens,
            Err(err) if leads_with_command(sql) => return Err(err),
            Err(_) => return Err(Error::UnknownCommand),
        };

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single statement. An optional trailing semicolon is allowed;
    /// anything after it is a syntax error.
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }
        if !self.is_at_end() {
            return Err(self.unexpected());
        }

        Ok(stmt)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Create => self.parse_create(),
            Token::Drop => self.parse_drop(),
            Token::Use => {
                self.advance();
                Ok(Statement::Use(self.expect_identifier()?))
            }
            Token::Show => self.parse_show(),
            Token::Describe => {
                self.advance();
                Ok(Statement::Describe(self.expect_identifier()?))
            }
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            _ => Err(Error::UnknownCommand),
        }
    }

    // ========== CREATE / DROP / SHOW ==========

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(&Token::Create)?;

        match self.current() {
            Token::Database => {
                self.advance();
                Ok(Statement::CreateDatabase(self.expect_identifier()?))
            }
            Token::Table => self.parse_create_table().map(Statement::CreateTable),
            _ => Err(Error::UnknownCommand),
        }
    }

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let type_spec = self.parse_type_spec()?;
            columns.push(ColumnSpec { name, type_spec });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    /// Collect the raw text of a column type up to the next top-level `,`
    /// or `)`. The text is validated when the table is created.
    fn parse_type_spec(&mut self) -> Result<String> {
        let mut spec = String::new();
        let mut depth = 0usize;

        loop {
            match self.current() {
                Token::Eof => return Err(self.unexpected()),
                Token::Comma | Token::RParen if depth == 0 => break,
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            spec.push_str(&self.current().to_string());
            self.advance();
        }

        if spec.is_empty() {
            return Err(self.unexpected());
        }
        Ok(spec)
    }

    fn parse_drop(&mut self) -> Result<Statement> {
        self.expect(&Token::Drop)?;

        match self.current() {
            Token::Database => {
                self.advance();
                Ok(Statement::DropDatabase(self.expect_identifier()?))
            }
            Token::Table => {
                self.advance();
                Ok(Statement::DropTable(self.expect_identifier()?))
            }
            _ => Err(Error::UnknownCommand),
        }
    }

    fn parse_show(&mut self) -> Result<Statement> {
        self.expect(&Token::Show)?;

        let stmt = match self.current() {
            Token::Databases => Statement::ShowDatabases,
            Token::Tables => Statement::ShowTables,
            _ => return Err(Error::UnknownCommand),
        };
        self.advance();
        Ok(stmt)
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table_name = self.expect_identifier()?;

        let columns = if self.check(&Token::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&Token::Values)?;

        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            values.push(self.parse_literal_list()?);
            self.expect(&Token::RParen)?;

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let projection = match self.current() {
            Token::Asterisk | Token::IntegerLiteral(1) => {
                self.advance();
                Projection::Wildcard
            }
            _ => Projection::Columns(self.parse_identifier_list()?),
        };

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;
        let clause = self.parse_clause()?;

        Ok(SelectStatement {
            projection,
            table_name,
            clause,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let clause = self.parse_clause()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            clause,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;
        let clause = self.parse_clause()?;

        Ok(DeleteStatement { table_name, clause })
    }

    // ========== WHERE / ORDER BY / LIMIT ==========

    fn parse_clause(&mut self) -> Result<Clause> {
        let mut clause = Clause::default();

        if self.check(&Token::Where) {
            self.advance();
            loop {
                clause.conditions.push(self.parse_condition()?);

                if !self.check(&Token::And) {
                    break;
                }
                self.advance();
            }
        }

        if self.check(&Token::Order) {
            self.advance();
            self.expect(&Token::By)?;
            clause.order_by = Some(self.expect_identifier()?);

            if self.check(&Token::Desc) {
                self.advance();
                clause.sort = SortOrder::Desc;
            } else if self.check(&Token::Asc) {
                self.advance();
            }
        }

        if self.check(&Token::Limit) {
            self.advance();
            let limit = self.expect_integer()?;
            let limit = usize::try_from(limit).map_err(|_| Error::syntax(limit.to_string()))?;
            clause.limit = Some(limit);
        }

        Ok(clause)
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        let column = self.expect_identifier()?;

        let op = match self.current() {
            Token::Eq => ComparisonOp::Eq,
            Token::Neq => ComparisonOp::NotEq,
            Token::Lt => ComparisonOp::Lt,
            Token::Gt => ComparisonOp::Gt,
            Token::Lte => ComparisonOp::LtEq,
            Token::Gte => ComparisonOp::GtEq,
            Token::Like => ComparisonOp::Like,
            _ => return Err(self.unexpected()),
        };
        self.advance();

        let literal = self.parse_literal()?;

        Ok(Condition {
            column,
            op,
            literal,
        })
    }

    // ========== Helper functions ==========

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current() {
            Token::Null => Literal::Null,
            Token::IntegerLiteral(n) => Literal::Integer(*n),
            Token::StringLiteral(s) | Token::Identifier(s) => Literal::String(s.clone()),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_literal_list(&mut self) -> Result<Vec<Literal>> {
        let mut literals = Vec::new();

        loop {
            literals.push(self.parse_literal()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(literals)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();

        loop {
            identifiers.push(self.expect_identifier()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn unexpected(&self) -> Error {
        Error::syntax(self.current().to_string())
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Expect a name. All-digit words such as `2024` lex as integers but
    /// are valid names too.
    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::IntegerLiteral(n) if n >= 0 => {
                self.advance();
                Ok(n.to_string())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// Check whether the first word of a statement is a command keyword
fn leads_with_command(sql: &str) -> bool {
    let word: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    Token::from_keyword(&word).is_some_and(|t| t.is_command())
}

/// Split caller input into statements on `;` and the `\g` terminator,
/// ignoring terminators inside quoted strings. Blank pieces are dropped.
pub fn split_statements(input: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                ';' => statements.push(std::mem::take(&mut current)),
                '\\' if chars.peek() == Some(&'g') => {
                    chars.next();
                    statements.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            },
        }
    }
    statements.push(current);

    statements
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<Statement> {
        Parser::new(sql)?.parse()
    }

    #[test]
    fn test_parse_simple_select() {
        let stmt = parse("SELECT * FROM users").unwrap();

        match stmt {
            Statement::Select(s) => {
                assert_eq!(s.projection, Projection::Wildcard);
                assert_eq!(s.table_name, "users");
                assert_eq!(s.clause, Clause::default());
            }
            _ => panic!("Expected SELECT statement"),
        }
    }

    #[test]
    fn test_parse_select_one_is_wildcard() {
        let stmt = parse("select 1 from users;").unwrap();
        assert!(matches!(stmt, Statement::Select(s) if s.projection == Projection::Wildcard));
    }

    #[test]
    fn test_parse_select_with_clause() {
        let stmt = parse(
            "SELECT id, name FROM user WHERE id > 2 AND name != 'Mark' ORDER BY id DESC LIMIT 5",
        )
        .unwrap();

        match stmt {
            Statement::Select(s) => {
                assert_eq!(
                    s.projection,
                    Projection::Columns(vec!["id".to_string(), "name".to_string()])
                );
                assert_eq!(s.clause.conditions.len(), 2);
                assert_eq!(s.clause.conditions[0].op, ComparisonOp::Gt);
                assert_eq!(s.clause.conditions[0].literal, Literal::Integer(2));
                assert_eq!(s.clause.conditions[1].op, ComparisonOp::NotEq);
                assert_eq!(
                    s.clause.conditions[1].literal,
                    Literal::String("Mark".to_string())
                );
                assert_eq!(s.clause.order_by.as_deref(), Some("id"));
                assert_eq!(s.clause.sort, SortOrder::Desc);
                assert_eq!(s.clause.limit, Some(5));
            }
            _ => panic!("Expected SELECT statement"),
        }
    }

    #[test]
    fn test_parse_like() {
        let stmt = parse("SELECT * FROM user WHERE name LIKE 'Ma%'").unwrap();
        match stmt {
            Statement::Select(s) => {
                assert_eq!(s.clause.conditions[0].op, ComparisonOp::Like);
            }
            _ => panic!("Expected SELECT statement"),
        }
    }

    #[test]
    fn test_parse_create_table() {
        let stmt = parse("CREATE TABLE user (id INT(10), name VARCHAR(10), note TEXT)").unwrap();

        match stmt {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.table_name, "user");
                let specs: Vec<_> = ct
                    .columns
                    .iter()
                    .map(|c| (c.name.as_str(), c.type_spec.as_str()))
                    .collect();
                assert_eq!(
                    specs,
                    vec![("id", "INT(10)"), ("name", "VARCHAR(10)"), ("note", "TEXT")]
                );
            }
            _ => panic!("Expected CREATE TABLE statement"),
        }
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse("INSERT INTO user (id, name) VALUES (1,'Rena'), (2, \"Al\"), (3, NULL)")
            .unwrap();

        match stmt {
            Statement::Insert(i) => {
                assert_eq!(i.table_name, "user");
                assert_eq!(i.columns.as_ref().unwrap().len(), 2);
                assert_eq!(i.values.len(), 3);
                assert_eq!(i.values[1][1], Literal::String("Al".to_string()));
                assert_eq!(i.values[2][1], Literal::Null);
            }
            _ => panic!("Expected INSERT statement"),
        }
    }

    #[test]
    fn test_parse_insert_without_columns() {
        let stmt = parse("INSERT INTO user VALUES (1, Jack)").unwrap();
        match stmt {
            Statement::Insert(i) => {
                assert!(i.columns.is_none());
                assert_eq!(i.values[0][1], Literal::String("Jack".to_string()));
            }
            _ => panic!("Expected INSERT statement"),
        }
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse("UPDATE user SET name = 'Marc', id = 30 WHERE name = 'Mark'").unwrap();

        match stmt {
            Statement::Update(u) => {
                assert_eq!(u.table_name, "user");
                assert_eq!(u.assignments.len(), 2);
                assert_eq!(u.assignments[1].value, Literal::Integer(30));
                assert_eq!(u.clause.conditions.len(), 1);
            }
            _ => panic!("Expected UPDATE statement"),
        }
    }

    #[test]
    fn test_parse_delete() {
        let stmt = parse("DELETE FROM user WHERE id >= 3").unwrap();

        match stmt {
            Statement::Delete(d) => {
                assert_eq!(d.table_name, "user");
                assert_eq!(d.clause.conditions[0].op, ComparisonOp::GtEq);
            }
            _ => panic!("Expected DELETE statement"),
        }
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(
            parse("create database shop").unwrap(),
            Statement::CreateDatabase("shop".to_string())
        );
        assert_eq!(parse("USE shop").unwrap(), Statement::Use("shop".to_string()));
        assert_eq!(parse("SHOW DATABASES").unwrap(), Statement::ShowDatabases);
        assert_eq!(parse("show tables;").unwrap(), Statement::ShowTables);
        assert_eq!(
            parse("DESCRIBE user").unwrap(),
            Statement::Describe("user".to_string())
        );
        assert_eq!(
            parse("DROP TABLE user").unwrap(),
            Statement::DropTable("user".to_string())
        );
        assert_eq!(
            parse("DROP DATABASE shop").unwrap(),
            Statement::DropDatabase("shop".to_string())
        );
    }

    #[test]
    fn test_parse_numeric_names() {
        assert_eq!(
            parse("CREATE DATABASE 2024").unwrap(),
            Statement::CreateDatabase("2024".to_string())
        );
        assert_eq!(parse("USE 2024").unwrap(), Statement::Use("2024".to_string()));

        match parse("CREATE TABLE 123 (1col INT, 2 VARCHAR(5))").unwrap() {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.table_name, "123");
                let names: Vec<&str> = ct.columns.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, vec!["1col", "2"]);
            }
            _ => panic!("Expected CREATE TABLE statement"),
        }

        match parse("SELECT 2 FROM 123 WHERE 2 = 'x'").unwrap() {
            Statement::Select(s) => {
                assert_eq!(s.projection, Projection::Columns(vec!["2".to_string()]));
                assert_eq!(s.clause.conditions[0].column, "2");
            }
            _ => panic!("Expected SELECT statement"),
        }

        assert!(matches!(parse("USE -1"), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_unknown_commands() {
        assert!(matches!(parse("EXPLAIN SELECT"), Err(Error::UnknownCommand)));
        assert!(matches!(parse(""), Err(Error::UnknownCommand)));
        assert!(matches!(parse("CREATE INDEX idx"), Err(Error::UnknownCommand)));
        assert!(matches!(parse("SHOW COLUMNS"), Err(Error::UnknownCommand)));
        assert!(matches!(parse("GRANT ! all"), Err(Error::UnknownCommand)));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("SELECT * FORM user"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("SELECT FROM user"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("SELECT * FROM user WHERE id"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("SELECT * FROM user LIMIT -1"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("SELECT * FROM user; DROP TABLE user"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("INSERT INTO user VALUES (1, 'x"), Err(Error::SyntaxError { .. })));
        assert!(matches!(parse("CREATE TABLE t ()"), Err(Error::SyntaxError { .. })));
    }

    #[test]
    fn test_split_statements() {
        let pieces = split_statements("USE shop; SELECT * FROM t WHERE a = 'x;y'\\g  ;\nSHOW TABLES");
        assert_eq!(
            pieces,
            vec![
                "USE shop".to_string(),
                "SELECT * FROM t WHERE a = 'x;y'".to_string(),
                "SHOW TABLES".to_string(),
            ]
        );
    }
}
