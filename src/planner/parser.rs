use sqlparser::{
    dialect::GenericDialect,
    tokenizer::{Token, Tokenizer},
};

use crate::{
    planner::{
        error::PlannerError,
        logical_plan::{
            Assignment, ColumnDefinition, ColumnRef, CreateTablePlan, DeletePlan, DropTablePlan,
            InsertPlan, JoinPlan, Literal, LogicalPlan, Predicate, Projection, SelectPlan,
            UpdatePlan,
        },
    },
    types::{PRIMARY_KEY_COLUMN, RowId, value::DataType},
};

/// Parses one statement of the supported SQL subset into a [`LogicalPlan`].
///
/// Tokenizing is delegated to `sqlparser`; the grammar on top of it is a
/// small recursive descent parser, one method per statement kind.
#[derive(Debug, Default)]
pub struct SqlParser;

impl SqlParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_sql(&self, sql: &str) -> Result<LogicalPlan, PlannerError> {
        let dialect = GenericDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize()?
            .into_iter()
            .filter(|token| !matches!(token, Token::Whitespace(_) | Token::EOF))
            .collect();

        let mut stream = TokenStream::new(tokens);
        let plan = stream.parse_statement()?;
        stream.consume(&Token::SemiColon);
        stream.expect_end()?;
        Ok(plan)
    }
}

struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenStream {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> PlannerError {
        match self.peek() {
            Some(token) => PlannerError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            },
            None => PlannerError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    /// Consume `token` if it is next.
    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), PlannerError> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", token)))
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.peek(),
            Some(Token::Word(word)) if word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword)
        )
    }

    /// Consume an unquoted, case-insensitive keyword if it is next.
    fn parse_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), PlannerError> {
        if self.parse_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect_end(&self) -> Result<(), PlannerError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(PlannerError::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: token.to_string(),
            }),
        }
    }

    fn parse_identifier(&mut self, what: &str) -> Result<String, PlannerError> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let value = word.value.clone();
                self.index += 1;
                Ok(value)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// `column` or `table.column`.
    fn parse_column_ref(&mut self) -> Result<ColumnRef, PlannerError> {
        let first = self.parse_identifier("column name")?;
        if self.consume(&Token::Period) {
            let column = self.parse_identifier("column name")?;
            Ok(ColumnRef::with_table(first, column))
        } else {
            Ok(ColumnRef::new(first))
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, PlannerError> {
        let negative = self.consume(&Token::Minus);
        if !negative {
            self.consume(&Token::Plus);
        }

        match self.next_token() {
            Some(Token::Number(digits, _)) => Ok(Literal::Number(if negative {
                format!("-{}", digits)
            } else {
                digits
            })),
            Some(Token::SingleQuotedString(s)) if !negative => Ok(Literal::Text(s)),
            Some(Token::DoubleQuotedString(s)) if !negative => Ok(Literal::Text(s)),
            // Double quoted values come out of the tokenizer as quoted words;
            // bare words are accepted as text as well.
            Some(Token::Word(word)) if !negative => Ok(Literal::Text(word.value)),
            Some(token) => {
                self.index -= 1;
                Err(PlannerError::UnexpectedToken {
                    expected: "literal value".to_string(),
                    found: token.to_string(),
                })
            }
            None => Err(PlannerError::UnexpectedEnd {
                expected: "literal value".to_string(),
            }),
        }
    }

    fn parse_row_id(&mut self) -> Result<RowId, PlannerError> {
        match self.parse_literal()? {
            Literal::Number(raw) => raw
                .parse::<RowId>()
                .map_err(|_| PlannerError::InvalidQuery(format!("invalid id '{}'", raw))),
            Literal::Text(raw) => Err(PlannerError::InvalidQuery(format!(
                "invalid id '{}'",
                raw
            ))),
        }
    }

    fn parse_comma_separated<T>(
        &mut self,
        mut parse: impl FnMut(&mut Self) -> Result<T, PlannerError>,
    ) -> Result<Vec<T>, PlannerError> {
        let mut items = vec![parse(self)?];
        while self.consume(&Token::Comma) {
            items.push(parse(self)?);
        }
        Ok(items)
    }

    fn parse_statement(&mut self) -> Result<LogicalPlan, PlannerError> {
        let command = match self.peek() {
            Some(Token::Word(word)) if word.quote_style.is_none() => word.value.to_ascii_uppercase(),
            Some(token) => return Err(PlannerError::UnsupportedStatement(token.to_string())),
            None => return Err(PlannerError::InvalidQuery("empty statement".to_string())),
        };
        self.index += 1;

        match command.as_str() {
            "CREATE" => self.parse_create_table(),
            "DROP" => self.parse_drop_table(),
            "INSERT" => self.parse_insert(),
            "SELECT" => self.parse_select(),
            "UPDATE" => self.parse_update(),
            "DELETE" => self.parse_delete(),
            _ => Err(PlannerError::UnsupportedStatement(command)),
        }
    }

    // CREATE TABLE <name> ( <col> <type> [UNIQUE], ... )
    fn parse_create_table(&mut self) -> Result<LogicalPlan, PlannerError> {
        self.expect_keyword("TABLE")?;
        let table_name = self.parse_identifier("table name")?;
        self.expect(&Token::LParen)?;
        let columns = self.parse_comma_separated(Self::parse_column_definition)?;
        self.expect(&Token::RParen)?;

        Ok(LogicalPlan::CreateTable(CreateTablePlan {
            table_name,
            columns,
        }))
    }

    fn parse_column_definition(&mut self) -> Result<ColumnDefinition, PlannerError> {
        let name = self.parse_identifier("column name")?;
        let type_name = self.parse_identifier("column type")?;
        let data_type = DataType::from_string(&type_name)
            .map_err(|_| PlannerError::UnsupportedDataType(type_name.clone()))?;

        // Length modifiers such as varchar(255) are accepted and ignored.
        if self.consume(&Token::LParen) {
            match self.next_token() {
                Some(Token::Number(_, _)) => {}
                _ => return Err(PlannerError::InvalidQuery(format!(
                    "invalid length modifier for column '{}'",
                    name
                ))),
            }
            self.expect(&Token::RParen)?;
        }

        let unique = self.parse_keyword("UNIQUE");
        Ok(ColumnDefinition {
            name,
            data_type,
            unique,
        })
    }

    // DROP TABLE <name>
    fn parse_drop_table(&mut self) -> Result<LogicalPlan, PlannerError> {
        self.expect_keyword("TABLE")?;
        let table_name = self.parse_identifier("table name")?;
        Ok(LogicalPlan::DropTable(DropTablePlan { table_name }))
    }

    // INSERT INTO <name> VALUES ( v1, v2, ... )
    fn parse_insert(&mut self) -> Result<LogicalPlan, PlannerError> {
        self.expect_keyword("INTO")?;
        let table_name = self.parse_identifier("table name")?;
        self.expect_keyword("VALUES")?;
        self.expect(&Token::LParen)?;
        let values = self.parse_comma_separated(Self::parse_literal)?;
        self.expect(&Token::RParen)?;

        Ok(LogicalPlan::Insert(InsertPlan { table_name, values }))
    }

    // SELECT <projection> FROM <name> [WHERE id = <n>]
    // SELECT <projection> FROM <t1> [INNER] JOIN <t2> ON <t1.c1> = <t2.c2>
    fn parse_select(&mut self) -> Result<LogicalPlan, PlannerError> {
        let projection = if self.consume(&Token::Mul) {
            Projection::All
        } else {
            let columns = self.parse_comma_separated(Self::parse_column_ref)?;
            Projection::Columns(columns.into_iter().map(|c| c.column).collect())
        };

        self.expect_keyword("FROM")?;
        let table_name = self.parse_identifier("table name")?;

        let inner = self.parse_keyword("INNER");
        if self.parse_keyword("JOIN") {
            let right_table = self.parse_identifier("table name")?;
            self.expect_keyword("ON")?;
            let left_column = self.parse_column_ref()?;
            self.expect(&Token::Eq)?;
            let right_column = self.parse_column_ref()?;
            if self.peek_keyword("WHERE") {
                return Err(PlannerError::UnsupportedPredicate(
                    "WHERE is not supported together with JOIN".to_string(),
                ));
            }
            return Ok(LogicalPlan::Join(JoinPlan {
                left_table: table_name,
                right_table,
                left_column,
                right_column,
            }));
        } else if inner {
            return Err(self.unexpected("JOIN"));
        }

        let predicate = if self.parse_keyword("WHERE") {
            Some(self.parse_id_predicate()?)
        } else {
            None
        };

        Ok(LogicalPlan::Select(SelectPlan {
            table_name,
            projection,
            predicate,
        }))
    }

    // UPDATE <name> SET c1 = v1 [, c2 = v2 ...] WHERE id = <n>
    fn parse_update(&mut self) -> Result<LogicalPlan, PlannerError> {
        let table_name = self.parse_identifier("table name")?;
        self.expect_keyword("SET")?;
        let assignments = self.parse_comma_separated(|stream| {
            let column = stream.parse_identifier("column name")?;
            stream.expect(&Token::Eq)?;
            let value = stream.parse_literal()?;
            Ok(Assignment { column, value })
        })?;
        self.expect_keyword("WHERE")?;
        let predicate = self.parse_id_predicate()?;

        Ok(LogicalPlan::Update(UpdatePlan {
            table_name,
            assignments,
            predicate,
        }))
    }

    // DELETE FROM <name> WHERE id = <n>
    fn parse_delete(&mut self) -> Result<LogicalPlan, PlannerError> {
        self.expect_keyword("FROM")?;
        let table_name = self.parse_identifier("table name")?;
        if !self.parse_keyword("WHERE") {
            return Err(PlannerError::UnsupportedPredicate(
                "only delete by id is supported".to_string(),
            ));
        }
        let predicate = self.parse_id_predicate()?;

        Ok(LogicalPlan::Delete(DeletePlan {
            table_name,
            predicate,
        }))
    }

    /// `id = <n>`; the column name matches case-insensitively.
    fn parse_id_predicate(&mut self) -> Result<Predicate, PlannerError> {
        let column = self.parse_column_ref()?;
        if !column.column.eq_ignore_ascii_case(PRIMARY_KEY_COLUMN) {
            return Err(PlannerError::UnsupportedPredicate(format!(
                "only equality on {} is supported, got '{}'",
                PRIMARY_KEY_COLUMN,
                column.qualified_name()
            )));
        }
        if !self.consume(&Token::Eq) {
            return Err(PlannerError::UnsupportedPredicate(format!(
                "only equality on {} is supported",
                PRIMARY_KEY_COLUMN
            )));
        }
        Ok(Predicate::IdEquals(self.parse_row_id()?))
    }
}
