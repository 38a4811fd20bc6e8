use crate::types::{RowId, value::DataType};

/// One parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    CreateTable(CreateTablePlan),
    DropTable(DropTablePlan),
    Insert(InsertPlan),
    Select(SelectPlan),
    Join(JoinPlan),
    Update(UpdatePlan),
    Delete(DeletePlan),
}

impl LogicalPlan {
    /// Statement keyword, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            LogicalPlan::CreateTable(_) => "CREATE",
            LogicalPlan::DropTable(_) => "DROP",
            LogicalPlan::Insert(_) => "INSERT",
            LogicalPlan::Select(_) | LogicalPlan::Join(_) => "SELECT",
            LogicalPlan::Update(_) => "UPDATE",
            LogicalPlan::Delete(_) => "DELETE",
        }
    }
}

/// A literal as written, coerced against the column type at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Number(String),
    Text(String),
}

impl Literal {
    pub fn raw(&self) -> &str {
        match self {
            Literal::Number(s) | Literal::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn with_table(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

/// The only supported filter: equality on the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    IdEquals(RowId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTablePlan {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTablePlan {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub table_name: String,
    pub values: Vec<Literal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub table_name: String,
    pub projection: Projection,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    pub left_table: String,
    pub right_table: String,
    pub left_column: ColumnRef,
    pub right_column: ColumnRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletePlan {
    pub table_name: String,
    pub predicate: Predicate,
}
