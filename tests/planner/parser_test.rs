use lumbung::{
    planner::{
        error::PlannerError,
        logical_plan::{
            Assignment, ColumnDefinition, ColumnRef, Literal, LogicalPlan, Predicate, Projection,
        },
        parser::SqlParser,
    },
    types::{
        error::{DatabaseError, ErrorKind},
        value::DataType,
    },
};

fn parse(sql: &str) -> LogicalPlan {
    SqlParser::new()
        .parse_sql(sql)
        .unwrap_or_else(|e| panic!("failed to parse {sql:?}: {e}"))
}

fn parse_err(sql: &str) -> PlannerError {
    match SqlParser::new().parse_sql(sql) {
        Ok(plan) => panic!("expected {sql:?} to fail, got {plan:?}"),
        Err(e) => e,
    }
}

#[test]
fn test_create_table() {
    let LogicalPlan::CreateTable(plan) =
        parse("CREATE TABLE users (id int, name varchar(64) UNIQUE, age INTEGER);")
    else {
        panic!("expected CREATE TABLE");
    };

    assert_eq!(plan.table_name, "users");
    assert_eq!(
        plan.columns,
        vec![
            ColumnDefinition {
                name: "id".into(),
                data_type: DataType::Integer,
                unique: false,
            },
            ColumnDefinition {
                name: "name".into(),
                data_type: DataType::Text,
                unique: true,
            },
            ColumnDefinition {
                name: "age".into(),
                data_type: DataType::Integer,
                unique: false,
            },
        ]
    );
}

#[test]
fn test_create_table_rejects_unknown_type() {
    assert!(matches!(
        parse_err("CREATE TABLE t (id int, price float)"),
        PlannerError::UnsupportedDataType(t) if t == "float"
    ));
    assert!(matches!(
        parse_err("CREATE TABLE t (id int"),
        PlannerError::UnexpectedEnd { .. }
    ));
}

#[test]
fn test_keywords_are_case_insensitive() {
    let LogicalPlan::DropTable(plan) = parse("drop table Users") else {
        panic!("expected DROP TABLE");
    };
    assert_eq!(plan.table_name, "Users");

    assert!(matches!(
        parse("sElEcT * fRoM t wHeRe ID = 3"),
        LogicalPlan::Select(plan) if plan.predicate == Some(Predicate::IdEquals(3))
    ));
}

#[test]
fn test_insert_literals() {
    let LogicalPlan::Insert(plan) =
        parse(r#"INSERT INTO users VALUES (001, 'John Smith', "quoted", -7, +8, bare)"#)
    else {
        panic!("expected INSERT");
    };

    assert_eq!(plan.table_name, "users");
    assert_eq!(
        plan.values,
        vec![
            Literal::Number("001".into()),
            Literal::Text("John Smith".into()),
            Literal::Text("quoted".into()),
            Literal::Number("-7".into()),
            Literal::Number("8".into()),
            Literal::Text("bare".into()),
        ]
    );
}

#[test]
fn test_insert_requires_values_clause() {
    assert!(matches!(
        parse_err("INSERT INTO users (1, 'a')"),
        PlannerError::UnexpectedToken { .. }
    ));
    assert!(matches!(
        parse_err("INSERT INTO users VALUES ()"),
        PlannerError::UnexpectedToken { .. }
    ));
}

#[test]
fn test_select_forms() {
    assert_eq!(
        parse("SELECT * FROM users"),
        LogicalPlan::Select(lumbung::planner::logical_plan::SelectPlan {
            table_name: "users".into(),
            projection: Projection::All,
            predicate: None,
        })
    );

    let LogicalPlan::Select(plan) = parse("SELECT name, users.age FROM users WHERE id = -2")
    else {
        panic!("expected SELECT");
    };
    assert_eq!(
        plan.projection,
        Projection::Columns(vec!["name".into(), "age".into()])
    );
    assert_eq!(plan.predicate, Some(Predicate::IdEquals(-2)));
}

#[test]
fn test_select_only_filters_on_id() {
    assert!(matches!(
        parse_err("SELECT * FROM users WHERE name = 'x'"),
        PlannerError::UnsupportedPredicate(_)
    ));
    assert!(matches!(
        parse_err("SELECT * FROM users WHERE id > 3"),
        PlannerError::UnsupportedPredicate(_)
    ));
    assert!(matches!(
        parse_err("SELECT * FROM users WHERE id = 'abc'"),
        PlannerError::InvalidQuery(_)
    ));
    assert!(matches!(
        parse_err("SELECT * FROM users WHERE id = 99999999999"),
        PlannerError::InvalidQuery(_)
    ));
}

#[test]
fn test_join() {
    let LogicalPlan::Join(plan) =
        parse("SELECT * FROM orders INNER JOIN users ON orders.user_id = users.id")
    else {
        panic!("expected JOIN");
    };
    assert_eq!(plan.left_table, "orders");
    assert_eq!(plan.right_table, "users");
    assert_eq!(plan.left_column, ColumnRef::with_table("orders", "user_id"));
    assert_eq!(plan.right_column, ColumnRef::with_table("users", "id"));

    let LogicalPlan::Join(plan) = parse("select * from a join b on b.x = y") else {
        panic!("expected JOIN");
    };
    assert_eq!(plan.left_column, ColumnRef::with_table("b", "x"));
    assert_eq!(plan.right_column, ColumnRef::new("y"));
}

#[test]
fn test_join_rejects_where_and_dangling_inner() {
    assert!(matches!(
        parse_err("SELECT * FROM a JOIN b ON a.id = b.id WHERE id = 1"),
        PlannerError::UnsupportedPredicate(_)
    ));
    assert!(matches!(
        parse_err("SELECT * FROM a INNER b"),
        PlannerError::UnexpectedToken { .. }
    ));
}

#[test]
fn test_update() {
    let LogicalPlan::Update(plan) =
        parse("UPDATE users SET name = 'Jane', age = 31 WHERE id = 1")
    else {
        panic!("expected UPDATE");
    };
    assert_eq!(plan.table_name, "users");
    assert_eq!(
        plan.assignments,
        vec![
            Assignment {
                column: "name".into(),
                value: Literal::Text("Jane".into()),
            },
            Assignment {
                column: "age".into(),
                value: Literal::Number("31".into()),
            },
        ]
    );
    assert_eq!(plan.predicate, Predicate::IdEquals(1));

    assert!(matches!(
        parse_err("UPDATE users SET name = 'Jane'"),
        PlannerError::UnexpectedEnd { .. }
    ));
}

#[test]
fn test_delete() {
    let LogicalPlan::Delete(plan) = parse("DELETE FROM users WHERE id = 5;") else {
        panic!("expected DELETE");
    };
    assert_eq!(plan.table_name, "users");
    assert_eq!(plan.predicate, Predicate::IdEquals(5));

    assert!(matches!(
        parse_err("DELETE FROM users"),
        PlannerError::UnsupportedPredicate(_)
    ));
}

#[test]
fn test_rejects_unknown_and_trailing_input() {
    assert!(matches!(
        parse_err("TRUNCATE users"),
        PlannerError::UnsupportedStatement(cmd) if cmd == "TRUNCATE"
    ));
    assert!(matches!(parse_err(""), PlannerError::InvalidQuery(_)));
    assert!(matches!(parse_err("   "), PlannerError::InvalidQuery(_)));
    assert!(matches!(
        parse_err("DROP TABLE a b"),
        PlannerError::UnexpectedToken { .. }
    ));
    assert!(matches!(
        parse_err("SELECT * FROM t WHERE id = 'unterminated"),
        PlannerError::Tokenizer(_)
    ));
}

#[test]
fn test_planner_errors_are_syntax_errors() {
    let err: DatabaseError = parse_err("SELECT FROM").into();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
    assert!(err.to_string().starts_with("Syntax error:"));
}
