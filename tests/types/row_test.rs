use lumbung::{
    storage::schema::{TableSchema, TableSchemaBuilder},
    types::{error::ErrorKind, row::Row, value::{DataType, Value}},
};

fn users_schema() -> TableSchema {
    TableSchemaBuilder::new("users")
        .add_column("id", DataType::Integer)
        .add_column("username", DataType::Text)
        .add_column("age", DataType::Integer)
        .build()
        .unwrap()
}

#[test]
fn test_from_values_takes_key_from_id_column() {
    let schema = users_schema();
    let row = Row::from_values(
        &schema,
        vec![Value::Integer(9), "Zed".into(), Value::Integer(40)],
    )
    .unwrap();

    assert_eq!(row.id, 9);
    assert_eq!(row.get(&schema, "id"), Some(&Value::Integer(9)));
    assert_eq!(row.get(&schema, "username"), Some(&Value::Text("Zed".to_string())));
}

#[test]
fn test_from_values_rejects_wrong_types() {
    let schema = users_schema();
    let err = Row::from_values(
        &schema,
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_from_values_rejects_wrong_arity() {
    let schema = users_schema();
    let err = Row::from_values(&schema, vec![Value::Integer(1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_json_keys_follow_schema_order() {
    let schema = users_schema();
    let row = Row::new(
        1,
        vec![Value::Integer(1), "John".into(), Value::Integer(25)],
    );

    let json = serde_json::to_string(&row.to_json(&schema)).unwrap();
    assert_eq!(json, r#"{"id":1,"username":"John","age":25}"#);
}

#[test]
fn test_json_projection() {
    let schema = users_schema();
    let row = Row::new(
        1,
        vec![Value::Integer(1), "John".into(), Value::Integer(25)],
    );

    let json = serde_json::to_string(&row.to_json_projected(&schema, &[2, 1])).unwrap();
    assert_eq!(json, r#"{"age":25,"username":"John"}"#);
}

#[test]
fn test_non_key_values_skip_id() {
    let schema = TableSchemaBuilder::new("t")
        .add_column("name", DataType::Text)
        .add_column("id", DataType::Integer)
        .add_column("score", DataType::Integer)
        .build()
        .unwrap();
    let row = Row::new(3, vec!["x".into(), Value::Integer(3), Value::Integer(10)]);

    let rest: Vec<&Value> = row.non_key_values(&schema).collect();
    assert_eq!(rest, vec![&Value::Text("x".to_string()), &Value::Integer(10)]);
}

#[test]
fn test_set_value_bounds() {
    let mut row = Row::new(1, vec![Value::Integer(1)]);
    assert!(row.set_value(0, Value::Integer(2)).is_ok());
    assert!(row.set_value(5, Value::Integer(2)).is_err());
}
