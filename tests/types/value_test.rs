use lumbung::types::{
    error::ErrorKind,
    value::{DataType, Value},
};

#[test]
fn test_integer_literal_coercion() {
    assert_eq!(
        Value::from_string("42", &DataType::Integer).unwrap(),
        Value::Integer(42)
    );
    assert_eq!(
        Value::from_string("-7", &DataType::Integer).unwrap(),
        Value::Integer(-7)
    );
    assert_eq!(
        Value::from_string("001", &DataType::Integer).unwrap(),
        Value::Integer(1)
    );
}

#[test]
fn test_malformed_integer_is_rejected_not_zeroed() {
    let err = Value::from_string("abc", &DataType::Integer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);

    let err = Value::from_string("1.5", &DataType::Integer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_integer_overflow_is_rejected() {
    let err = Value::from_string("3000000000", &DataType::Integer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_text_literal_is_kept_verbatim() {
    assert_eq!(
        Value::from_string("John Doe", &DataType::Text).unwrap(),
        Value::Text("John Doe".to_string())
    );
    assert_eq!(
        Value::from_string("25", &DataType::Text).unwrap(),
        Value::Text("25".to_string())
    );
}

#[test]
fn test_data_type_names() {
    assert_eq!(DataType::from_string("int").unwrap(), DataType::Integer);
    assert_eq!(DataType::from_string("INTEGER").unwrap(), DataType::Integer);
    assert_eq!(DataType::from_string("Text").unwrap(), DataType::Text);
    assert_eq!(DataType::from_string("varchar").unwrap(), DataType::Text);
    assert!(DataType::from_string("float").is_err());
    assert!(DataType::from_string("boolean").is_err());
}

#[test]
fn test_stringified_form() {
    assert_eq!(Value::Integer(-12).to_string(), "-12");
    assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
}

#[test]
fn test_json_shape_is_untagged() {
    assert_eq!(serde_json::to_string(&Value::Integer(1)).unwrap(), "1");
    assert_eq!(
        serde_json::to_string(&Value::Text("John".to_string())).unwrap(),
        "\"John\""
    );
}

#[test]
fn test_serialized_size() {
    assert_eq!(Value::Integer(5).serialized_size(), 4);
    assert_eq!(Value::Text("abc".to_string()).serialized_size(), 7);
    assert_eq!(Value::Text("é".to_string()).serialized_size(), 6);
}
