use lumbung::{
    executor::QueryResult,
    types::error::{DatabaseError, ErrorKind},
    utils::mock::TempDatabase,
};

fn shop(prefix: &str) -> TempDatabase {
    let temp_db = TempDatabase::with_prefix(prefix);
    temp_db.run_all(&[
        "CREATE TABLE users (id int, name text)",
        "CREATE TABLE orders (id int, user_id int, item text)",
        "INSERT INTO users VALUES (1, 'Alice')",
        "INSERT INTO users VALUES (2, 'Bob')",
        "INSERT INTO orders VALUES (101, 1, 'Laptop')",
        "INSERT INTO orders VALUES (102, 1, 'Mouse')",
        "INSERT INTO orders VALUES (103, 7, 'Desk')",
    ]);
    temp_db
}

#[test]
fn test_join_renders_matching_pairs() {
    let temp_db = shop("join_render");
    let out = temp_db
        .database
        .execute_sql("SELECT * FROM orders JOIN users ON orders.user_id = users.id");

    assert_eq!(
        out,
        "--- JOIN RESULT (orders + users) ---\n\
         101 | 1, Laptop <-> Alice\n\
         102 | 1, Mouse <-> Alice"
    );
}

#[test]
fn test_join_condition_in_either_order() -> Result<(), DatabaseError> {
    let temp_db = shop("join_either_order");
    let db = &temp_db.database;

    let forward = db.execute("SELECT * FROM orders INNER JOIN users ON orders.user_id = users.id")?;
    let reversed = db.execute("SELECT * FROM orders JOIN users ON users.id = orders.user_id")?;
    assert_eq!(forward, reversed);

    let QueryResult::Join(join) = forward else {
        panic!("expected a join result");
    };
    assert_eq!(join.matches.len(), 2);
    assert!(join.matches.iter().all(|m| m.right.id == 1));
    assert_eq!(
        join.matches.iter().map(|m| m.left.id).collect::<Vec<_>>(),
        vec![101, 102]
    );
    Ok(())
}

#[test]
fn test_join_from_the_other_side() {
    let temp_db = shop("join_other_side");
    let out = temp_db
        .database
        .execute_sql("SELECT * FROM users JOIN orders ON users.id = orders.user_id");

    assert_eq!(
        out,
        "--- JOIN RESULT (users + orders) ---\n\
         1 | Alice <-> 1, Laptop\n\
         1 | Alice <-> 1, Mouse"
    );
}

#[test]
fn test_join_without_matches_prints_header_only() {
    let temp_db = shop("join_no_match");
    temp_db.run_all(&["DELETE FROM users WHERE id = 1"]);

    let out = temp_db
        .database
        .execute_sql("SELECT * FROM orders JOIN users ON orders.user_id = users.id");
    assert_eq!(out, "--- JOIN RESULT (orders + users) ---");
}

#[test]
fn test_join_sees_updates() {
    let temp_db = shop("join_updates");
    temp_db.run_all(&[
        "UPDATE orders SET user_id = 2 WHERE id = 103",
        "UPDATE users SET name = 'Robert' WHERE id = 2",
    ]);

    let out = temp_db
        .database
        .execute_sql("SELECT * FROM orders JOIN users ON orders.user_id = users.id");
    assert_eq!(
        out,
        "--- JOIN RESULT (orders + users) ---\n\
         101 | 1, Laptop <-> Alice\n\
         102 | 1, Mouse <-> Alice\n\
         103 | 2, Desk <-> Robert"
    );
}

#[test]
fn test_join_matches_text_against_integers_by_string_form() {
    let temp_db = TempDatabase::with_prefix("join_text_int");
    temp_db.run_all(&[
        "CREATE TABLE codes (id int, code text)",
        "CREATE TABLE items (id int, label text)",
        "INSERT INTO codes VALUES (1, '42')",
        "INSERT INTO items VALUES (42, 'answer')",
    ]);

    let out = temp_db
        .database
        .execute_sql("SELECT * FROM codes JOIN items ON codes.code = items.id");
    assert_eq!(
        out,
        "--- JOIN RESULT (codes + items) ---\n1 | 42 <-> answer"
    );
}

#[test]
fn test_join_errors() {
    let temp_db = shop("join_errors");
    let db = &temp_db.database;

    let cases = [
        (
            "SELECT * FROM orders JOIN users ON user_id = users.id",
            ErrorKind::SyntaxError,
        ),
        (
            "SELECT * FROM orders JOIN users ON orders.buyer = users.id",
            ErrorKind::SyntaxError,
        ),
        (
            "SELECT * FROM orders JOIN users ON orders.user_id = payments.id",
            ErrorKind::SyntaxError,
        ),
        (
            "SELECT * FROM orders JOIN payments ON orders.user_id = payments.id",
            ErrorKind::NotFound,
        ),
    ];
    for (sql, kind) in cases {
        assert_eq!(db.execute(sql).unwrap_err().kind(), kind, "{sql}");
    }
}
