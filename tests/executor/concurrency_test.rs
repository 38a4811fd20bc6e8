use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use lumbung::{
    types::error::{DatabaseError, ErrorKind},
    utils::mock::TempDatabase,
};

#[test]
fn test_update_never_hides_the_row() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("conc_update_visibility");
    temp_db.run_all(&[
        "CREATE TABLE counters (id int, value int)",
        "INSERT INTO counters VALUES (1, 0)",
    ]);
    let table = temp_db.database.table("counters")?;
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        let writer = s.spawn(|| {
            for i in 1..=200 {
                temp_db
                    .database
                    .execute(&format!("UPDATE counters SET value = {i} WHERE id = 1"))
                    .unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        for _ in 0..2 {
            s.spawn(|| {
                while !done.load(Ordering::SeqCst) {
                    let row = table.select_by_id(1).unwrap();
                    assert!(row.is_some(), "row vanished during update");
                    assert_eq!(table.select_all().unwrap().len(), 1);
                }
            });
        }

        writer.join().unwrap();
    });

    assert_eq!(
        temp_db.database.execute_sql("SELECT value FROM counters WHERE id = 1"),
        r#"{"value":200}"#
    );
    Ok(())
}

#[test]
fn test_parallel_inserts_keep_every_row() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("conc_parallel_inserts");
    temp_db.run_all(&["CREATE TABLE events (id int, source text)"]);

    thread::scope(|s| {
        for worker in 0..4 {
            let db = &temp_db.database;
            s.spawn(move || {
                for n in 0..50 {
                    let id = worker * 1000 + n;
                    db.execute(&format!("INSERT INTO events VALUES ({id}, 'w{worker}')"))
                        .unwrap();
                }
            });
        }
    });

    let table = temp_db.database.table("events")?;
    assert_eq!(table.row_count(), 200);
    assert_eq!(table.select_all()?.len(), 200);

    // Same state after a rebuild from the file alone.
    table.rebuild_index()?;
    assert_eq!(table.row_count(), 200);
    assert!(table.select_by_id(3049)?.is_some());
    Ok(())
}

#[test]
fn test_racing_inserts_of_one_id_admit_exactly_one() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("conc_same_id");
    temp_db.run_all(&["CREATE TABLE slots (id int, owner text UNIQUE)"]);

    let outcomes: Vec<Result<(), ErrorKind>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let db = &temp_db.database;
                s.spawn(move || {
                    db.execute(&format!("INSERT INTO slots VALUES (1, 'w{worker}')"))
                        .map(|_| ())
                        .map_err(|e| e.kind())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter_map(|o| o.err())
        .all(|kind| kind == ErrorKind::DuplicateKey));
    assert_eq!(temp_db.database.table("slots")?.row_count(), 1);
    Ok(())
}

#[test]
fn test_tables_are_independent_under_load() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("conc_tables");
    let names = ["alpha", "beta", "gamma"];
    for name in names {
        temp_db.run_all(&[format!("CREATE TABLE {name} (id int, payload text)").as_str()]);
    }

    thread::scope(|s| {
        for name in names {
            let db = &temp_db.database;
            s.spawn(move || {
                for id in 0..40 {
                    db.execute(&format!("INSERT INTO {name} VALUES ({id}, '{name}')"))
                        .unwrap();
                    if id % 2 == 0 {
                        db.execute(&format!("DELETE FROM {name} WHERE id = {id}"))
                            .unwrap();
                    }
                }
            });
        }
    });

    for name in names {
        let rows = temp_db.database.list_rows(name)?;
        assert_eq!(rows.len(), 20, "{name}");
        assert!(rows.iter().all(|row| row["payload"] == name));
    }
    Ok(())
}

#[test]
fn test_create_and_drop_race_leaves_consistent_state() {
    let temp_db = TempDatabase::with_prefix("conc_ddl");

    thread::scope(|s| {
        for _ in 0..4 {
            let db = &temp_db.database;
            s.spawn(move || {
                for _ in 0..25 {
                    let _ = db.execute("CREATE TABLE t (id int)");
                    let _ = db.execute("DROP TABLE t");
                }
            });
        }
    });

    let exists = temp_db.database.table_exists("t");
    assert_eq!(exists, temp_db.table_path("t").exists());
}
