use std::io::Write;

use lumbung::{
    DatabaseConfig, DatabaseManager, QueryResult, art::welcome_message, storage::database::Database,
};
use rustyline::{DefaultEditor, Result, error::ReadlineError};
use tracing_subscriber::EnvFilter;

const HISTORY_FILE: &str = ".lumbung_history";

fn read_multiline_command(rl: &mut DefaultEditor) -> Result<String> {
    let mut input = String::new();
    let mut prompt = "lumbung> ".to_string();

    loop {
        let line = rl.readline(&prompt)?;
        let trimmed_line = line.trim_end();

        // A trailing backslash continues the statement on the next line
        if let Some(continued) = trimmed_line.strip_suffix('\\') {
            input.push_str(continued);
            input.push(' ');
            prompt = "      -> ".to_string();
        } else {
            input.push_str(trimmed_line);
            break;
        }
    }

    Ok(input)
}

fn process_command(database: &Database, command: &str) -> bool {
    let cmd = command.trim();

    match cmd.to_lowercase().as_str() {
        "exit" | "quit" | "q" => {
            println!("Goodbye!");
            return false;
        }
        "help" | "h" => {
            println!(
                r#"
Available commands:
  help, h          - Show this help message
  clear            - Clear the screen
  tables           - List tables
  exit, quit, q    - Exit

Statements:
  CREATE TABLE t (id int, name text UNIQUE, age int)
  DROP TABLE t
  INSERT INTO t VALUES (1, "Alice", 30)
  SELECT * FROM t [WHERE id=1]
  SELECT * FROM t1 JOIN t2 ON t1.col = t2.col
  UPDATE t SET name="Bob", age=31 WHERE id=1
  DELETE FROM t WHERE id=1

Use '\' at the end of a line for multiline input.
"#
            );
        }
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
            let _ = std::io::stdout().flush();
        }
        "tables" => println!("{}", QueryResult::Names(database.table_names())),
        "" => {}
        _ => println!("{}", database.execute_sql(cmd)),
    }

    true
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(data_dir) => DatabaseConfig::new(data_dir),
        None => DatabaseConfig::default(),
    };

    println!("{}", welcome_message("LUMBUNG DB"));

    let manager = DatabaseManager::new(config);
    let database = manager.create_database("default");

    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match read_multiline_command(&mut rl) {
            Ok(input) => {
                let command = input.trim().to_string();

                if !command.is_empty() {
                    rl.add_history_entry(&command)?;
                    if !process_command(&database, &command) {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
