/// Banner printed when the REPL starts.
pub fn welcome_message(name: &str) -> String {
    let rule = "=".repeat(name.len() + 8);
    format!(
        "{rule}\n    {name}\n{rule}\nType 'help' for commands. Try: CREATE TABLE users (id int, username text UNIQUE, age int)\n"
    )
}
