use std::env;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use minidb::error::{Error, Result};
use minidb::sql::engine::Database;

const PROMPT: &str = "db> ";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minidb=warn")),
        )
        .with_target(false)
        .init();

    // Data directory comes from the first argument; "data" by default
    let dir = env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let db = Database::open(&dir)?;
    let mut session = db.session();

    let mut rl = DefaultEditor::new().map_err(|e| Error::Internal(e.to_string()))?;
    println!("Mini RDBMS Shell\nType 'exit' to quit.\n");

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line == "exit" {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                println!("{}", session.query(&line));
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(Error::Internal(err.to_string())),
        }
    }
    Ok(())
}
