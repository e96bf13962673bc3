//! sqlstash - CLI Client

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sqlstash::storage::Row;
use sqlstash::{QueryResult, Session, SessionConfig};

const PRIMARY_PROMPT: &str = "sqlstash> ";
const CONTINUATION_PROMPT: &str = "       -> ";

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
 sqlstash - an in-memory SQL engine
 Type '.help' for help, '.quit' to exit
"#
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit sqlstash
  .dump              Print all databases as JSON
  .save <file>       Write all databases to a JSON file
  .log               Show the statements run so far

Statements end with ';' or '\g':
  CREATE DATABASE shop;
  USE shop;
  CREATE TABLE user (id INT(10), name VARCHAR(10));
  INSERT INTO user (id, name) VALUES (1, 'Jack'), (2, 'John');
  SELECT * FROM user WHERE id > 1 ORDER BY id DESC LIMIT 5;
  UPDATE user SET name = 'Jim' WHERE id = 2;
  DELETE FROM user WHERE id >= 2;
  SHOW DATABASES; SHOW TABLES; DESCRIBE user;
"#
    );
}

/// Format query results as a table
fn format_results(columns: &[String], rows: &[Row]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, column) in columns.iter().enumerate() {
            widths[i] = widths[i].max(row.get(column).to_string().chars().count());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();

    // Header
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:<width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    // Rows
    for row in rows {
        let line: String = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {:<width$} ", row.get(c).to_string(), width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", line));
    }

    if !rows.is_empty() {
        output.push_str(&separator);
    }

    output
}

fn seconds(elapsed: Duration) -> String {
    format!("{:.2} sec", elapsed.as_secs_f64())
}

fn print_result(result: &QueryResult) {
    match result {
        QueryResult::Rows {
            columns,
            rows,
            elapsed,
        } => {
            if rows.is_empty() {
                println!("Empty set ({})", seconds(*elapsed));
            } else {
                print!("{}", format_results(columns, rows));
                println!("{} rows in set ({})", rows.len(), seconds(*elapsed));
            }
        }
        QueryResult::Ok {
            affected_rows,
            elapsed,
        } => {
            println!(
                "Query OK, {} rows affected ({})",
                affected_rows,
                seconds(*elapsed)
            );
        }
    }
}

/// Execute every statement in the buffered input
fn execute_input(session: &mut Session, input: &str) {
    for result in session.execute_batch(input) {
        match result {
            Ok(result) => print_result(&result),
            Err(e) => eprintln!("ERROR {}: {}", e.code(), e),
        }
    }
}

/// Handle special dot commands. Returns false when the shell should exit.
fn handle_special_command(cmd: &str, session: &Session) -> bool {
    match cmd.split_whitespace().next() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => return false,
        Some(".dump") => match session.export_json() {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR {}: {}", e.code(), e),
        },
        Some(".save") => match (cmd.split_whitespace().nth(1), session.catalog()) {
            (Some(path), Some(catalog)) => match catalog.save_to_file(path) {
                Ok(()) => println!("Saved to {}", path),
                Err(e) => eprintln!("ERROR {}: {}", e.code(), e),
            },
            (None, _) => eprintln!("Usage: .save <file>"),
            (_, None) => eprintln!("Nothing to save"),
        },
        Some(".log") => {
            for entry in session.query_log() {
                println!("{}", entry.query);
            }
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

/// Check whether buffered input ends with a statement terminator
fn is_complete(buffer: &str) -> bool {
    let trimmed = buffer.trim_end();
    trimmed.ends_with(';') || trimmed.ends_with("\\g")
}

/// Main REPL loop
fn run_repl(session: &mut Session) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;
    let mut buffer = String::new();

    print_banner();

    loop {
        let prompt = if buffer.is_empty() {
            PRIMARY_PROMPT
        } else {
            CONTINUATION_PROMPT
        };

        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        editor.add_history_entry(trimmed).ok();

        if buffer.is_empty() {
            if trimmed.starts_with('.') {
                if !handle_special_command(trimmed, session) {
                    break;
                }
                continue;
            }
            if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                break;
            }
        }

        buffer.push_str(&line);
        buffer.push('\n');

        if is_complete(&buffer) {
            execute_input(session, &buffer);
            buffer.clear();
        }
    }

    println!("Bye");
    Ok(())
}

/// Interactive shell for the sqlstash engine
#[derive(Parser, Debug)]
#[command(name = "sqlstash-cli")]
#[command(version, about = "Interactive shell for the sqlstash in-memory SQL engine")]
struct Cli {
    /// Load databases from a JSON dump instead of starting empty
    #[arg(short, long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Database to select on startup
    #[arg(short, long, value_name = "NAME")]
    database: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let mut session = match &cli.import {
        Some(path) => {
            let mut session = Session::with_config(SessionConfig::new().create_storage(false))?;
            session
                .import_file(path)
                .with_context(|| format!("failed to import '{}'", path.display()))?;
            if let Some(db) = &cli.database {
                session.execute(&format!("USE {}", db))?;
            }
            session
        }
        None => {
            let mut config = SessionConfig::new();
            if let Some(db) = &cli.database {
                config = config.default_database(db.as_str());
            }
            Session::with_config(config)?
        }
    };

    run_repl(&mut session)
}
