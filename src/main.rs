//! Cellgrid - a small grid spreadsheet with a command-line front end.
//!
//! The binary is a thin transport layer over `cellgrid-core`: it turns
//! command lines into sheet operations and persists changed expressions
//! after each successful mutation.

use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};

use cellgrid_core::{CellId, ExprStore, JsonStore, MemStore, SheetDims, Spreadsheet};

fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    JSON store file for the sheet (created on demand)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a command and exit (can be repeated)");
    eprintln!("  --sheet <NAME>            Sheet name (default: sheet1)");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  a1=3+4       set cell a1");
    eprintln!("  a1=          remove cell a1");
    eprintln!("  a1?          query cell a1");
    eprintln!("  b1<a1        copy a1's expression into b1");
    eprintln!("  dump         list all non-empty cells");
    eprintln!("  clear        empty the whole sheet");
    eprintln!("  quit         leave interactive mode");
}

#[derive(Clone, Debug, PartialEq)]
enum Command {
    Set { cell: String, expr: String },
    Remove { cell: String },
    Query { cell: String },
    Copy { dest: String, src: String },
    Dump,
    Clear,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    match line {
        "dump" => return Ok(Command::Dump),
        "clear" => return Ok(Command::Clear),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    if let Some((cell, expr)) = line.split_once('=') {
        let cell = cell.trim().to_string();
        let expr = expr.trim().to_string();
        if cell.is_empty() {
            return Err("missing cell id before '='".to_string());
        }
        if expr.is_empty() {
            return Ok(Command::Remove { cell });
        }
        return Ok(Command::Set { cell, expr });
    }

    if let Some((dest, src)) = line.split_once('<') {
        return Ok(Command::Copy {
            dest: dest.trim().to_string(),
            src: src.trim().to_string(),
        });
    }

    if let Some(cell) = line.strip_suffix('?') {
        return Ok(Command::Query {
            cell: cell.trim().to_string(),
        });
    }

    Err(format!("unrecognized command: '{}'", line))
}

fn format_updates(updates: &std::collections::BTreeMap<CellId, f64>) -> String {
    updates
        .iter()
        .map(|(id, value)| format!("{} = {}", id, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_id(cell: &str) -> anyhow::Result<CellId> {
    CellId::parse(cell).with_context(|| format!("bad cell id: '{}'", cell))
}

/// Execute one command against the sheet, mirroring successful mutations
/// into the store. Returns the text to print, or None to quit.
fn run_command(
    sheet: &mut Spreadsheet,
    store: &mut dyn ExprStore,
    command: Command,
) -> anyhow::Result<Option<String>> {
    match command {
        Command::Set { cell, expr } => {
            let updates = sheet.set_cell(&cell, &expr)?;
            let committed = sheet.query_cell(&cell)?.expr;
            store.put(&parse_id(&cell)?, &committed)?;
            Ok(Some(format_updates(&updates)))
        }
        Command::Remove { cell } => {
            let updates = sheet.remove_cell(&cell)?;
            store.delete(&parse_id(&cell)?)?;
            Ok(Some(format_updates(&updates)))
        }
        Command::Copy { dest, src } => {
            let updates = sheet.copy_cell(&dest, &src)?;
            let committed = sheet.query_cell(&dest)?.expr;
            let dest_id = parse_id(&dest)?;
            if committed.is_empty() {
                store.delete(&dest_id)?;
            } else {
                store.put(&dest_id, &committed)?;
            }
            Ok(Some(format_updates(&updates)))
        }
        Command::Query { cell } => {
            let snap = sheet.query_cell(&cell)?;
            Ok(Some(format!("{}", snap.value)))
        }
        Command::Dump => {
            let lines: Vec<String> = sheet
                .dump()
                .into_iter()
                .map(|(id, expr, value)| format!("{}: {} = {}", id, expr, value))
                .collect();
            Ok(Some(lines.join("\n")))
        }
        Command::Clear => {
            sheet.clear();
            store.clear()?;
            Ok(Some(String::new()))
        }
        Command::Quit => Ok(None),
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut file_path: Option<PathBuf> = None;
    let mut commands: Vec<String> = Vec::new();
    let mut sheet_name = "sheet1".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    bail!("--command requires a value");
                }
                commands.push(args[i].clone());
            }
            "--sheet" => {
                i += 1;
                if i >= args.len() {
                    bail!("--sheet requires a value");
                }
                sheet_name = args[i].clone();
            }
            arg if arg.starts_with('-') => {
                print_usage();
                bail!("unknown option: {}", arg);
            }
            _ => {
                if file_path.is_none() {
                    file_path = Some(PathBuf::from(&args[i]));
                } else {
                    bail!("unexpected argument: {}", args[i]);
                }
            }
        }
        i += 1;
    }

    let mut store: Box<dyn ExprStore> = match &file_path {
        Some(path) => Box::new(
            JsonStore::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(MemStore::new()),
    };

    let mut sheet = Spreadsheet::new(sheet_name, SheetDims::default());
    sheet.load_from(store.as_ref())?;

    if !commands.is_empty() {
        for line in commands {
            let command = parse_command(&line).map_err(anyhow::Error::msg)?;
            if let Some(output) = run_command(&mut sheet, store.as_mut(), command)? {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
        }
        return Ok(());
    }

    // Interactive mode: one command per line.
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("Error: {}", message);
                continue;
            }
        };
        match run_command(&mut sheet, store.as_mut(), command) {
            Ok(Some(output)) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Ok(None) => break,
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_command};

    #[test]
    fn test_parse_set_command() {
        assert_eq!(
            parse_command("a1 = 3+4"),
            Ok(Command::Set {
                cell: "a1".to_string(),
                expr: "3+4".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_remove_command() {
        assert_eq!(
            parse_command("a1="),
            Ok(Command::Remove {
                cell: "a1".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_copy_command() {
        assert_eq!(
            parse_command("b1<a1"),
            Ok(Command::Copy {
                dest: "b1".to_string(),
                src: "a1".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_query_and_keywords() {
        assert_eq!(
            parse_command("a1?"),
            Ok(Command::Query {
                cell: "a1".to_string(),
            })
        );
        assert_eq!(parse_command("dump"), Ok(Command::Dump));
        assert_eq!(parse_command("clear"), Ok(Command::Clear));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_command("hello").is_err());
        assert!(parse_command("=3").is_err());
    }
}
