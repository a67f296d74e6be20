//! sheetcalc - line-oriented command-line driver for the sheetcalc engine.
//!
//! Reads commands from stdin (or a single command passed with `-c`) and
//! applies them to an in-memory `Sheet`:
//!
//!   SET <pos> <text>   set a cell's content (formulas start with '=')
//!   GET <pos>          print a cell's computed value
//!   CLEAR <pos>        remove a cell's content
//!   PRINT VALUES       print the printable rectangle's computed values
//!   PRINT TEXTS        print the printable rectangle's literal text
//!   QUIT               exit

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use sheetcalc_core::{Position, Sheet, SheetConfig, create_sheet};

fn print_usage() {
    eprintln!("Usage: sheetcalc [-c COMMAND] [-h|--help]");
    eprintln!();
    eprintln!("With no -c, reads commands from stdin until QUIT or EOF.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  SET <pos> <text>   set a cell's content");
    eprintln!("  GET <pos>          print a cell's computed value");
    eprintln!("  CLEAR <pos>        remove a cell's content");
    eprintln!("  PRINT VALUES       print the sheet's computed values");
    eprintln!("  PRINT TEXTS        print the sheet's literal text");
    eprintln!("  QUIT               exit");
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mut command: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-c" | "--command" => {
                i += 1;
                match args.get(i) {
                    Some(c) => command = Some(c.clone()),
                    None => {
                        eprintln!("Error: -c requires a command string");
                        return ExitCode::FAILURE;
                    }
                }
            }
            other => {
                eprintln!("Error: unknown argument: {other}");
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let mut sheet = create_sheet(&SheetConfig::load_or_default());
    let stdout = io::stdout();

    if let Some(command) = command {
        match run_line(&mut sheet, &command, &mut stdout.lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        }
    } else {
        run_repl(&mut sheet)
    }
}

fn run_repl(sheet: &mut Sheet) -> ExitCode {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(err) => {
                eprintln!("Error reading input: {err}");
                return ExitCode::FAILURE;
            }
        };
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = run_line(sheet, &line, &mut out) {
            eprintln!("Error: {err}");
        }
    }
    ExitCode::SUCCESS
}

/// Parses and applies one command line, writing any output to `out`.
fn run_line(sheet: &mut Sheet, line: &str, out: &mut impl Write) -> Result<()> {
    let line = line.trim();
    let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match keyword.to_ascii_uppercase().as_str() {
        "SET" => {
            let (pos_str, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("SET requires a position and text"))?;
            let pos = parse_position(pos_str)?;
            sheet.set_cell(pos, text.trim())?;
            Ok(())
        }
        "GET" => {
            let pos = parse_position(rest)?;
            let value = sheet
                .cell_value(pos)
                .unwrap_or_else(|| sheetcalc_core::Value::Text(String::new()));
            writeln!(out, "{value}").context("writing command output")?;
            Ok(())
        }
        "CLEAR" => {
            let pos = parse_position(rest)?;
            sheet.clear_cell(pos)?;
            Ok(())
        }
        "PRINT" => match rest.to_ascii_uppercase().as_str() {
            "VALUES" => {
                write!(out, "{}", sheet.print_values()).context("writing command output")?;
                Ok(())
            }
            "TEXTS" => {
                write!(out, "{}", sheet.print_texts()).context("writing command output")?;
                Ok(())
            }
            other => Err(anyhow!("unknown PRINT target: {other}")),
        },
        other => Err(anyhow!("unknown command: {other}")),
    }
}

fn parse_position(s: &str) -> Result<Position> {
    let pos = Position::from_string(s);
    if pos.is_valid() {
        Ok(pos)
    } else {
        Err(anyhow!("invalid cell position: {s}"))
    }
}
