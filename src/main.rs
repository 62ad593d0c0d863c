use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use loxwalk::ast_printer::AstPrinter;
use loxwalk::error::LoxError;
use loxwalk::session::{self, Session};

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token instead of the plain format
        #[arg(long)]
        json: bool,
    },

    /// Parses a file as a program and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt; globals persist between lines
    Repl,
}

/// Reads a source file through a read‑only memory map.
///
/// Failures surface as [`LoxError::Io`] or [`LoxError::Utf8`] so the driver
/// exits with their sysexits code.
fn read_file(filename: &Path) -> loxwalk::error::Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).inspect_err(|e| debug!("Failed to open {:?}: {}", filename, e))?;

    if file.metadata()?.len() == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read-only and dropped before this function returns;
    // the bytes are copied out immediately.
    let mmap = unsafe { Mmap::map(&file) }?;
    let text: String = String::from_utf8(mmap.to_vec())?;

    info!("Read {} bytes from {:?}", text.len(), filename);

    Ok(text)
}

/// Loads `filename` or exits through [`fail`].
fn load(filename: &Path) -> String {
    read_file(filename).unwrap_or_else(|e| {
        eprintln!("Failed to read {}", filename.display());
        fail(e)
    })
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // `[module:line] - message`, RUST_LOG may narrow the default Debug filter.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("loxwalk::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Prints a driver error and exits with its sysexits code.
fn fail(error: LoxError) -> ! {
    debug!("Exiting after error: {:?}", error);
    eprintln!("{}", error);
    std::process::exit(error.exit_code());
}

fn repl() -> Result<()> {
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        line.clear();
        if stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?
            == 0
        {
            println!();
            break;
        }

        // Errors end the line, not the session.
        if let Err(e) = session.run(&line) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let source: String = load(&filename);
            let (tokens, errors) = session::tokenize(&source);

            for error in &errors {
                eprintln!("{}", error);
            }

            for token in &tokens {
                if json {
                    println!("{}", serde_json::to_string(token)?);
                } else {
                    println!("{}", token);
                }
            }

            if !errors.is_empty() {
                std::process::exit(65);
            }
        }

        Commands::Parse { filename } => {
            let source: String = load(&filename);

            match session::parse_program(&source) {
                Ok(statements) => println!("{}", AstPrinter::print_program(&statements)),
                Err(e) => fail(e),
            }
        }

        Commands::Evaluate { filename } => {
            let source: String = load(&filename);
            let mut session = Session::new();

            match session.evaluate(&source) {
                Ok(value) => println!("{}", value),
                Err(e) => fail(e),
            }
        }

        Commands::Run { filename } => {
            let source: String = load(&filename);
            let mut session = Session::new();

            if let Err(e) = session.run(&source) {
                fail(e);
            }

            info!("Program executed successfully");
        }

        Commands::Repl => repl()?,
    }

    Ok(())
}
