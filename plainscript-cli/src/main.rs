//! Entrypoint for CLI
use std::{error::Error, fs, io, path::PathBuf, process};

use clap::Parser;
use log::{error, info, LevelFilter};
use plainscript::{compile_str, CompileOptions};

// FreeBSD sysexits
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_NOINPUT: i32 = 66;

/// Compile a PlainScript file to JavaScript.
#[derive(Parser, Debug)]
#[command(name = "plainscript")]
#[command(version)]
struct Cli {
    /// Stop after parsing and print the syntax tree
    #[arg(short = 'a', long = "ast")]
    ast_only: bool,

    /// Stop after analysis and print the decorated syntax tree
    #[arg(short = 'i', long = "analyze")]
    analyze_only: bool,

    /// Simplify the program before generating code
    #[arg(short = 'o', long)]
    optimize: bool,

    /// Source file to compile
    file: PathBuf,
}

impl Cli {
    fn options(&self) -> CompileOptions {
        CompileOptions {
            ast_only: self.ast_only,
            analyze_only: self.analyze_only,
            optimize: self.optimize,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Stdout only carries compiler output.
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            // Help and version requests aren't usage errors.
            let code = if err.use_stderr() { EX_USAGE } else { 0 };
            process::exit(code)
        }
    };

    let source = match read_source(&cli) {
        Ok(source) => source,
        Err(err) => {
            error!("cannot read {}: {}", cli.file.display(), err);
            process::exit(EX_NOINPUT)
        }
    };

    info!("compiling {}", cli.file.display());

    match compile_str(&source, &cli.options()) {
        Ok(output) => {
            print!("{}", output.as_str());
            Ok(())
        }
        Err(err) => {
            eprint!("{}", err.render(&source));
            process::exit(EX_DATAERR)
        }
    }
}

fn read_source(cli: &Cli) -> io::Result<String> {
    let bytes = fs::read(&cli.file)?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
