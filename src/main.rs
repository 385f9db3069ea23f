#[macro_use]
extern crate log;

use std::{fs::read_to_string, io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use dent::{
    display_error, errors::errors::Error, interpreter, lexer::lexer::tokenize, parse_program,
    parser::lookups::create_operator_table,
};

/// Interpreter for dent, a small indentation-structured language
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The program to run
    input: PathBuf,

    /// Extra arguments handed to `main` after the program name
    cmd: Vec<String>,

    /// Print the token stream
    #[clap(short, long)]
    tokens: bool,

    /// Print the tree after all rewrites
    #[clap(short, long)]
    ast: bool,

    /// Log at debug level
    #[clap(short, long)]
    debug: bool,

    /// Stop after parsing
    #[clap(short = 'n', long)]
    dry_run: bool,

    /// Infer types and fix up `main`'s return before running it
    #[clap(short, long)]
    check_types: bool,

    /// Extra log filters, e.g. `indent=off` or `interpreter.call=trace`
    #[clap(long, multiple_values = true)]
    trace: Vec<String>,
}

fn init_logging(args: &Args) {
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    for filter in &args.trace {
        builder.parse_filters(filter);
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn execute(args: &Args, source: &str) -> Result<Option<i32>, Error> {
    let table = create_operator_table();

    if args.tokens {
        for token in tokenize(source, &table)? {
            println!("{}", token);
        }
    }

    let ast = parse_program(source, &table)?;
    if args.ast {
        print!("{}", ast.pretty_print());
    }
    if args.dry_run {
        return Ok(None);
    }

    let mut argv = vec![args.input.display().to_string()];
    argv.extend(args.cmd.iter().cloned());

    let mut stdout = io::stdout();
    let code = interpreter::interpreter::run(ast, &argv, args.check_types, &mut stdout)?;
    Ok(Some(code))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);
    debug!("{args:#?}");

    if !args.input.is_file() {
        anyhow::bail!("Input file must be a file!");
    }
    let source = read_to_string(&args.input)?;
    let file = args.input.display().to_string();

    match execute(&args, &source) {
        Ok(Some(code)) => std::process::exit(code),
        Ok(None) => Ok(()),
        Err(error) => {
            eprint!("{}", display_error(&error, &source, &file));
            anyhow::bail!("{} failed", file)
        }
    }
}
