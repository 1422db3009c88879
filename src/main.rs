mod cli;
mod error;
mod index;
mod nav;
mod reader;

use clap::Parser;
use std::process::ExitCode;

use cli::Args;
use error::{LeapError, EXIT_SUCCESS};
use nav::{NavConfig, Navigator};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print a chunk, optionally prefixed with 1-based line numbers
fn print_chunk(text: &str, start_line: u64, args: &Args) {
    if args.line_numbers {
        for (i, line) in text.lines().enumerate() {
            println!("{}{}{}", start_line + i as u64 + 1, args.separator, line);
        }
    } else {
        print!("{text}");
        if !text.is_empty() && !text.ends_with('\n') {
            println!();
        }
    }
}

fn run(args: &Args) -> Result<(), LeapError> {
    if args.chunk_size == 0 || args.line_chunk == 0 {
        return Err(LeapError::InvalidArgs {
            message: "--chunk-size and --line-chunk must be at least 1".to_string(),
        });
    }

    let config = NavConfig {
        chunk_size: args.chunk_size,
        line_chunk: args.line_chunk,
    };
    let mut nav = Navigator::new(config);
    let first = nav.open(&args.file)?;

    if args.count {
        let count = nav.wait_for_exact_count()?;
        println!("{count}");
    } else if let Some(term) = &args.search {
        nav.wait_for_search_index()?;
        let lines = nav.search(term)?;
        if lines.is_empty() {
            println!("not found");
        } else {
            for line in &lines {
                println!("{}", line + 1);
            }
        }
    } else if let Some(n) = args.goto {
        nav.wait_for_line_index()?;
        let result = nav.goto_line(n)?;
        print_chunk(&result.text, result.start_line, args);
    } else if args.last {
        let text = nav.load_last()?;
        print_chunk(&text, nav.current_start_line(), args);
    } else {
        print_chunk(&first, 0, args);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS as u8),
        Err(e) => {
            eprintln!("leap: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
