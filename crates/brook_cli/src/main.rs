//! Command line interface for the brook tokenizer.

use brook_cli::commands::{run_repl, tokenize_file, StreamOptions};

fn main() {
    brook_cli::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "tokens" => {
            let (options, path) = match StreamOptions::parse(&args[2..]) {
                Ok(parsed) => parsed,
                Err(msg) => {
                    eprintln!("error: {msg}");
                    std::process::exit(1);
                }
            };
            let Some(path) = path else {
                eprintln!("Usage: brook tokens <file> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --grammar=<file>    Grammar JSON (default: built-in demo grammar)");
                eprintln!("  --buffer=<bytes>    Token buffer capacity (default: 4096)");
                eprintln!("  --chunk=<bytes>     Refill chunk size (default: 4096)");
                eprintln!("  --keep-markers      Keep expression begin/end markers in content");
                eprintln!("  --spaces            Treat spaces as token bytes, not delimiters");
                eprintln!("  --union             Configured delimiters plus the defaults");
                eprintln!("  --json              One JSON object per token");
                eprintln!();
                eprintln!("Use '-' to read standard input.");
                std::process::exit(1);
            };
            tokenize_file(&path, &options);
        }
        "repl" => {
            let (options, positional) = match StreamOptions::parse(&args[2..]) {
                Ok(parsed) => parsed,
                Err(msg) => {
                    eprintln!("error: {msg}");
                    std::process::exit(1);
                }
            };
            if let Some(arg) = positional {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: brook repl [options]");
                std::process::exit(1);
            }
            run_repl(&options);
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-v" => {
            println!("brook {}", env!("CARGO_PKG_VERSION"));
        }
        command => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("brook: streaming tokenizer with runtime grammars");
    println!();
    println!("Usage: brook <command> [options]");
    println!();
    println!("Commands:");
    println!("  tokens <file>   Tokenize a file ('-' for stdin) and print the stream");
    println!("  repl            Tokenize lines interactively");
    println!("  help            Show this help message");
    println!("  version         Show version information");
    println!();
    println!("Stream options (tokens, repl):");
    println!("  --grammar=<file>    Grammar JSON (default: built-in demo grammar)");
    println!("  --buffer=<bytes>    Token buffer capacity (default: 4096)");
    println!("  --chunk=<bytes>     Refill chunk size (default: 4096)");
    println!("  --keep-markers      Keep expression begin/end markers in content");
    println!("  --spaces            Treat spaces as token bytes, not delimiters");
    println!("  --union             Configured delimiters plus the defaults");
    println!("  --json              One JSON object per token (tokens only)");
    println!();
    println!("Set RUST_LOG=brook_core=trace for engine traces.");
}
