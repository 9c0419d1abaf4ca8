//! CTS runner CLI

use cts_core::Query;
use cts_runner::commands::{list_cases, run_suites, OutputFormat, RunOptions};

fn main() {
    cts_runner::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            // Query is optional, flags can come before or after
            let mut query: Option<String> = None;
            let mut options = RunOptions::default();

            for arg in args.iter().skip(2) {
                if let Some(filter) = arg.strip_prefix("--filter=") {
                    options.config.filter = Some(filter.to_string());
                } else if arg == "--verbose" || arg == "-v" {
                    options.config.verbose = true;
                } else if arg == "--no-parallel" {
                    options.config.parallel = false;
                } else if arg == "--json" {
                    options.format = OutputFormat::Json;
                } else if !arg.starts_with('-') && query.is_none() {
                    query = Some(arg.clone());
                } else {
                    eprintln!("warning: ignoring unknown option '{arg}'");
                }
            }

            options.config.query = query.as_deref().map(parse_query);
            std::process::exit(run_suites(&options));
        }
        "list" => {
            let query = args.get(2).map(String::as_str).map(parse_query);
            std::process::exit(list_cases(query.as_ref()));
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" => {
            println!("cts {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_query(text: &str) -> Query {
    match Query::parse(text) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("CTS runner");
    println!();
    println!("Usage: cts <command> [options]");
    println!();
    println!("Commands:");
    println!("  run [query]          Run test cases (default: every suite)");
    println!("  list [query]         List test cases without running them");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Run options:");
    println!("  --filter=<text>      Only run cases whose identity contains <text>");
    println!("  --no-parallel        Run cases one at a time");
    println!("  -v, --verbose        Report passing and skipped cases too");
    println!("  --json               Print a JSON report instead of text");
    println!();
    println!("Queries:");
    println!("  examples                        every case in a group");
    println!("  examples:basic,*                tests whose name starts with `basic`");
    println!("  examples:basic,params           every case of one test");
    println!("  examples:basic,params:{{\"x\":2,\"y\":4}}  one case");
    println!();
    println!("Environment:");
    println!("  RUST_LOG             Enable tracing output (e.g. RUST_LOG=cts_core=debug)");
    println!("  CTS_LOG_TREE         Print tracing output as an indented tree");
}
