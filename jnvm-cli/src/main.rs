//! JNVM CLI: assemble, disassemble and execute register-machine bytecode.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/decode/assembly error
//! - 3: Runtime fault

mod commands;

use std::io;
use std::process;

use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    init_logging(args.iter().any(|a| a == "--debug"));

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "assemble" => commands::assemble(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "run" => commands::run(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Route `tracing` output to stderr.
///
/// `RUST_LOG` overrides the default filter. Without it only warnings are
/// shown, or machine diagnostics when `--debug` is given.
fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("warn,jnvm=debug,jnvm_vm=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("Usage: jnvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  assemble <input.jasm> [-o output.jnb]   Assemble text to a program image");
    eprintln!("  disassemble <input.jnb>                 Disassemble an image to text");
    eprintln!("  run <input> [--debug] [--max-depth N]   Execute an image or .jasm file");
}
