//! CLI command implementations.

use std::fs;

use jnvm_common::{Program, Value};
use jnvm_vm::{Machine, MachineConfig};
use tracing::{debug, warn};

/// Assemble a .jasm text file to a .jnb program image.
pub fn assemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: assemble requires an input file");
        eprintln!("Usage: jnvm assemble <input.jasm> [-o output.jnb]");
        return Err(1);
    }

    let input = &args[0];

    // Parse -o flag
    let output = if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if let Some(stem) = input.strip_suffix(".jasm") {
        format!("{stem}.jnb")
    } else {
        format!("{input}.jnb")
    };

    let program = read_text(input)?;
    let bytes = program.encode();

    fs::write(&output, &bytes).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!(
        "assembled {} instructions, {} strings ({} bytes) -> {output}",
        program.len(),
        program.strings.len(),
        bytes.len()
    );
    Ok(())
}

/// Disassemble a .jnb image to text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: jnvm disassemble <input.jnb>");
        return Err(1);
    }

    let program = read_binary(&args[0])?;
    print!("{}", jnvm_assembler::disassemble(&program));
    Ok(())
}

/// Execute a .jnb image or a .jasm text file and print register 0.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: jnvm run <input> [--debug] [--max-depth N]");
        return Err(1);
    }

    let input = &args[0];
    let config = parse_run_options(&args[1..])?;

    let program = if input.ends_with(".jasm") {
        read_text(input)?
    } else {
        read_binary(input)?
    };

    let mut vm = Machine::with_config(config);
    vm.load_program(&program);

    let outcome = vm.execute();
    if let Some(report) = vm.last_profile() {
        eprintln!(
            "profile: {:?} ({} instructions)",
            report.elapsed, report.instructions
        );
    }

    match outcome {
        Ok(value) => {
            println!("{}", Value::from_word(value));
            Ok(())
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Parse `--debug` and `--max-depth N` into a machine configuration.
fn parse_run_options(args: &[String]) -> Result<MachineConfig, i32> {
    let mut config = MachineConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--debug" => config = config.with_debug(true),
            "--max-depth" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("error: --max-depth requires a value");
                    return Err(1);
                };
                let depth = value.parse::<usize>().map_err(|_| {
                    eprintln!("error: invalid --max-depth '{value}'");
                    1
                })?;
                config = config.with_max_call_depth(depth);
                i += 1;
            }
            other => {
                eprintln!("error: unknown option '{other}'");
                return Err(1);
            }
        }
        i += 1;
    }
    Ok(config)
}

/// Read and assemble a text file.
fn read_text(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let program = jnvm_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    debug!(path, instructions = program.len(), "assembled");
    if program.exceeds_jmp_range() {
        warn!(
            path,
            instructions = program.len(),
            "program uses JMP but is longer than JMP can address; use JZ/JNZ for far targets"
        );
    }
    Ok(program)
}

/// Read and decode a binary image.
fn read_binary(path: &str) -> Result<Program, i32> {
    let bytes = fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let program = Program::decode(&bytes).map_err(|e| {
        eprintln!("error: invalid binary: {e}");
        1
    })?;
    debug!(path, instructions = program.len(), "decoded image");
    Ok(program)
}
