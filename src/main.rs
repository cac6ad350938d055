// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for gcnforge.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use gcnforge::assembler::cli::{validate_cli, Cli};
use gcnforge::assembler::Assembler;
use gcnforge::disasm::GcnDisasm;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if cli.disasm {
        return run_disasm(&cli, config.arch);
    }
    run_asm(&cli, config)
}

fn read_input(path: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read(path),
        _ => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn run_disasm(cli: &Cli, arch: gcnforge::gcn::arch::Arch) -> ExitCode {
    let input = match read_input(cli.inputs.first()) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read input: {err}");
            return ExitCode::FAILURE;
        }
    };
    let disasm = GcnDisasm::new(arch, cli.float_literals);
    match disasm.disassemble(&input) {
        Ok(text) => {
            let result = match &cli.output {
                Some(path) => fs::write(path, text.as_bytes()),
                None => io::stdout().write_all(text.as_bytes()),
            };
            if let Err(err) = result {
                eprintln!("Failed to write output: {err}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_asm(cli: &Cli, config: gcnforge::assembler::cli::CliConfig) -> ExitCode {
    let mut asm = Assembler::new(config.options);
    if cli.inputs.is_empty() {
        let mut text = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut text) {
            eprintln!("Failed to read stdin: {err}");
            return ExitCode::FAILURE;
        }
        asm.assemble_source("<stdin>", &text);
    } else {
        for path in &cli.inputs {
            if path.as_os_str() == "-" {
                let mut text = String::new();
                if let Err(err) = io::stdin().read_to_string(&mut text) {
                    eprintln!("Failed to read stdin: {err}");
                    return ExitCode::FAILURE;
                }
                asm.assemble_source("<stdin>", &text);
            } else if let Err(err) = asm.assemble_file(path) {
                eprintln!("Failed to read {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }
    let mut stderr = io::stderr();
    let _ = asm.reporter.write_all(&mut stderr, config.report_format);
    if asm.reporter.has_errors() {
        return ExitCode::FAILURE;
    }
    if let Some(path) = &cli.output {
        if let Err(err) = fs::write(path, asm.code()) {
            eprintln!("Failed to write output: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
