// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::assembler::AsmOptions;
use crate::core::report::ReportFormat;
use crate::gcn::arch::Arch;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Assembler and disassembler for the AMD GCN instruction set \
(GCN 1.0/1.1/1.2/1.4).

Assembly reads GNU-as style source and writes raw little-endian machine code.
Disassembly (-d) reads raw machine code and writes canonical assembly text
that reassembles to the same words.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "gcnforge",
    version = VERSION,
    about = "AMD GCN assembler and disassembler",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    /// Input files; '-' or nothing reads stdin.
    pub inputs: Vec<PathBuf>,
    #[arg(
        long = "arch",
        default_value = "gcn1.0",
        long_help = "Target architecture: gcn1.0/gcn1.1/gcn1.2/gcn1.4, or the \
                     aliases si, ci, vi and vega."
    )]
    pub arch: String,
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
    #[arg(
        short = 'd',
        long = "disasm",
        action = ArgAction::SetTrue,
        long_help = "Disassemble raw machine code instead of assembling."
    )]
    pub disasm: bool,
    #[arg(
        long = "float-literals",
        action = ArgAction::SetTrue,
        long_help = "Render the float interpretation of literals as trailing comments \
                     when disassembling floating-point instructions."
    )]
    pub float_literals: bool,
    #[arg(
        short = 'D',
        long = "defsym",
        value_name = "NAME[=VALUE]",
        long_help = "Define an initial symbol; repeatable."
    )]
    pub defsyms: Vec<String>,
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,
    #[arg(long = "gnu-as-compat", action = ArgAction::SetTrue)]
    pub gnu_as_compat: bool,
    #[arg(short = 'w', long = "no-warn", action = ArgAction::SetTrue)]
    pub no_warn: bool,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug)]
pub struct CliConfig {
    pub arch: Arch,
    pub options: AsmOptions,
    pub report_format: ReportFormat,
}

/// Validate parsed arguments into an assembler configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, String> {
    let arch = Arch::from_name(&cli.arch)
        .ok_or_else(|| format!("Unknown architecture '{}'", cli.arch))?;
    let mut defsyms = Vec::new();
    for def in &cli.defsyms {
        let (name, value) = match def.split_once('=') {
            Some((name, value)) => {
                let value = parse_defsym_value(value)
                    .ok_or_else(|| format!("Bad value in -D {}", def))?;
                (name, value)
            }
            None => (def.as_str(), 1),
        };
        if name.is_empty() {
            return Err(format!("Bad symbol name in -D {}", def));
        }
        defsyms.push((name.to_string(), value));
    }
    Ok(CliConfig {
        arch,
        options: AsmOptions {
            arch,
            gnu_as_compat: cli.gnu_as_compat,
            no_warnings: cli.no_warn,
            include_dirs: cli.include_dirs.clone(),
            defsyms,
        },
        report_format: match cli.format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        },
    })
}

fn parse_defsym_value(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(rest) = text.strip_prefix('-') {
        rest.parse::<u64>().ok().map(|v| v.wrapping_neg())
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("gcnforge").chain(args.iter().copied()))
    }

    #[test]
    fn arch_aliases_resolve() {
        let cli = parse(&["--arch", "vega", "in.s"]);
        let config = validate_cli(&cli).unwrap();
        assert_eq!(config.arch, Arch::Gcn14);
    }

    #[test]
    fn defsym_forms() {
        let cli = parse(&["-D", "flag", "-D", "base=0x100", "in.s"]);
        let config = validate_cli(&cli).unwrap();
        assert_eq!(config.options.defsyms[0], ("flag".to_string(), 1));
        assert_eq!(config.options.defsyms[1], ("base".to_string(), 0x100));
    }

    #[test]
    fn bad_arch_is_rejected() {
        let cli = parse(&["--arch", "r600", "in.s"]);
        assert!(validate_cli(&cli).is_err());
    }
}
