use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::fs;
use std::path::PathBuf;
use wafer::utils::disassemble;
use wafer::{Instruction, Machine, MachineConfig, Registry};

use crate::codegen;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Command-line interface for the wafer compiler
#[derive(Debug, ClapParser)]
#[command(name = "wafer-lang", version, about = "Compile and run wafer programs")]
pub struct Cli {
    /// Source file to compile and run
    pub file: PathBuf,

    /// Print the lowered IL listing before running
    #[arg(long)]
    pub emit_il: bool,

    /// Trace every executed instruction and the operand stack
    #[arg(long)]
    pub trace: bool,

    /// Abort execution after this many instructions
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,
}

/// Runs the pipeline described by a parsed [`Cli`].
pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, cli: Cli) -> Result<()> {
        let source = fs::read_to_string(&cli.file)
            .with_context(|| format!("Failed to read {}", cli.file.display()))?;

        let instructions = compile(&source)
            .with_context(|| format!("Failed to compile {}", cli.file.display()))?;

        if cli.emit_il {
            print!("{}", disassemble(&instructions));
        }

        let mut config = MachineConfig::default().with_trace(cli.trace);
        if let Some(limit) = cli.max_steps {
            config = config.with_step_limit(limit);
        }

        let mut machine = Machine::with_config(instructions, Registry::with_builtins(), config);
        let result = machine.run().context("Execution failed")?;

        let mut variables: Vec<_> = machine.environment().iter().collect();
        variables.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in variables {
            println!("{} = {}", name, value);
        }
        if let Some(value) = result {
            println!("=> {}", value);
        }

        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the front half of the pipeline: source text to IL.
pub fn compile(source: &str) -> Result<Vec<Instruction>> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;

    let mut parser = Parser::new(tokens);
    let program = parser.parse()?;

    let instructions = codegen::lower(&program)?;
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli_for(source: &str) -> (tempfile::NamedTempFile, Cli) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        let cli = Cli {
            file: file.path().to_path_buf(),
            emit_il: false,
            trace: false,
            max_steps: None,
        };
        (file, cli)
    }

    #[test]
    fn test_compile_produces_il() {
        let instructions = compile("x = 1\n").unwrap();
        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions.last(), Some(&Instruction::Halt));
    }

    #[test]
    fn test_compile_reports_lex_errors() {
        let err = compile("x = $\n").unwrap_err();
        assert!(err.to_string().contains("Unexpected character"));
    }

    #[test]
    fn test_compile_reports_parse_errors() {
        let err = compile("while x\n    x = 1\n").unwrap_err();
        assert!(err.to_string().contains("Expected token"));
    }

    #[test]
    fn test_compile_reports_lowering_errors() {
        let err = compile("if x:\n    y = 1\nelse:\n    y = 2\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported construct"));
    }

    #[test]
    fn test_handle_runs_a_program() {
        let (_file, cli) = cli_for("x = 3\nwhile x: x = x - 1\n");
        CliHandler::new().handle(cli).unwrap();
    }

    #[test]
    fn test_handle_reports_runtime_faults() {
        let (_file, cli) = cli_for("x = 1 / 0\n");
        let err = CliHandler::new().handle(cli).unwrap_err();
        assert!(err.to_string().contains("Execution failed"));
    }

    #[test]
    fn test_handle_missing_file() {
        let cli = Cli {
            file: PathBuf::from("/no/such/file.wf"),
            emit_il: false,
            trace: false,
            max_steps: None,
        };
        let err = CliHandler::new().handle(cli).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_handle_step_limit() {
        let (_file, mut cli) = cli_for("x = 1\nwhile x: x = 1\n");
        cli.max_steps = Some(1000);
        let err = CliHandler::new().handle(cli).unwrap_err();
        assert!(format!("{:#}", err).contains("Step limit"));
    }
}
