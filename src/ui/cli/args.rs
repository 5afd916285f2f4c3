// Fri Jan 16 2026 - Alex

use crate::output::{OutputFormat, STDIN_NAME};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "move-decompiler")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Turns Move bytecode disassembly into readable pseudo-source", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decompile one or more disassembly files
    Decompile(DecompileArgs),
    /// Print the disassembly with a comment per instruction
    Annotate(AnnotateArgs),
    /// Opcode statistics for a disassembly file
    Stats(StatsArgs),
}

#[derive(Parser, Debug)]
pub struct DecompileArgs {
    /// Disassembly files, `-` for standard input
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file, or a directory when several inputs are given
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub jobs: Option<usize>,

    #[arg(long)]
    pub keep_type_arguments: bool,

    #[arg(long)]
    pub no_branch_comments: bool,

    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Parser, Debug)]
pub struct AnnotateArgs {
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    pub input: PathBuf,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub json: bool,
}

impl DecompileArgs {
    pub fn is_batch(&self) -> bool {
        self.inputs.len() > 1
    }

    pub fn validate(&self) -> Result<(), String> {
        let stdin_count = self
            .inputs
            .iter()
            .filter(|p| p.as_os_str() == STDIN_NAME)
            .count();
        if stdin_count > 1 {
            return Err("Standard input (-) can only be given once".to_string());
        }
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err("Job count must be at least 1".to_string());
            }
        }
        if self.is_batch() {
            if let Some(output) = &self.output {
                if output.is_file() {
                    return Err(format!(
                        "Output must be a directory when decompiling several inputs: {:?}",
                        output
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decompile() {
        let args = Args::parse_from([
            "move-decompiler",
            "decompile",
            "a.txt",
            "b.txt",
            "-o",
            "out",
            "--format",
            "json",
            "--log-level",
            "debug",
        ]);

        assert_eq!(args.log_level, "debug");
        match args.command {
            Command::Decompile(decompile) => {
                assert_eq!(decompile.inputs.len(), 2);
                assert!(decompile.is_batch());
                assert_eq!(decompile.format, OutputFormat::Json);
                assert_eq!(decompile.output, Some(PathBuf::from("out")));
                assert!(decompile.validate().is_ok());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_stdin_only_once() {
        let args = Args::parse_from(["move-decompiler", "decompile", "-", "-"]);
        match args.command {
            Command::Decompile(decompile) => assert!(decompile.validate().is_err()),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_stats() {
        let args = Args::parse_from(["move-decompiler", "-q", "stats", "coin.txt", "--json"]);
        assert!(args.quiet);
        match args.command {
            Command::Stats(stats) => {
                assert!(stats.json);
                assert_eq!(stats.input, PathBuf::from("coin.txt"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
