// Fri Jan 16 2026 - Alex

use super::args::{AnnotateArgs, Args, Command, DecompileArgs, StatsArgs};
use crate::config::DecompilerConfig;
use crate::decompiler::{DecompilationResult, DecompiledModule, Decompiler, ModuleAnalysis};
use crate::output::{output_path_for, JsonSerializer, OutputFormat, STDIN_NAME};
use crate::ui::progress::BatchProgress;
use crate::ui::{print_error, print_info, print_section, print_success, print_warning};
use crate::utils::logging::LoggingUtils;
use crate::utils::string::truncate;
use crate::utils::{format_duration, measure_time, pluralize};
use anyhow::Context;
use colored::Colorize;
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub struct CommandHandler {
    quiet: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.quiet = args.quiet;
        if args.no_color {
            colored::control::set_override(false);
        }

        self.setup_logging(&args);

        match args.command {
            Command::Decompile(decompile_args) => self.handle_decompile(decompile_args),
            Command::Annotate(annotate_args) => self.handle_annotate(annotate_args),
            Command::Stats(stats_args) => self.handle_stats(stats_args),
        }
    }

    fn setup_logging(&self, args: &Args) {
        let level = LoggingUtils::level_from_str(&args.log_level);
        LoggingUtils::init_logger(level);
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            print_info(message);
        }
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            print_success(message);
        }
    }

    fn warning(&self, message: &str) {
        if !self.quiet {
            print_warning(message);
        }
    }

    fn load_config(&self, path: Option<&Path>) -> anyhow::Result<DecompilerConfig> {
        match path {
            Some(path) => DecompilerConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(DecompilerConfig::default()),
        }
    }

    fn handle_decompile(&self, args: DecompileArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let mut config = self.load_config(args.config.as_deref())?;
        if let Some(jobs) = args.jobs {
            config.jobs = jobs;
        }
        if args.keep_type_arguments {
            config.keep_type_arguments = true;
        }
        if args.no_branch_comments {
            config.emit_branch_comments = false;
        }
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
            .context("Failed to build worker pool")?;

        let batch = args.is_batch();
        self.info(&format!(
            "Decompiling {} with {} worker(s)",
            pluralize(args.inputs.len(), "input", "inputs"),
            config.jobs
        ));

        let show_progress = batch && !args.no_progress && !self.quiet;
        let progress = BatchProgress::new(args.inputs.len() as u64, show_progress);
        let decompiler = Decompiler::new().with_config(config);

        let (results, elapsed) = measure_time(|| {
            pool.install(|| {
                args.inputs
                    .par_iter()
                    .map(|input| {
                        let result = read_input(input).map(|text| decompiler.decompile(&text));
                        progress.advance(&input.display().to_string());
                        (input.clone(), result)
                    })
                    .collect::<Vec<(PathBuf, anyhow::Result<DecompilationResult>)>>()
            })
        });
        progress.clear();

        let mut failures = 0;
        let mut fallbacks = 0;

        for (input, result) in results {
            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    print_error(&format!("{:#}", e));
                    failures += 1;
                    continue;
                }
            };

            if !result.success {
                fallbacks += 1;
                self.warning(&format!(
                    "{}: reconstruction failed, emitting annotated disassembly",
                    input.display()
                ));
            }
            for warning in &result.warnings {
                log::info!("{}: {}", input.display(), warning);
            }

            self.write_result(&args, &input, &result)?;
        }

        let processed = args.inputs.len() - failures;
        self.success(&format!(
            "Decompiled {} in {}",
            pluralize(processed, "input", "inputs"),
            format_duration(elapsed)
        ));
        if fallbacks > 0 {
            self.warning(&format!("{} fell back to annotated output", pluralize(fallbacks, "input", "inputs")));
        }

        if failures > 0 {
            return Err(anyhow::anyhow!(
                "{} of {} input(s) could not be read",
                failures,
                args.inputs.len()
            ));
        }
        Ok(())
    }

    fn write_result(&self, args: &DecompileArgs, input: &Path, result: &DecompilationResult) -> anyhow::Result<()> {
        let name = input.display().to_string();
        let rendered = args
            .format
            .render(&name, result)
            .context("Failed to serialize output")?;

        match output_path_for(input, args.output.as_deref(), args.format, args.is_batch()) {
            Some(path) => {
                write_file(&path, &rendered)?;
                self.success(&format!("Wrote {}", path.display()));
            }
            None => {
                if args.is_batch() && args.format == OutputFormat::Text {
                    println!("// ==> {} <==", name);
                }
                print!("{}", rendered);
                if !rendered.ends_with('\n') {
                    println!();
                }
            }
        }
        Ok(())
    }

    fn handle_annotate(&self, args: AnnotateArgs) -> anyhow::Result<()> {
        let text = read_input(&args.input)?;
        let annotated = Decompiler::new().annotate(&text);

        match &args.output {
            Some(path) => {
                write_file(path, &annotated)?;
                self.success(&format!("Wrote {}", path.display()));
            }
            None => print!("{}", annotated),
        }
        Ok(())
    }

    fn handle_stats(&self, args: StatsArgs) -> anyhow::Result<()> {
        let config = self.load_config(args.config.as_deref())?;
        let text = read_input(&args.input)?;
        let result = Decompiler::new().with_config(config).decompile(&text);
        let name = args.input.display().to_string();

        if !result.success {
            self.warning(&format!(
                "{}: {}",
                name,
                result.warnings.first().map(String::as_str).unwrap_or("decompilation failed")
            ));
        }

        if args.json {
            let json = JsonSerializer::new()
                .serialize_analysis(&name, &result.analysis)
                .context("Failed to serialize statistics")?;
            println!("{}", json);
        } else {
            print_analysis(&name, result.module.as_ref(), &result.analysis);
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == STDIN_NAME {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        return Ok(text);
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_analysis(name: &str, module: Option<&DecompiledModule>, analysis: &ModuleAnalysis) {
    print_section(&format!("Statistics for {}", name));

    println!("  Instructions: {}", analysis.instruction_count.to_string().green());
    println!("  Functions: {}", analysis.functions.len().to_string().green());
    if let Some(module) = module {
        let fields: usize = module.structs.iter().map(|s| s.field_count()).sum();
        println!(
            "  Structs: {} ({})",
            module.structs.len().to_string().green(),
            pluralize(fields, "field", "fields")
        );
        println!("  Statements: {}", module.statement_count().to_string().green());
    }
    println!("  Total complexity: {}", format!("{:.1}", analysis.total_complexity()).green());
    if let Some(top) = analysis.most_complex() {
        println!("  Most complex: {} ({:.1})", truncate(&top.name, 40).cyan(), top.complexity);
    }

    let unknown = analysis.unknown_count();
    let unknown_str = unknown.to_string();
    println!(
        "  Unknown opcodes: {}",
        if unknown == 0 { unknown_str.green() } else { unknown_str.yellow() }
    );
    println!();

    if !analysis.family_frequency.is_empty() {
        println!("{}", "Opcode families:".yellow().bold());
        for (family, count) in analysis.most_common_families(analysis.family_frequency.len()) {
            println!("  {:<14} {}", family, count);
        }
        println!();
    }

    if !analysis.functions.is_empty() {
        println!("{}", "Functions:".yellow().bold());
        for function in &analysis.functions {
            let score = format!("{:.1}", function.complexity);
            let score = if function.complexity >= 10.0 {
                score.red()
            } else if function.complexity >= 5.0 {
                score.yellow()
            } else {
                score.green()
            };
            let marker = if function.leftover_stack > 0 { " (incomplete)" } else { "" };
            println!(
                "  {} [{}] {} instr{}",
                truncate(&function.name, 40).cyan(),
                score,
                function.instruction_count,
                marker
            );
        }
        println!();
    }

    if !analysis.unknown_opcodes.is_empty() {
        println!("{}", "Unknown opcodes:".yellow().bold());
        for (opcode, count) in &analysis.unknown_opcodes {
            println!("  {} x{}", opcode, count);
        }
    }
}
