// Fri Jan 16 2026 - Alex

pub mod cli;
pub mod progress;

pub use cli::{Args, Command, CommandHandler};
pub use progress::BatchProgress;

use colored::Colorize;

// Status lines go to stderr so decompiled output on stdout stays clean.

pub fn print_info(message: &str) {
    eprintln!("{} {}", "[INFO]".cyan(), message);
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "[OK]".green(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "[WARN]".yellow(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red(), message);
}

pub fn print_section(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "-".repeat(40).cyan());
}
