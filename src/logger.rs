//! Console run logger: verbosity-gated messages, a progress bar over the
//! address list, and the end-of-run summary block.

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::SystemTime;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

use crate::report::RunSummary;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Only show progress bar and final summary
    Summary = 1,  // High-level run progress (default)
    Detailed = 2, // Per-owner steps, results, warnings
    Debug = 3,    // All messages including boundary call details
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }
}

pub struct RunLogger {
    verbosity: VerbosityLevel,
    progress_bar: Mutex<Option<ProgressBar>>,
    start_time: Mutex<Option<SystemTime>>,
}

impl RunLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Mutex::new(None),
            start_time: Mutex::new(None),
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("WARN", message);
        }
    }

    pub fn error(&self, message: &str) {
        // Errors are never hidden from users
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}] {}: {}", timestamp, level, message);

        // Route through the progress bar while one is active so the fixed
        // bar position is preserved
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.println(line);
                return;
            }
        }
        eprintln!("{}", line);
    }

    pub fn start_progress(&self, total_addresses: u64) {
        let pb = ProgressBar::new(total_addresses);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.progress_bar.lock() {
            *guard = Some(pb);
        }
        if let Ok(mut start) = self.start_time.lock() {
            *start = Some(SystemTime::now());
        }
    }

    pub fn advance_progress(&self, message: &str) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(message.to_string());
                pb.inc(1);
            }
        }
    }

    pub fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    /// Final summary block; always printed regardless of verbosity.
    pub fn print_summary(&self, summary: &RunSummary, output_path: &str) {
        print!("\x1b[2K\r"); // Clear any remaining progress bar artifacts
        let _ = io::stdout().flush();

        println!("\n=== RUN SUMMARY ===");
        if let Ok(start) = self.start_time.lock() {
            if let Some(start_time) = *start {
                let elapsed = start_time.elapsed().unwrap_or_default();
                println!("Run Duration: {:.2}s", elapsed.as_secs_f64());
            }
        }
        println!("Total Addresses: {}", summary.total_addresses);
        println!(
            "Addresses with Contact Info: {}",
            summary.addresses_with_contact
        );
        println!("Addresses with Phones: {}", summary.addresses_with_phones);
        println!("Addresses with Emails: {}", summary.addresses_with_emails);
        println!("Total Phone Numbers: {}", summary.total_phones);
        println!("Total Email Addresses: {}", summary.total_emails);
        println!("Phone Lookup Cost: ${:.2}", summary.total_phone_cost);
        println!("Email Lookup Cost: ${:.2}", summary.total_email_cost);
        println!("Total Incurred Cost: ${:.2}", summary.total_cost);
        if !output_path.is_empty() {
            println!("Results Exported: {}", output_path);
        }
    }
}
