//! Output formatting for junos-provider
//!
//! State goes to stdout as JSON; diagnostics go to stderr.

use colored::Colorize;
use serde::Serialize;

use junos_provider::resources::{Diagnostic, Diagnostics, Severity};

/// Output formatter for the selected output mode
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            json_mode,
        }
    }

    /// Print a value as JSON on stdout
    pub fn value<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        let text = if self.json_mode {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        println!("{}", text);
        Ok(())
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        self.message(Severity::Error, message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.message(Severity::Warning, message);
    }

    /// Print every diagnostic in order
    pub fn diagnostics(&self, diags: &Diagnostics) {
        for diag in diags.iter() {
            self.diagnostic(diag);
        }
    }

    fn diagnostic(&self, diag: &Diagnostic) {
        if self.json_mode {
            if let Ok(line) = serde_json::to_string(diag) {
                eprintln!("{}", line);
            }
            return;
        }
        self.message(diag.severity, &diag.to_string());
    }

    fn message(&self, severity: Severity, message: &str) {
        if self.json_mode {
            let entry = serde_json::json!({
                "severity": severity,
                "summary": message,
            });
            eprintln!("{}", entry);
            return;
        }

        let label = match severity {
            Severity::Error => "ERROR:",
            Severity::Warning => "WARNING:",
        };
        if !self.use_color {
            eprintln!("{} {}", label, message);
            return;
        }
        match severity {
            Severity::Error => eprintln!("{} {}", label.red().bold(), message),
            Severity::Warning => eprintln!("{} {}", label.yellow().bold(), message),
        }
    }
}
