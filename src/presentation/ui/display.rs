use crate::domain::entities::{OperationOutcome, OperationResult};
use colored::{Color, Colorize};
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Display utilities for the CLI interface
pub struct DisplayHelper {
    pub use_color: bool,
    pub terminal: Term,
}

impl DisplayHelper {
    /// Create a new DisplayHelper
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            terminal: Term::stdout(),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Format a file path with appropriate styling
    pub fn format_path(&self, path: &str) -> String {
        if self.use_color {
            path.cyan().to_string()
        } else {
            format!("'{}'", path)
        }
    }

    /// Format a branch name with appropriate styling
    pub fn format_branch(&self, branch: &str) -> String {
        if self.use_color {
            branch.green().to_string()
        } else {
            format!("'{}'", branch)
        }
    }

    /// Format a repository name with appropriate styling
    pub fn format_repo(&self, repo: &str) -> String {
        if self.use_color {
            repo.cyan().bold().to_string()
        } else {
            repo.to_string()
        }
    }

    /// Create a spinner for one queue step
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = if self.use_color && self.terminal.is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        };

        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", "✓"])
            .template("{spinner:.green} {prefix:.dim} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));

        pb
    }

    /// Print a table-like structure
    pub fn print_table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if rows.is_empty() {
            return;
        }

        let mut col_widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(cell.len());
                }
            }
        }

        for (i, header) in headers.iter().enumerate() {
            if i > 0 {
                print!("  ");
            }
            if self.use_color {
                print!("{:<width$}", header.bold(), width = col_widths[i]);
            } else {
                print!("{:<width$}", header, width = col_widths[i]);
            }
        }
        println!();

        let rule = if self.use_color { "─" } else { "-" };
        let separator: Vec<String> = col_widths.iter().map(|&w| rule.repeat(w)).collect();
        println!("{}", separator.join("  "));

        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = col_widths.get(i).copied().unwrap_or(0);
                    format!("{:<width$}", cell, width = width)
                })
                .collect();
            println!("{}", cells.join("  ").trim_end());
        }
    }

    /// Print a status indicator
    pub fn print_status(&self, status: StatusType, message: &str) {
        let (icon, color, label) = match status {
            StatusType::Success => ("✓", Color::Green, "[OK]"),
            StatusType::Unchanged => ("=", Color::BrightBlack, "[SAME]"),
            StatusType::Error => ("✗", Color::Red, "[ERROR]"),
            StatusType::Warning => ("⚠", Color::Yellow, "[WARN]"),
        };

        if self.use_color {
            println!("{} {}", icon.color(color).bold(), message);
        } else {
            println!("{} {}", label, message);
        }
    }

    /// Print an indented message
    pub fn print_indented(&self, message: &str, level: usize) {
        let indent = "  ".repeat(level);
        println!("{}{}", indent, message);
    }

    /// Print one repository's operation result on a single line
    pub fn print_result(&self, result: &OperationResult) {
        let repo = self.format_repo(&result.repository);
        match &result.outcome {
            Ok(outcome) if outcome.is_unchanged() => {
                self.print_status(StatusType::Unchanged, &format!("{}: {}", repo, outcome))
            }
            Ok(outcome) => self.print_status(StatusType::Success, &format!("{}: {}", repo, outcome)),
            Err(error) => self.print_status(StatusType::Error, &format!("{}: {}", repo, error)),
        }
    }

    /// Print a status result with its changed files
    pub fn print_repository_status(&self, result: &OperationResult) {
        match &result.outcome {
            Ok(OperationOutcome::Status { branch, changes }) => {
                let status = if changes.is_empty() {
                    StatusType::Success
                } else {
                    StatusType::Warning
                };
                self.print_status(
                    status,
                    &format!(
                        "{} [{}]",
                        self.format_repo(&result.repository),
                        self.format_branch(branch)
                    ),
                );
                for change in changes {
                    self.print_indented(change, 2);
                }
            }
            _ => self.print_result(result),
        }
    }

    /// Print a summary box
    pub fn print_summary(&self, title: &str, items: &[(String, String)]) {
        if self.use_color {
            println!("\n┌─ {} ─┐", title.bold());
            for (key, value) in items {
                println!("│ {}: {}", key.bold(), value);
            }
            println!("└{:─<width$}┘", "", width = title.len() + 4);
        } else {
            println!("\n=== {} ===", title);
            for (key, value) in items {
                println!("{}: {}", key, value);
            }
            println!("{}", "=".repeat(title.len() + 8));
        }
    }
}

/// Status types for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Unchanged,
    Error,
    Warning,
}

/// Count results by success, unchanged and failure
pub fn tally(results: &[OperationResult]) -> (usize, usize, usize) {
    results.iter().fold((0, 0, 0), |(ok, same, failed), result| {
        match &result.outcome {
            Ok(outcome) if outcome.is_unchanged() => (ok, same + 1, failed),
            Ok(_) => (ok + 1, same, failed),
            Err(_) => (ok, same, failed + 1),
        }
    })
}

/// Helper functions for common display patterns
pub mod helpers {
    use super::*;

    /// Create a display helper with color detection
    pub fn auto_display(no_color: bool) -> DisplayHelper {
        let use_color =
            !no_color && Term::stdout().is_term() && std::env::var_os("NO_COLOR").is_none();
        DisplayHelper::new(use_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{OperationError, OperationKind};

    #[test]
    fn test_plain_formatting() {
        let display = DisplayHelper::new(false);
        assert_eq!(display.format_repo("h5p-text"), "h5p-text");
        assert_eq!(display.format_branch("main"), "'main'");
        assert_eq!(display.format_path("/ws"), "'/ws'");
    }

    #[test]
    fn test_tally() {
        let results = vec![
            OperationResult::new("a", OperationKind::Pull, Ok(OperationOutcome::Pulled)),
            OperationResult::new("b", OperationKind::Pull, Ok(OperationOutcome::UpToDate)),
            OperationResult::new(
                "c",
                OperationKind::Pull,
                Err(OperationError::Auth {
                    host: "github.com".to_string(),
                }),
            ),
            OperationResult::new("d", OperationKind::Pull, Ok(OperationOutcome::Pulled)),
        ];

        assert_eq!(tally(&results), (2, 1, 1));
    }
}
