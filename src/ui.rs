//! Colored status output.
//!
//! Every line the tool prints about its own progress goes to stderr
//! with a colored `* [gerry]` prefix so it stands apart from the
//! assistant's own (often verbose) output. Review text and results go
//! to stdout or files, never through here.

use std::io::Write;

use colored::Colorize;

use crate::models::ReviewType;

/// Strip carriage returns so external tool output can't mangle the line.
fn sanitize(message: &str) -> String {
    message.replace('\r', "")
}

fn prefixed(prefix: colored::ColoredString, message: &str) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "{prefix} {}", sanitize(message));
}

/// Progress/status line (green prefix).
pub fn status(message: &str) {
    prefixed(format!("* [{}]", crate::constants::APP_NAME).green(), message);
}

/// Warning line (yellow prefix).
pub fn warn(message: &str) {
    prefixed(format!("* [{}]", crate::constants::APP_NAME).yellow(), message);
}

/// Error line (red prefix).
pub fn error(message: &str) {
    prefixed(format!("* [{}]", crate::constants::APP_NAME).red(), message);
}

/// Ask the operator to confirm before an expensive step.
///
/// Loops until a clear yes/no; EOF counts as no.
pub fn confirm(question: &str) -> bool {
    loop {
        eprint!("{question} (y/n): ");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() || line.is_empty() {
            return false;
        }
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => eprintln!("Please enter 'y' or 'n'."),
        }
    }
}

/// Print the per-type outcome summary at the end of a run.
pub fn summary(completed: &[ReviewType], failures: &[(ReviewType, String)]) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle);

    for kind in completed {
        let _ = writeln!(handle, "  {} {} review", "✔".green().bold(), kind);
    }
    for (kind, reason) in failures {
        let _ = writeln!(
            handle,
            "  {} {} review — {}",
            "✖".red().bold(),
            kind,
            reason.red(),
        );
    }

    let _ = writeln!(
        handle,
        "{}",
        "───────────────────────────────────".dimmed()
    );
    let _ = writeln!(
        handle,
        " {} completed, {} failed",
        completed.len().to_string().bold(),
        failures.len().to_string().bold(),
    );
    let _ = handle.flush();
}
