//! User-facing notifications (the CLI counterpart of toasts) and prompts.

use ansi_term::Colour;
use std::fmt;
use std::io::{self, BufRead, Write};

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", Colour::Blue.bold().paint(ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", Colour::Green.bold().paint(ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", Colour::Yellow.bold().paint(ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", Colour::Red.bold().paint(ICON_ERR), msg);
}

/// Section header
pub fn header<T: fmt::Display>(msg: T) {
    println!(
        "{}\n",
        Colour::Blue.bold().paint(format!("====================== {}", msg))
    );
}

/// Ask a yes/no confirmation; anything but y/yes (including EOF) means no.
pub fn confirm(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().lock().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

/// Read one line from stdin after printing `label`.
pub fn prompt_line(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut s = String::new();
    io::stdin().lock().read_line(&mut s)?;
    Ok(s.trim_end_matches(['\r', '\n']).to_string())
}
