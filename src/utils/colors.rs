/// ANSI color helper utilities for terminal output.
use crate::config::Config;
use ansi_term::Colour;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Map a configured color name to a terminal colour.
pub fn colour_by_name(name: &str) -> Option<Colour> {
    let c = match name.trim().to_lowercase().as_str() {
        "green" => Colour::Green,
        "purple" | "magenta" => Colour::Purple,
        "yellow" => Colour::Yellow,
        "blue" => Colour::Blue,
        "pink" => Colour::RGB(255, 105, 180),
        "red" => Colour::Red,
        "orange" => Colour::RGB(255, 153, 51),
        "grey" | "gray" => Colour::Fixed(244),
        "cyan" => Colour::Cyan,
        "white" => Colour::White,
        _ => return None,
    };
    Some(c)
}

/// Colour of a category row; unknown categories fall back to the "Other" entry.
pub fn category_colour(cfg: &Config, category: &str) -> Colour {
    cfg.color_for_category(category)
        .or_else(|| cfg.color_for_category("Other"))
        .and_then(colour_by_name)
        .unwrap_or(Colour::White)
}

pub fn paint_category(cfg: &Config, category: &str, text: &str) -> String {
    category_colour(cfg, category).paint(text).to_string()
}

/// Dims empty values ("", "--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
