use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::utils::formatting::{pad_right, strip_ansi};
use ansi_term::Colour;
use rusqlite::Connection;

const OP_MAX_WIDTH: usize = 60;

/// ANSI colour of an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "add" | "category_add" | "type_add" | "seed" => Colour::Green,
        "del" | "category_del" | "type_del" => Colour::Red,
        "edit" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "sync" | "watch" | "import" | "export" => Colour::Blue,
        "login" | "logout" | "signup" | "token_refreshed" => Colour::Cyan,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

fn truncate_visible(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut t: String = s.chars().take(max - 3).collect();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let entries = load_log(conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let rows: Vec<(i64, String, String, String, String)> = entries
            .into_iter()
            .map(|e| {
                let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or(e.date);

                let op_target = if e.target.is_empty() {
                    e.operation.clone()
                } else {
                    format!("{} ({})", e.operation, e.target)
                };

                (e.id, date, e.operation, op_target, e.message)
            })
            .collect();

        let op_w = rows
            .iter()
            .map(|(_, _, _, op_target, _)| op_target.chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_MAX_WIDTH);
        let id_w = rows
            .iter()
            .map(|(id, ..)| id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = rows
            .iter()
            .map(|(_, date, ..)| date.len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, operation, op_target, message) in rows {
            let color = color_for_operation(&operation);

            // Only the operation word is coloured; the target stays plain.
            let visible = truncate_visible(&strip_ansi(&op_target), OP_MAX_WIDTH);
            let painted = match visible.split_once(' ') {
                Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
                None => color.paint(visible.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {:<date_w$} | {} => {}",
                id,
                date,
                pad_right(&painted, op_w),
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
