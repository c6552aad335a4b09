use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::db::notes::{clear_note, get_note, set_note};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::utils::date;
use crate::utils::formatting::wrap_indented;

/// Day notes live only in the local database.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Note {
        date: date_arg,
        set,
        clear,
    } = cmd
    {
        let d = match date_arg {
            Some(s) => date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => date::today(),
        };
        let pool = DbPool::open(&cfg.database)?;

        if *clear {
            if clear_note(&pool.conn, d)? {
                ttlog_quiet(&pool.conn, "note", &d.to_string(), "note cleared");
                success(format!("Note for {} removed", d));
            } else {
                info(format!("No note for {}", d));
            }
            return Ok(());
        }

        if let Some(text) = set {
            set_note(&pool.conn, d, text)?;
            ttlog_quiet(&pool.conn, "note", &d.to_string(), "note saved");
            success(format!("Note for {} saved", d));
            return Ok(());
        }

        match get_note(&pool.conn, d)? {
            Some(note) => {
                println!("📝 {}", d);
                println!("{}", wrap_indented(&note.text, 72, "   "));
            }
            None => info(format!("No note for {}", d)),
        }
    }

    Ok(())
}
