use crate::backend::Table;
use crate::db::{mirror, session};
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::{Connection, OptionalExtension};
use std::fs;

pub fn print_db_info(conn: &Connection, db_path: &str, storage_key: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) SESSION
    //
    let who = match session::load_session(conn, storage_key)? {
        Some(s) => format!("{}{}{}", GREEN, s.display_name(), RESET),
        None => format!("{GREY}not signed in{RESET}"),
    };
    println!("{}• Session:{} {}", CYAN, RESET, who);

    //
    // 3) MIRROR
    //
    println!("{}• Mirror:{}", CYAN, RESET);
    for table in Table::ALL {
        println!(
            "    {:<17} {}{}{}",
            table.name(),
            GREEN,
            mirror::count_rows(conn, table)?,
            RESET
        );
    }

    let synced = mirror::last_synced_at(conn)?.unwrap_or_else(|| format!("{GREY}never{RESET}"));
    println!("    last sync:        {}", synced);

    //
    // 4) DATE RANGE
    //
    let first_date: Option<String> = conn
        .query_row(
            "SELECT date FROM mirror_events ORDER BY date ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last_date: Option<String> = conn
        .query_row(
            "SELECT date FROM mirror_events ORDER BY date DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 5) NOTES / LOG
    //
    let notes: i64 = conn.query_row("SELECT COUNT(*) FROM day_notes", [], |row| row.get(0))?;
    let log_rows: i64 = conn.query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))?;
    println!("{}• Day notes:{} {}", CYAN, RESET, notes);
    println!("{}• Log entries:{} {}", CYAN, RESET, log_rows);

    println!();
    Ok(())
}
