use super::{backend, session_manager};
use crate::cli::parser::{AuthAction, Cli, Commands};
use crate::config::{Config, ENV_PASSWORD};
use crate::db::pool::DbPool;
use crate::db::session::load_session;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, prompt_line, success, warning};
use chrono::{Local, TimeZone};

/// --password, then $HEALTHLOG_PASSWORD, then an interactive prompt.
fn resolve_password(flag: &Option<String>) -> AppResult<String> {
    if let Some(p) = flag {
        return Ok(p.clone());
    }
    if let Ok(p) = std::env::var(ENV_PASSWORD)
        && !p.is_empty()
    {
        return Ok(p);
    }
    Ok(prompt_line("Password")?)
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Auth { action } = &cli.command else {
        return Ok(());
    };

    let pool = DbPool::open(&cfg.database)?;

    match action {
        AuthAction::Signup { email, password } => {
            let backend = backend(cfg, cli.offline, "auth signup")?;
            let password = resolve_password(password)?;
            let session = session_manager(&backend, &pool.conn, cfg).sign_up(email, &password)?;
            success(format!("Account created, signed in as {}", session.display_name()));
        }
        AuthAction::Login {
            email,
            password,
            create,
        } => {
            let backend = backend(cfg, cli.offline, "auth login")?;
            let password = resolve_password(password)?;
            let session =
                session_manager(&backend, &pool.conn, cfg).sign_in(email, &password, *create)?;
            success(format!("Signed in as {}", session.display_name()));
        }
        AuthAction::Logout => {
            let backend = backend(cfg, cli.offline, "auth logout")?;
            if session_manager(&backend, &pool.conn, cfg).sign_out()? {
                success("Signed out.");
            } else {
                info("Nobody is signed in.");
            }
        }
        AuthAction::Status => {
            // Status never refreshes: it only reports what is stored.
            match load_session(&pool.conn, &cfg.storage_key)? {
                Some(s) => {
                    let expires = Local
                        .timestamp_opt(s.expires_at, 0)
                        .single()
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .ok_or_else(|| AppError::InvalidTime(s.expires_at.to_string()))?;

                    success(format!("Signed in as {} (user {})", s.display_name(), s.user_id));
                    if s.needs_refresh() {
                        warning(format!(
                            "Access token expired at {}; it is refreshed on the next online command",
                            expires
                        ));
                    } else {
                        info(format!("Access token valid until {}", expires));
                    }
                }
                None => info("Not signed in."),
            }
        }
    }

    Ok(())
}
