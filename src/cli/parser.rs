use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for healthlog
/// CLI client to log health events on a hosted backend
#[derive(Parser)]
#[command(
    name = "healthlog",
    version = env!("CARGO_PKG_VERSION"),
    about = "A simple health-event tracker: log categorized events and review them by day, week and month",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Read views from the local mirror instead of the backend
    #[arg(global = true, long = "offline")]
    pub offline: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Run configuration file migrations if needed")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the local database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Sign up, log in, log out, show the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Manage event categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage event types
    Type {
        #[command(subcommand)]
        action: TypeAction,
    },

    /// Create the default categories and event types
    Seed,

    /// Log a health event
    Add {
        /// Event type (id or name)
        #[arg(value_name = "TYPE")]
        event_type: String,

        #[arg(long, short, help = "Restrict the type lookup to this category (id or name)")]
        category: Option<String>,

        #[arg(long, short, help = "Free-text notes")]
        notes: Option<String>,

        #[arg(long, short, help = "Day the event counts for (YYYY-MM-DD, default: today)")]
        date: Option<String>,

        #[arg(long, short, help = "Local time of day (HH:MM, default: now)")]
        time: Option<String>,
    },

    /// Change the type and/or notes of an event
    Edit {
        /// Event id
        id: String,

        #[arg(long = "type", value_name = "TYPE", help = "New event type (id or name)")]
        event_type: Option<String>,

        #[arg(long, short, help = "New notes (empty string clears them)")]
        notes: Option<String>,
    },

    /// Delete an event by id
    Del {
        id: String,

        #[arg(long, short, help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Events of one day
    Day {
        /// YYYY-MM-DD (default: today)
        date: Option<String>,
    },

    /// Weekly summary
    Week {
        #[arg(
            long,
            default_value_t = 0,
            allow_hyphen_values = true,
            help = "Weeks relative to the current one (-1 = last week)"
        )]
        offset: i64,
    },

    /// Monthly calendar
    Month {
        /// YYYY-MM (default: current month)
        month: Option<String>,

        #[arg(
            long,
            default_value_t = 0,
            allow_hyphen_values = true,
            help = "Months relative to MONTH (-1 = previous)"
        )]
        offset: i32,
    },

    /// List events over a period
    List {
        #[arg(long, short, help = "Filter by year/month/day, a custom range or 'all'")]
        period: Option<String>,

        #[arg(long, help = "Only events whose type no longer exists")]
        orphans: bool,
    },

    /// Show or edit the note of a day (stored locally)
    Note {
        /// YYYY-MM-DD (default: today)
        date: Option<String>,

        #[arg(long, conflicts_with = "clear", help = "Set the note text")]
        set: Option<String>,

        #[arg(long, help = "Remove the note")]
        clear: bool,
    },

    /// Refresh the local mirror from the backend
    Sync,

    /// Follow realtime changes and replay them into the local mirror
    Watch {
        #[arg(long, help = "Stop after this many changes")]
        max: Option<usize>,
    },

    /// Export events
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Restore events from a JSON export
    Import {
        #[arg(long, value_name = "FILE")]
        file: String,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account
    Signup {
        email: String,
        #[arg(long, help = "Password (else $HEALTHLOG_PASSWORD, else prompt)")]
        password: Option<String>,
    },
    /// Sign in
    Login {
        email: String,
        #[arg(long, help = "Password (else $HEALTHLOG_PASSWORD, else prompt)")]
        password: Option<String>,
        #[arg(long, help = "Create the account when sign-in fails")]
        create: bool,
    },
    /// Sign out and forget the local session
    Logout,
    /// Show the current session
    Status,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category
    Add { name: String },
    /// List categories and their event types
    List,
    /// Delete a category and its event types
    Del {
        /// Category id or name
        category: String,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TypeAction {
    /// Create an event type inside a category
    Add {
        /// Category id or name
        category: String,
        name: String,
    },
    /// List event types
    List {
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Delete an event type
    Del {
        /// Event type id or name
        event_type: String,
        #[arg(long, short)]
        yes: bool,
    },
}
