//! CLI argument definitions for `mentorhub`

use chrono::NaiveDate;
use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mentorhub::config::ConfigOverrides;
use mentorhub::logger::Level;

/// CLI log level argument
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

/// API profile argument
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum ProfileArg {
    /// Local backend
    Development,
    /// Deployed backend
    Production,
}

impl std::fmt::Display for ProfileArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    Get {
        /// Configuration key (e.g., `level`, `api_base`, `token_ttl_hours`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum AuthSubcommand {
    /// Sign in and keep the token
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Request a new account
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Student number
        #[arg(long)]
        student_number: String,
        /// Password
        #[arg(long)]
        password: String,
    },
    /// Check whether a student number is free
    CheckStudentNumber {
        /// Student number
        student_number: String,
    },
    /// Check whether an email is free
    CheckEmail {
        /// Email address
        email: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PlanSubcommand {
    /// List the group's curriculum
    List,
    /// Create a plan (mentor)
    Create {
        /// Title
        #[arg(long)]
        title: String,
        /// Description
        #[arg(long)]
        content: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Mentees submit an assignment for this plan
        #[arg(long)]
        assignment: bool,
    },
    /// Update a plan (mentor)
    Update {
        /// Plan id
        plan_id: i64,
        /// Title
        #[arg(long)]
        title: String,
        /// Description
        #[arg(long)]
        content: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Mentees submit an assignment for this plan
        #[arg(long)]
        assignment: bool,
    },
    /// Delete a plan (mentor)
    Delete {
        /// Plan id
        plan_id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubmissionSubcommand {
    /// Show your submission for a plan
    Show {
        /// Plan id
        plan_id: i64,
    },
    /// Submit a URL and password for a plan
    Submit {
        /// Plan id
        plan_id: i64,
        /// Submitted URL
        #[arg(long)]
        url: String,
        /// Password for the URL
        #[arg(long)]
        password: String,
    },
    /// Replace your submission's URL and password
    Edit {
        /// Plan id
        plan_id: i64,
        /// Submitted URL
        #[arg(long)]
        url: String,
        /// Password for the URL
        #[arg(long)]
        password: String,
    },
    /// Delete your submission
    Delete {
        /// Plan id
        plan_id: i64,
    },
    /// Review every submission for a plan (mentor)
    Review {
        /// Plan id
        plan_id: i64,
        /// Also print passwords
        #[arg(long)]
        details: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ActivitySubcommand {
    /// List the group's activities
    List,
    /// Show one activity
    Show {
        /// Activity id
        activity_id: i64,
    },
    /// Record an activity (mentor); everyone not listed is marked present
    Create {
        /// Title
        #[arg(long)]
        title: String,
        /// Description
        #[arg(long)]
        content: String,
        /// Week, `1`..`20` or `3주차`
        #[arg(long)]
        week: String,
        /// Student numbers marked absent
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
        /// Student numbers marked as made up
        #[arg(long, value_delimiter = ',')]
        makeup: Vec<String>,
        /// Photo to attach
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Edit an activity (mentor)
    Update {
        /// Activity id
        activity_id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        content: Option<String>,
        /// New week
        #[arg(long)]
        week: Option<String>,
        /// Student numbers marked absent
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
        /// Student numbers marked as made up
        #[arg(long, value_delimiter = ',')]
        makeup: Vec<String>,
        /// Photo to attach
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Delete an activity (mentor)
    Delete {
        /// Activity id
        activity_id: i64,
    },
    /// Your attendance per week and rate
    Attendance,
    /// Attendance of every week (mentor)
    Weeks,
}

#[derive(Debug, Subcommand)]
pub enum GroupSubcommand {
    /// Show group detail, roster and your role
    Show,
    /// Add a mentee (mentor)
    Add {
        /// Student number
        student_number: String,
    },
    /// Remove a mentee (mentor)
    Remove {
        /// Student number
        student_number: String,
    },
    /// Issue a warning (mentor)
    Warn {
        /// Student number
        student_number: String,
    },
    /// Warning counts per mentee
    Warnings,
    /// Update name, description or image (mentor)
    Update {
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        content: Option<String>,
        /// New image
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AnnouncementSubcommand {
    /// List announcements
    List,
    /// Show one announcement
    Show {
        /// Announcement id
        id: i64,
    },
    /// Publish an announcement
    Create {
        /// Title
        #[arg(long)]
        title: String,
        /// Body
        #[arg(long)]
        content: String,
    },
    /// Edit an announcement
    Update {
        /// Announcement id
        id: i64,
        /// Title
        #[arg(long)]
        title: String,
        /// Body
        #[arg(long)]
        content: String,
    },
    /// Delete an announcement
    Delete {
        /// Announcement id
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ApprovalSubcommand {
    /// Registrations waiting for approval
    List,
    /// Approve a registration
    Approve {
        /// Student number
        student_number: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ThemeArg {
    /// Show the current theme
    Show,
    /// Dark theme
    Dark,
    /// Light theme
    Light,
    /// Switch theme
    Toggle,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Sign in, sign out and registration
    Auth {
        #[command(subcommand)]
        subcommand: AuthSubcommand,
    },
    /// Your profile and groups
    Me,
    /// Curriculum of a group
    Plan {
        /// Group id
        #[arg(short, long)]
        group: i64,
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },
    /// Assignment submissions of a group
    Submission {
        /// Group id
        #[arg(short, long)]
        group: i64,
        #[command(subcommand)]
        subcommand: SubmissionSubcommand,
    },
    /// Weekly activities and attendance of a group
    Activity {
        /// Group id
        #[arg(short, long)]
        group: i64,
        #[command(subcommand)]
        subcommand: ActivitySubcommand,
    },
    /// Group detail and membership
    Group {
        /// Group id
        #[arg(short, long)]
        group: i64,
        #[command(subcommand)]
        subcommand: GroupSubcommand,
    },
    /// Site announcements
    Announcement {
        #[command(subcommand)]
        subcommand: AnnouncementSubcommand,
    },
    /// Member approval queue (admin)
    Approval {
        #[command(subcommand)]
        subcommand: ApprovalSubcommand,
    },
    /// Dark/light theme preference
    Theme {
        /// What to do
        #[arg(value_enum, default_value_t = ThemeArg::Show)]
        action: ThemeArg,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "mentorhub",
    about = "Mentoring LMS command-line client",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override the API base URL (e.g. `http://localhost:8080/api/v1`)
    #[arg(long = "api-base", value_name = "URL")]
    pub api_base: Option<String>,

    /// Override the API profile used to compute the base URL
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides; `None` means no override
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self
                .config_log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            verbose: self.config_verbose,
            api_base: self.api_base.clone(),
            profile: self.profile.map(|p| p.to_string()),
        }
    }
}
