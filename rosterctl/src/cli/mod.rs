//! Command-line surface of `rosterctl`.

pub mod render;
pub mod roles;
pub mod tui;
pub mod users;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use roster_core::{Dashboard, FileStorage};
use roster_model::{Permission, SortKey, StatusFilter, UserStatus};
use tracing::warn;

use crate::config::{ConfigLoader, LoadedConfig, RosterConfig};

#[derive(Debug, Parser)]
#[command(
    name = "rosterctl",
    version,
    about = "Roster user and role administration"
)]
pub struct Cli {
    /// TOML config file (default: <config dir>/roster/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Extra KEY=VALUE settings read before the process environment
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
    /// Directory holding the persisted snapshots
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, add, edit and delete users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// List, add, edit and delete roles
    Roles {
        #[command(subcommand)]
        action: RolesAction,
    },
    /// Full-screen terminal UI with Users and Roles tabs
    Tui,
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Show users after filtering, searching and sorting
    List(ListUsersArgs),
    /// Add a user; last login is set to now
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long, default_value_t = UserStatus::Active)]
        status: UserStatus,
    },
    /// Edit a user; omitted flags keep the current value
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        status: Option<UserStatus>,
    },
    /// Delete a user
    Rm { id: u64 },
}

#[derive(Debug, Args)]
pub struct ListUsersArgs {
    /// active, inactive or all
    #[arg(long, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,
    /// Exact role name
    #[arg(long)]
    pub role: Option<String>,
    /// Only users created within the recent window
    #[arg(long)]
    pub recent: bool,
    /// Case-insensitive match on name or email
    #[arg(long)]
    pub search: Option<String>,
    /// id, name, email, role, status, lastLogin or createdAt
    #[arg(long, default_value_t = SortKey::Name)]
    pub sort: SortKey,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum RolesAction {
    /// Show all roles
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a role
    Add {
        #[arg(long, default_value = "")]
        name: String,
        /// read, write or delete; repeat or comma-separate
        #[arg(long = "permission", value_delimiter = ',')]
        permissions: Vec<Permission>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit a role; omitted flags keep the current value
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        grant: Vec<Permission>,
        #[arg(long, value_delimiter = ',')]
        revoke: Vec<Permission>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a role
    Rm { id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

impl Cli {
    pub fn loader(&self) -> ConfigLoader {
        let mut loader = ConfigLoader::from_process_env();
        if let Some(path) = &self.config {
            loader = loader.config_file(path);
        }
        if let Some(path) = &self.env_file {
            loader = loader.env_file(path);
        }
        if let Some(dir) = &self.data_dir {
            loader = loader.data_dir(dir);
        }
        loader
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let loaded = cli.loader().load().context("failed to load configuration")?;
    for warning in &loaded.warnings.items {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Users { action } => {
            let mut dashboard = open_dashboard(&loaded.config);
            users::run(&mut dashboard, action, &mut out)
        }
        Command::Roles { action } => {
            let mut dashboard = open_dashboard(&loaded.config);
            roles::run(&mut dashboard, action, &mut out)
        }
        Command::Tui => {
            drop(out);
            let mut dashboard = open_dashboard(&loaded.config);
            tui::run_tui(&mut dashboard)
        }
        Command::Config { action } => match action {
            ConfigAction::Show => show_config(&loaded, &mut out),
        },
    }
}

pub fn open_dashboard(config: &RosterConfig) -> Dashboard {
    let storage = FileStorage::new(&config.data_dir);
    Dashboard::load(storage, config.dashboard_options())
}

fn show_config(loaded: &LoadedConfig, out: &mut dyn Write) -> Result<()> {
    let text = loaded
        .config
        .to_toml()
        .context("failed to serialize configuration")?;
    match &loaded.config_file {
        Some(path) => writeln!(out, "# from {}", path.display())?,
        None => writeln!(out, "# defaults (no config file)")?,
    }
    write!(out, "{text}")?;
    Ok(())
}
