//! Command-line interface for `deck`.
//!
//! This module provides the CLI parsing and command routing using clap.
//! Every command runs against one store built from the resolved config,
//! after the two-phase initialization (seed, then hydrate).

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use deck_core::{
    HydrationOutcome, Notifications, Priority, ProjectStatus, Role, SortKey, Status, Store,
};

use crate::config::DeckConfig;
use crate::logging;

/// `deck` - Issue tracker entity store.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(
    author,
    version,
    about = "Issue tracker entity store (seed dataset + JSON snapshot)",
    long_about = None,
    after_help = "State lives in <data dir>/<storage key>.json; delete it or run `deck reset` to start over."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Data directory holding config.yaml and the snapshot
    #[arg(long, global = true, env = "DECK_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Workspace, collection counts and overall completion
    Summary,

    /// List issues
    List(ListArgs),

    /// Issues grouped by status
    Board(FilterArgs),

    /// Stats summary (alias: status)
    #[command(alias = "status")]
    Stats,

    /// Report dangling references
    Check(CheckArgs),

    /// Manage issues
    Issue(IssueCommand),

    /// Manage labels
    Label(LabelCommand),

    /// Manage projects
    Project(ProjectCommand),

    /// Manage users
    User(UserCommand),

    /// Manage teams and membership
    Team(TeamCommand),

    /// Workspace settings
    Workspace(WorkspaceCommand),

    /// Replace all data with the seed dataset
    Reset(ResetArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Facet filters shared by `list` and `board`.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Status facet (repeatable or comma-separated)
    #[arg(long, short = 's', value_delimiter = ',')]
    pub status: Vec<Status>,

    /// Priority facet
    #[arg(long, short = 'p', value_delimiter = ',')]
    pub priority: Vec<Priority>,

    /// Assignee facet (user id, email or name)
    #[arg(long, short = 'a', value_delimiter = ',')]
    pub assignee: Vec<String>,

    /// Project facet (project id or name)
    #[arg(long, value_delimiter = ',')]
    pub project: Vec<String>,

    /// Case-insensitive text search over identifier, title and description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Sort by priority, status, updated, created, title or identifier
    #[arg(long, default_value = "priority")]
    pub sort: SortKey,

    /// Reverse the sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Show at most N issues
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    /// Exit with an error if anything dangles
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct IssueCommand {
    #[command(subcommand)]
    pub command: IssueSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum IssueSubcommand {
    /// Create an issue
    Create(IssueCreateArgs),

    /// Show one issue
    Show {
        /// Issue id or identifier (e.g. ENG-7)
        issue: String,
    },

    /// Update an issue
    Update(IssueUpdateArgs),

    /// Delete one or more issues
    Delete {
        /// Issue ids or identifiers
        #[arg(required = true)]
        issues: Vec<String>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct IssueCreateArgs {
    /// Issue title
    #[arg(long)]
    pub title: String,

    /// Owning team (id or identifier, e.g. ENG)
    #[arg(long)]
    pub team: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "backlog")]
    pub status: Status,

    #[arg(long, default_value = "none")]
    pub priority: Priority,

    /// Assignee (user id, email or name)
    #[arg(long)]
    pub assignee: Option<String>,

    /// Project (id or name)
    #[arg(long)]
    pub project: Option<String>,

    /// Label (id or name); repeatable
    #[arg(long = "label", value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Estimate in points
    #[arg(long)]
    pub estimate: Option<u32>,

    /// Author (user id, email or name); defaults to the first user
    #[arg(long)]
    pub created_by: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct IssueUpdateArgs {
    /// Issue id or identifier
    pub issue: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<Status>,

    #[arg(long)]
    pub priority: Option<Priority>,

    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<String>,

    /// Clear the assignee
    #[arg(long)]
    pub unassign: bool,

    #[arg(long, conflicts_with = "no_project")]
    pub project: Option<String>,

    /// Clear the project
    #[arg(long)]
    pub no_project: bool,

    /// Move to another team (id or identifier)
    #[arg(long)]
    pub team: Option<String>,

    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,

    #[arg(long)]
    pub clear_due: bool,

    #[arg(long, conflicts_with = "clear_estimate")]
    pub estimate: Option<u32>,

    #[arg(long)]
    pub clear_estimate: bool,

    /// Add a label (id or name); repeatable
    #[arg(long, value_delimiter = ',')]
    pub add_label: Vec<String>,

    /// Remove a label (id or name); repeatable
    #[arg(long, value_delimiter = ',')]
    pub remove_label: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LabelCommand {
    #[command(subcommand)]
    pub command: LabelSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum LabelSubcommand {
    /// List labels
    List,

    /// Create a label
    Create {
        #[arg(long)]
        name: String,
        /// Hex color
        #[arg(long, default_value = "#6b7280")]
        color: String,
    },

    /// Delete a label (issues keep the id unless integrity is cascade)
    Delete {
        /// Label id or name
        label: String,
    },
}

#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects with issue-derived completion
    List,

    /// Create a project
    Create(ProjectCreateArgs),

    /// Delete a project
    Delete {
        /// Project id or name
        project: String,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ProjectCreateArgs {
    #[arg(long)]
    pub name: String,

    /// Owning team (id or identifier)
    #[arg(long)]
    pub team: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "📦")]
    pub icon: String,

    #[arg(long, default_value = "#5e6ad2")]
    pub color: String,

    #[arg(long, default_value = "planned")]
    pub status: ProjectStatus,

    /// 0-100
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: u8,

    /// Lead (user id, email or name)
    #[arg(long)]
    pub lead: Option<String>,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UserSubcommand {
    /// List users with their workload
    List,

    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "member")]
        role: Role,
        /// Teams to join (id or identifier)
        #[arg(long = "team", value_delimiter = ',')]
        teams: Vec<String>,
    },

    /// Delete a user
    Delete {
        /// User id, email or name
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct TeamCommand {
    #[command(subcommand)]
    pub command: TeamSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamSubcommand {
    /// List teams
    List,

    /// Create a team
    Create {
        #[arg(long)]
        name: String,
        /// Issue identifier prefix, e.g. OPS
        #[arg(long)]
        identifier: String,
        #[arg(long, default_value = "👥")]
        icon: String,
    },

    /// Delete a team
    Delete {
        /// Team id or identifier
        team: String,
    },

    /// Add a user to a team
    Join {
        /// Team id or identifier
        team: String,
        /// User id, email or name
        user: String,
    },

    /// Remove a user from a team
    Leave {
        team: String,
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct WorkspaceCommand {
    #[command(subcommand)]
    pub command: WorkspaceSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceSubcommand {
    /// Show workspace settings
    Show,

    /// Change workspace settings
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// all, mentions or none
        #[arg(long)]
        notifications: Option<Notifications>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ResetArgs {
    /// Delete the snapshot file instead of writing the seed into it
    #[arg(long)]
    pub purge: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

/// State shared by every command handler.
#[derive(Debug)]
pub struct CommandContext {
    pub store: Store,
    pub config: DeckConfig,
    pub hydration: HydrationOutcome,
    pub json: bool,
}

impl CommandContext {
    /// Build and hydrate the store described by `config`.
    #[must_use]
    pub fn open(config: DeckConfig, json: bool) -> Self {
        let mut store = config.build_store();
        let hydration = store.hydrate();
        Self {
            store,
            config,
            hydration,
            json,
        }
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let Some(command) = cli.command else {
        println!("deck - issue tracker entity store. Use --help for usage.");
        return Ok(());
    };

    if let Commands::Completions(args) = &command {
        return commands::completions::execute(args);
    }

    let config = DeckConfig::load(cli.data_dir.as_deref())?;
    let mut ctx = CommandContext::open(config, cli.json);
    tracing::debug!(command = command.name(), hydration = ?ctx.hydration, "Dispatching");

    match command {
        Commands::Summary => commands::summary::execute(&ctx),
        Commands::List(args) => commands::list::execute(&args, &ctx),
        Commands::Board(args) => commands::board::execute(&args, &ctx),
        Commands::Stats => commands::stats::execute(&ctx),
        Commands::Check(args) => commands::check::execute(&args, &ctx),
        Commands::Issue(cmd) => commands::issue::execute(cmd.command, &mut ctx),
        Commands::Label(cmd) => commands::label::execute(cmd.command, &mut ctx),
        Commands::Project(cmd) => commands::project::execute(cmd.command, &mut ctx),
        Commands::User(cmd) => commands::user::execute(cmd.command, &mut ctx),
        Commands::Team(cmd) => commands::team::execute(cmd.command, &mut ctx),
        Commands::Workspace(cmd) => commands::workspace::execute(cmd.command, &mut ctx),
        Commands::Reset(args) => commands::reset::execute(&args, &mut ctx),
        Commands::Completions(args) => commands::completions::execute(&args),
    }
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::List(_) => "list",
            Self::Board(_) => "board",
            Self::Stats => "stats",
            Self::Check(_) => "check",
            Self::Issue(issue) => match issue.command {
                IssueSubcommand::Create(_) => "issue create",
                IssueSubcommand::Show { .. } => "issue show",
                IssueSubcommand::Update(_) => "issue update",
                IssueSubcommand::Delete { .. } => "issue delete",
            },
            Self::Label(label) => match label.command {
                LabelSubcommand::List => "label list",
                LabelSubcommand::Create { .. } => "label create",
                LabelSubcommand::Delete { .. } => "label delete",
            },
            Self::Project(project) => match project.command {
                ProjectSubcommand::List => "project list",
                ProjectSubcommand::Create(_) => "project create",
                ProjectSubcommand::Delete { .. } => "project delete",
            },
            Self::User(user) => match user.command {
                UserSubcommand::List => "user list",
                UserSubcommand::Create { .. } => "user create",
                UserSubcommand::Delete { .. } => "user delete",
            },
            Self::Team(team) => match team.command {
                TeamSubcommand::List => "team list",
                TeamSubcommand::Create { .. } => "team create",
                TeamSubcommand::Delete { .. } => "team delete",
                TeamSubcommand::Join { .. } => "team join",
                TeamSubcommand::Leave { .. } => "team leave",
            },
            Self::Workspace(workspace) => match workspace.command {
                WorkspaceSubcommand::Show => "workspace show",
                WorkspaceSubcommand::Set { .. } => "workspace set",
            },
            Self::Reset(_) => "reset",
            Self::Completions(_) => "completions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_facets_parse() {
        let cli = Cli::try_parse_from([
            "deck", "list", "--status", "todo,in-progress", "-p", "high", "--sort", "updated",
        ])
        .unwrap();
        let Some(Commands::List(args)) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.filters.status, vec![Status::Todo, Status::InProgress]);
        assert_eq!(args.filters.priority, vec![Priority::High]);
        assert_eq!(args.sort, SortKey::Updated);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        assert!(Cli::try_parse_from(["deck", "list", "--status", "blocked"]).is_err());
    }

    #[test]
    fn test_update_conflicting_flags() {
        assert!(
            Cli::try_parse_from(["deck", "issue", "update", "ENG-1", "--assignee", "1", "--unassign"])
                .is_err()
        );
    }
}
