//! # Taskboard CLI
//!
//! Command-line front end for the board core: projects, columns and tasks
//! with dense ordering. Every command prints JSON on stdout.

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskboard_core::{BoardServiceError, LoggingError, ProjectStatus, TaskStatus};
use uuid::Uuid;

use cli::{
    handle_board_command, handle_check_command, handle_column_command, handle_project_command,
    handle_repair_command, handle_task_command,
};

/// Exit code for caller mistakes (unknown ids, invalid positions, blank names).
const EXIT_CLIENT_ERROR: u8 = 2;
/// Exit code for storage failures and corrupted scopes.
const EXIT_SERVER_ERROR: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "Ordered projects, columns and tasks on a local SQLite board")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "TASKBOARD_DB", default_value = "taskboard.db")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error); defaults by build mode
    #[arg(long, env = "TASKBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rotated log files, relative to the working directory
    /// unless absolute; logging is off when unset
    #[arg(long, env = "TASKBOARD_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Project operations (ordered per owner)
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Column operations (ordered per project)
    #[command(subcommand)]
    Column(ColumnCommands),

    /// Task operations (ordered per column)
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show one project's columns with their tasks
    Board {
        #[arg(value_name = "PROJECT_UUID")]
        project: Uuid,
    },

    /// Validate every ordered scope in the database
    Check,

    /// Renumber one scope to 1..N, keeping its current order
    Repair {
        /// Which ordered table the scope belongs to
        #[arg(value_enum)]
        table: ScopeKind,
        /// Owner id, project id or column id of the scope
        #[arg(value_name = "SCOPE_UUID")]
        scope: Uuid,
    },

    /// Print the core version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeKind {
    Projects,
    Columns,
    Tasks,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create a project, appended unless a position is given
    Create {
        #[arg(long)]
        owner: Uuid,
        /// Project name (defaults to "Unnamed")
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,
        /// 1-based target position
        #[arg(long)]
        position: Option<u32>,
    },
    /// List an owner's projects in order
    List {
        #[arg(long)]
        owner: Uuid,
    },
    /// Show one project
    Get {
        #[arg(value_name = "UUID")]
        id: Uuid,
    },
    /// Update name, description or status
    Update {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long, value_parser = parse_project_status)]
        status: Option<ProjectStatus>,
    },
    /// Move a project to a new position
    Move {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        to: u32,
    },
    /// Delete a project with its columns and tasks
    Delete {
        #[arg(value_name = "UUID")]
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum ColumnCommands {
    /// Create a column, appended unless a position is given
    Create {
        #[arg(long)]
        project: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: Option<u32>,
    },
    /// List a project's columns in order
    List {
        #[arg(long)]
        project: Uuid,
    },
    /// Rename a column
    Rename {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        name: String,
    },
    /// Move a column to a new position
    Move {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        to: u32,
    },
    /// Delete a column with its tasks
    Delete {
        #[arg(value_name = "UUID")]
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    /// Create a task, appended unless a position is given
    Create {
        #[arg(long)]
        column: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_task_status)]
        status: Option<TaskStatus>,
        #[arg(long, default_value_t = 0)]
        priority: i32,
        /// User the task is assigned to
        #[arg(long)]
        assignee: Option<Uuid>,
        #[arg(long)]
        position: Option<u32>,
    },
    /// List a column's tasks in order
    List {
        #[arg(long)]
        column: Uuid,
    },
    /// List one user's assigned tasks across projects
    Assigned {
        #[arg(long)]
        assignee: Uuid,
    },
    /// Show one task
    Get {
        #[arg(value_name = "UUID")]
        id: Uuid,
    },
    /// Update title, description, status, priority or assignee
    Update {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long, value_parser = parse_task_status)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long, conflicts_with = "clear_assignee")]
        assignee: Option<Uuid>,
        /// Unassign the task
        #[arg(long)]
        clear_assignee: bool,
    },
    /// Move a task inside its column
    Move {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        to: u32,
    },
    /// Move a task into another column of the same project
    Relocate {
        #[arg(value_name = "UUID")]
        id: Uuid,
        #[arg(long)]
        column: Uuid,
        /// Target position; appends when omitted
        #[arg(long)]
        position: Option<u32>,
    },
    /// Delete a task
    Delete {
        #[arg(value_name = "UUID")]
        id: Uuid,
    },
}

fn parse_project_status(value: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(value)
        .ok_or_else(|| format!("unknown project status `{value}`; expected pending|active|completed|archived"))
}

fn parse_task_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value)
        .ok_or_else(|| format!("unknown task status `{value}`; expected idle|in_progress|done"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Maps a failed run to its exit code.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    let client_error = err
        .downcast_ref::<BoardServiceError>()
        .is_some_and(BoardServiceError::is_client_error)
        || err
            .downcast_ref::<LoggingError>()
            .is_some_and(LoggingError::is_client_error);
    if client_error {
        EXIT_CLIENT_ERROR
    } else {
        EXIT_SERVER_ERROR
    }
}

/// Anchors a relative log directory at the working directory.
fn resolve_log_dir(log_dir: &Path) -> anyhow::Result<PathBuf> {
    if log_dir.is_absolute() {
        return Ok(log_dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    Ok(cwd.join(log_dir))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| taskboard_core::default_log_level());
        let log_dir = resolve_log_dir(log_dir)?;
        taskboard_core::init_logging(level, &log_dir).context("failed to initialize logging")?;
    }

    if let Commands::Version = cli.command {
        return cli::print_json(&serde_json::json!({
            "version": taskboard_core::core_version(),
        }));
    }

    let conn = taskboard_core::open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Commands::Project(cmd) => handle_project_command(cmd, &conn),
        Commands::Column(cmd) => handle_column_command(cmd, &conn),
        Commands::Task(cmd) => handle_task_command(cmd, &conn),
        Commands::Board { project } => handle_board_command(project, &conn),
        Commands::Check => handle_check_command(&conn),
        Commands::Repair { table, scope } => handle_repair_command(table, scope, &conn),
        Commands::Version => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        exit_code_for, resolve_log_dir, Cli, Commands, ProjectCommands, ScopeKind, TaskCommands,
        EXIT_CLIENT_ERROR, EXIT_SERVER_ERROR,
    };
    use anyhow::Context;
    use clap::{CommandFactory, Parser};
    use std::path::Path;
    use taskboard_core::{BoardServiceError, EntityKind, LoggingError, TaskStatus};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_task_relocate_without_position() {
        let column = uuid::Uuid::new_v4();
        let id = uuid::Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "taskboard",
            "task",
            "relocate",
            &id.to_string(),
            "--column",
            &column.to_string(),
        ])
        .unwrap();
        match cli.command {
            Commands::Task(TaskCommands::Relocate {
                id: parsed,
                column: target,
                position,
            }) => {
                assert_eq!(parsed, id);
                assert_eq!(target, column);
                assert_eq!(position, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_status_and_repair_scope() {
        let column = uuid::Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "taskboard",
            "task",
            "create",
            "--column",
            &column.to_string(),
            "--title",
            "Write docs",
            "--status",
            "in_progress",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommands::Create {
                status: Some(TaskStatus::InProgress),
                ..
            })
        ));

        let cli = Cli::try_parse_from([
            "taskboard",
            "repair",
            "columns",
            &uuid::Uuid::nil().to_string(),
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Repair {
                table: ScopeKind::Columns,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_project_status() {
        let owner = uuid::Uuid::new_v4();
        let result = Cli::try_parse_from([
            "taskboard",
            "project",
            "create",
            "--owner",
            &owner.to_string(),
            "--status",
            "paused",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "taskboard",
            "project",
            "create",
            "--owner",
            &owner.to_string(),
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Project(ProjectCommands::Create { position: None, .. })
        ));
    }

    #[test]
    fn relative_log_dir_is_anchored_at_the_working_directory() {
        let resolved = resolve_log_dir(Path::new("logs")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::env::current_dir().unwrap().join("logs"));

        let absolute = std::env::temp_dir().join("taskboard-logs");
        assert_eq!(resolve_log_dir(&absolute).unwrap(), absolute);
    }

    #[test]
    fn logging_misconfiguration_exits_as_a_client_error() {
        let err = Err::<(), _>(LoggingError::UnsupportedLevel("loud".to_string()))
            .context("failed to initialize logging")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_CLIENT_ERROR);

        let err = Err::<(), _>(LoggingError::Backend("disk full".to_string()))
            .context("failed to initialize logging")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_SERVER_ERROR);

        let err = anyhow::Error::new(BoardServiceError::InvalidName(EntityKind::Task));
        assert_eq!(exit_code_for(&err), EXIT_CLIENT_ERROR);
    }

    #[test]
    fn parses_task_assignment_flags() {
        let id = uuid::Uuid::new_v4();
        let user = uuid::Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "taskboard",
            "task",
            "update",
            &id.to_string(),
            "--assignee",
            &user.to_string(),
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommands::Update {
                assignee: Some(parsed),
                clear_assignee: false,
                ..
            }) if parsed == user
        ));

        let conflicting = Cli::try_parse_from([
            "taskboard",
            "task",
            "update",
            &id.to_string(),
            "--assignee",
            &user.to_string(),
            "--clear-assignee",
        ]);
        assert!(conflicting.is_err());

        let cli = Cli::try_parse_from([
            "taskboard",
            "task",
            "assigned",
            "--assignee",
            &user.to_string(),
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommands::Assigned { assignee }) if assignee == user
        ));
    }
}
