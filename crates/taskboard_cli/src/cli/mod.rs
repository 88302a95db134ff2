//! CLI command handlers.

pub mod commands;

pub use commands::{
    handle_board_command, handle_check_command, handle_column_command, handle_project_command,
    handle_repair_command, handle_task_command,
};

use serde::Serialize;

/// Writes `value` as pretty JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
