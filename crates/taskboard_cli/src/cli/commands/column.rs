//! Column and board command handlers.

use anyhow::Result;
use rusqlite::Connection;
use taskboard_core::{
    ColumnDraft, ColumnService, SqliteColumnRepository, SqliteTaskRepository,
};
use uuid::Uuid;

use crate::cli::print_json;
use crate::ColumnCommands;

type SqliteColumnService<'conn> =
    ColumnService<SqliteColumnRepository<'conn>, SqliteTaskRepository<'conn>>;

fn column_service(conn: &Connection) -> Result<SqliteColumnService<'_>> {
    Ok(ColumnService::new(
        SqliteColumnRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    ))
}

pub fn handle_column_command(cmd: ColumnCommands, conn: &Connection) -> Result<()> {
    let service = column_service(conn)?;

    match cmd {
        ColumnCommands::Create {
            project,
            name,
            position,
        } => print_json(&service.create_column(ColumnDraft::new(project, name), position)?),
        ColumnCommands::List { project } => print_json(&service.list_columns(project)?),
        ColumnCommands::Rename { id, name } => print_json(&service.rename_column(id, &name)?),
        ColumnCommands::Move { id, to } => print_json(&service.move_column(id, to)?),
        ColumnCommands::Delete { id } => print_json(&service.delete_column(id)?),
    }
}

pub fn handle_board_command(project: Uuid, conn: &Connection) -> Result<()> {
    print_json(&column_service(conn)?.board(project)?)
}
