//! Project command handlers.

use anyhow::Result;
use rusqlite::Connection;
use taskboard_core::{ProjectDraft, ProjectPatch, ProjectService, SqliteProjectRepository};

use crate::cli::print_json;
use crate::ProjectCommands;

pub fn handle_project_command(cmd: ProjectCommands, conn: &Connection) -> Result<()> {
    let service = ProjectService::new(SqliteProjectRepository::try_new(conn)?);

    match cmd {
        ProjectCommands::Create {
            owner,
            name,
            description,
            status,
            position,
        } => {
            let mut draft = ProjectDraft::new(owner, name);
            draft.description = description;
            if let Some(status) = status {
                draft.status = status;
            }
            print_json(&service.create_project(draft, position)?)
        }
        ProjectCommands::List { owner } => print_json(&service.list_projects(owner)?),
        ProjectCommands::Get { id } => print_json(&service.get_project(id)?),
        ProjectCommands::Update {
            id,
            name,
            description,
            clear_description,
            status,
        } => {
            let patch = ProjectPatch {
                name,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                status,
            };
            print_json(&service.update_project(id, patch)?)
        }
        ProjectCommands::Move { id, to } => print_json(&service.move_project(id, to)?),
        ProjectCommands::Delete { id } => print_json(&service.delete_project(id)?),
    }
}
