//! Task command handlers.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;
use taskboard_core::{SqliteTaskRepository, TaskDraft, TaskPatch, TaskService};

use crate::cli::print_json;
use crate::TaskCommands;

pub fn handle_task_command(cmd: TaskCommands, conn: &Connection) -> Result<()> {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);

    match cmd {
        TaskCommands::Create {
            column,
            title,
            description,
            status,
            priority,
            assignee,
            position,
        } => {
            let mut draft = TaskDraft::new(column, title);
            draft.description = description;
            draft.priority = priority;
            draft.assignee_id = assignee;
            if let Some(status) = status {
                draft.status = status;
            }
            print_json(&service.create_task(draft, position)?)
        }
        TaskCommands::List { column } => print_json(&service.list_tasks(column)?),
        TaskCommands::Assigned { assignee } => {
            print_json(&service.list_tasks_for_assignee(assignee)?)
        }
        TaskCommands::Get { id } => print_json(&service.get_task(id)?),
        TaskCommands::Update {
            id,
            title,
            description,
            clear_description,
            status,
            priority,
            assignee,
            clear_assignee,
        } => {
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                status,
                priority,
                assignee_id: if clear_assignee {
                    Some(None)
                } else {
                    assignee.map(Some)
                },
            };
            print_json(&service.update_task(id, patch)?)
        }
        TaskCommands::Move { id, to } => print_json(&service.move_task(id, to)?),
        TaskCommands::Relocate {
            id,
            column,
            position,
        } => {
            let (task, relocation) = service.relocate_task(id, column, position)?;
            print_json(&json!({
                "item": task,
                "source_changes": relocation.source,
                "target_changes": relocation.target,
            }))
        }
        TaskCommands::Delete { id } => print_json(&service.delete_task(id)?),
    }
}
