use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    BoardServiceError, ColumnDraft, ColumnId, ColumnRepository, EntityKind, ProjectDraft,
    ProjectId, ProjectRepository, ScopeCorruption, SqliteColumnRepository,
    SqliteProjectRepository, SqliteTaskRepository, Task, TaskDraft, TaskPatch, TaskService,
    TaskStatus, TASK_SCOPE,
};
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn project(conn: &Connection) -> ProjectId {
    SqliteProjectRepository::try_new(conn)
        .unwrap()
        .create_project(&ProjectDraft::new(Uuid::new_v4(), "Board"), None)
        .unwrap()
        .uuid
}

fn column(conn: &Connection, project: ProjectId, name: &str) -> ColumnId {
    SqliteColumnRepository::try_new(conn)
        .unwrap()
        .create_column(&ColumnDraft::new(project, name), None)
        .unwrap()
        .uuid
}

fn create_tasks(
    service: &TaskService<SqliteTaskRepository<'_>>,
    column: ColumnId,
    titles: &[&str],
) -> Vec<Task> {
    titles
        .iter()
        .map(|title| {
            service
                .create_task(TaskDraft::new(column, *title), None)
                .unwrap()
        })
        .collect()
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn create_inherits_project_from_column() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let project = project(&conn);
    let todo = column(&conn, project, "Todo");

    let task = service
        .create_task(TaskDraft::new(todo, "  Write docs "), None)
        .unwrap();

    assert_eq!(task.project_uuid, project);
    assert_eq!(task.title, "Write docs");
    assert_eq!(task.status, TaskStatus::Idle);
    assert_eq!(task.position, 1);
}

#[test]
fn create_in_unknown_column_is_not_found() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let err = service
        .create_task(TaskDraft::new(Uuid::new_v4(), "t"), None)
        .unwrap_err();
    assert!(matches!(
        err,
        BoardServiceError::NotFound {
            kind: EntityKind::Column,
            ..
        }
    ));
}

#[test]
fn delete_middle_task_compacts_column() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B", "C"]);

    service.delete_task(created[1].uuid).unwrap();

    let remaining = service.list_tasks(todo).unwrap();
    assert_eq!(titles(&remaining), vec!["A", "C"]);
    assert_eq!(remaining[0].position, 1);
    assert_eq!(remaining[1].position, 2);
}

#[test]
fn deleting_the_only_task_leaves_an_empty_column() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A"]);

    let changes = service.delete_task(created[0].uuid).unwrap();

    assert_eq!(changes.len(), 1);
    assert!(service.list_tasks(todo).unwrap().is_empty());
}

#[test]
fn move_within_column_updates_positions() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B", "C"]);

    let moved = service.move_task(created[2].uuid, 1).unwrap();

    assert_eq!(moved.item.position, 1);
    assert_eq!(titles(&service.list_tasks(todo).unwrap()), vec!["C", "A", "B"]);
}

#[test]
fn relocate_keeps_both_columns_dense() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let project = project(&conn);
    let todo = column(&conn, project, "Todo");
    let done = column(&conn, project, "Done");
    let todo_tasks = create_tasks(&service, todo, &["A", "B", "C"]);
    create_tasks(&service, done, &["X", "Y"]);

    let (task, relocation) = service
        .relocate_task(todo_tasks[0].uuid, done, Some(2))
        .unwrap();

    assert_eq!(task.uuid, todo_tasks[0].uuid);
    assert_eq!(task.column_uuid, done);
    assert_eq!(task.position, 2);
    assert_eq!(relocation.source.removed(), Some((task.uuid, 1)));
    assert_eq!(relocation.target.inserted(), Some((task.uuid, 2)));

    assert_eq!(titles(&service.list_tasks(todo).unwrap()), vec!["B", "C"]);
    assert_eq!(titles(&service.list_tasks(done).unwrap()), vec!["X", "A", "Y"]);
    for scope in [todo, done] {
        assert!(TASK_SCOPE.inspect(&conn, scope).unwrap().is_healthy());
    }
}

#[test]
fn relocate_without_position_appends() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let project = project(&conn);
    let todo = column(&conn, project, "Todo");
    let done = column(&conn, project, "Done");
    let created = create_tasks(&service, todo, &["A"]);
    create_tasks(&service, done, &["X"]);

    let (task, relocation) = service.relocate_task(created[0].uuid, done, None).unwrap();

    assert_eq!(task.position, 2);
    assert_eq!(relocation.target.len(), 1);
    assert!(service.list_tasks(todo).unwrap().is_empty());
}

#[test]
fn relocate_into_same_column_is_a_move() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B", "C"]);

    let (task, relocation) = service.relocate_task(created[0].uuid, todo, None).unwrap();

    assert_eq!(task.position, 3);
    assert!(relocation.target.is_empty());
    assert_eq!(titles(&service.list_tasks(todo).unwrap()), vec!["B", "C", "A"]);
}

#[test]
fn relocate_across_projects_is_rejected() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let elsewhere = column(&conn, project(&conn), "Other");
    let created = create_tasks(&service, todo, &["A"]);

    let err = service
        .relocate_task(created[0].uuid, elsewhere, None)
        .unwrap_err();

    assert!(matches!(err, BoardServiceError::CrossProjectMove { .. }));
    assert!(err.is_client_error());
    assert_eq!(service.list_tasks(todo).unwrap(), created);
}

#[test]
fn failed_relocation_rolls_back_the_source_column() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let project = project(&conn);
    let todo = column(&conn, project, "Todo");
    let done = column(&conn, project, "Done");
    let created = create_tasks(&service, todo, &["A", "B"]);

    let err = service
        .relocate_task(created[0].uuid, done, Some(5))
        .unwrap_err();

    assert!(matches!(
        err,
        BoardServiceError::InvalidPosition {
            requested: 5,
            max: 1
        }
    ));
    assert_eq!(service.list_tasks(todo).unwrap(), created);
    assert!(service.list_tasks(done).unwrap().is_empty());
}

#[test]
fn update_changes_fields_but_not_position() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B"]);

    let updated = service
        .update_task(
            created[1].uuid,
            TaskPatch {
                status: Some(TaskStatus::Done),
                priority: Some(3),
                description: Some(Some("  ".to_string())),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.priority, 3);
    assert_eq!(updated.description, None);
    assert_eq!(updated.position, 2);
    assert_eq!(updated.title, "B");
}

#[test]
fn gap_in_column_is_reported_then_repaired() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B", "C"]);
    conn.execute(
        "UPDATE tasks SET position = 7 WHERE uuid = ?1;",
        [created[2].uuid.to_string()],
    )
    .unwrap();

    let err = service.move_task(created[0].uuid, 2).unwrap_err();
    assert!(matches!(
        err,
        BoardServiceError::ScopeCorrupted(ScopeCorruption::PositionOutOfRange { position: 7, .. })
    ));

    TASK_SCOPE.compact(&conn, todo).unwrap();
    let moved = service.move_task(created[0].uuid, 2).unwrap();
    assert_eq!(moved.item.position, 2);
    assert_eq!(titles(&service.list_tasks(todo).unwrap()), vec!["B", "A", "C"]);
}

#[test]
fn assignee_is_set_on_create_and_cleared_by_update() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let user = Uuid::new_v4();
    let mut draft = TaskDraft::new(todo, "Review PR");
    draft.assignee_id = Some(user);

    let task = service.create_task(draft, None).unwrap();
    assert_eq!(task.assignee_id, Some(user));

    let untouched = service
        .update_task(
            task.uuid,
            TaskPatch {
                priority: Some(1),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(untouched.assignee_id, Some(user));

    let cleared = service
        .update_task(
            task.uuid,
            TaskPatch {
                assignee_id: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.assignee_id, None);
    assert_eq!(cleared.position, 1);
    assert!(service.list_tasks_for_assignee(user).unwrap().is_empty());
}

#[test]
fn assigned_tasks_are_listed_across_projects_in_board_order() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();
    let first_project = project(&conn);
    let second_project = project(&conn);
    let todo = column(&conn, first_project, "Todo");
    let elsewhere = column(&conn, second_project, "Backlog");
    let created = create_tasks(&service, todo, &["A", "B", "C"]);
    let remote = create_tasks(&service, elsewhere, &["D"]);
    for (task, assignee) in [
        (&created[2], user),
        (&created[0], user),
        (&created[1], other),
        (&remote[0], user),
    ] {
        service
            .update_task(
                task.uuid,
                TaskPatch {
                    assignee_id: Some(Some(assignee)),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
    }

    let assigned = service.list_tasks_for_assignee(user).unwrap();

    assert_eq!(assigned.len(), 3);
    assert!(assigned.iter().all(|task| task.assignee_id == Some(user)));
    let in_todo: Vec<&Task> = assigned
        .iter()
        .filter(|task| task.column_uuid == todo)
        .collect();
    let positions: Vec<u32> = in_todo.iter().map(|task| task.position).collect();
    assert_eq!(positions, vec![1, 3]);
    let todo_at = assigned
        .iter()
        .position(|task| task.column_uuid == todo)
        .unwrap();
    assert_eq!(assigned[todo_at + 1].column_uuid, todo);
    assert_eq!(titles(&service.list_tasks_for_assignee(other).unwrap()), vec!["B"]);
}

#[test]
fn assignee_survives_relocation() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let project = project(&conn);
    let todo = column(&conn, project, "Todo");
    let done = column(&conn, project, "Done");
    let user = Uuid::new_v4();
    let mut draft = TaskDraft::new(todo, "Ship");
    draft.assignee_id = Some(user);
    let task = service.create_task(draft, None).unwrap();

    let (relocated, _) = service.relocate_task(task.uuid, done, None).unwrap();

    assert_eq!(relocated.assignee_id, Some(user));
    let assigned = service.list_tasks_for_assignee(user).unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].column_uuid, done);
    assert_eq!(assigned[0].position, 1);
}

#[test]
fn same_column_relocation_without_position_lands_last() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B", "C", "D"]);

    let (task, relocation) = service.relocate_task(created[1].uuid, todo, None).unwrap();

    assert_eq!(task.position, 4);
    assert_eq!(relocation.source.len(), 3);
    assert_eq!(
        titles(&service.list_tasks(todo).unwrap()),
        vec!["A", "C", "D", "B"]
    );
}

#[test]
fn listed_tasks_preview_the_same_changes_as_a_move() {
    let conn = setup();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let todo = column(&conn, project(&conn), "Todo");
    let created = create_tasks(&service, todo, &["A", "B", "C"]);

    let preview =
        taskboard_core::reorder::move_to(&service.list_tasks(todo).unwrap(), created[1].uuid, 1)
            .unwrap();
    let moved = service.move_task(created[1].uuid, 1).unwrap();

    assert_eq!(preview.len(), 2);
    assert_eq!(preview, moved.changes);
}
