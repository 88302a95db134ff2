//! One handler per top-level command group.

mod column;
mod maintenance;
mod project;
mod task;

pub use column::{handle_board_command, handle_column_command};
pub use maintenance::{handle_check_command, handle_repair_command};
pub use project::handle_project_command;
pub use task::handle_task_command;
