//! Task commands

mod add;
mod delete;
mod mv;
mod rename;

pub use add::CreateTask;
pub use delete::DeleteTask;
pub use mv::MoveTask;
pub use rename::RenameTask;
