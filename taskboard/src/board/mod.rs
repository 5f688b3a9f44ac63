//! Board commands

mod create;
mod delete;
mod get;
mod member;
mod remove_member;
mod update;
mod update_member;

pub use create::CreateBoard;
pub use delete::DeleteBoard;
pub use get::GetBoard;
pub use member::AddMember;
pub use remove_member::RemoveMember;
pub use update::UpdateBoard;
pub use update_member::UpdateMemberRole;
