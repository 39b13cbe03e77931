pub mod todo;
pub mod user;

pub use todo::{Todo, TodoInput, TodoPatch};
pub use user::User;
