pub mod create;
pub mod delete;
pub mod list;
pub mod update;

pub use create::CreateHostnameUseCase;
pub use delete::DeleteHostnameUseCase;
pub use list::ListHostnamesUseCase;
pub use update::UpdateHostnameUseCase;
