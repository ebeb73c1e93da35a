pub mod attachment_repo;
pub mod connection;
pub mod migrations;
pub mod session_repo;
pub mod setor_repo;
pub mod task_repo;
pub mod user_repo;

pub use connection::*;
