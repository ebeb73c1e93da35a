pub mod attachment;
pub mod setor;
pub mod task;
pub mod user;

pub use attachment::*;
pub use setor::*;
pub use task::*;
pub use user::*;
