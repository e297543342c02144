pub mod check;
pub mod compile;
pub mod init;
pub mod publish;
pub mod render;

pub use check::{check, CheckArgs};
pub use compile::{compile, CompileArgs};
pub use init::{init, InitArgs};
pub use publish::{publish, PublishArgs};
pub use render::{render, RenderArgs};
