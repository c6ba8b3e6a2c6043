pub mod detect;
pub mod extract;
pub mod watcher;

pub use watcher::Watcher;
