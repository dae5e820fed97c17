//! Terminal user interface: the list, detail, and editor screens plus the
//! event loop driving them. The UI never talks to storage directly; every
//! command goes through the controllers.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
