//! Terminal front end: screens, modal dialogs, and the draw loop.
mod app;
mod forms;
mod helpers;
mod nav;
mod screens;
mod terminal;
mod theme;

pub use app::App;
pub use terminal::run_app;
