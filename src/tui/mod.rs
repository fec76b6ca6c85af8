//! Terminal user interface.
//!
//! Screens: register, login, patient form, assessment result.

mod app;
pub mod styles;
pub mod ui;
mod worker;

pub use app::{App, Screen};
