//! CLI command handlers
//!
//! Each subcommand lives in its own module; shared wiring is in [`helpers`].

pub mod complete;
pub mod config;
pub mod evaluate;
pub mod helpers;
pub mod history;
pub mod register;
pub mod serve;
