//! CLI module for the task timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `navigator`: Where tapped notifications lead in the terminal

pub mod commands;
pub mod display;
pub mod navigator;

pub use commands::{Cli, Commands, TaskArgs};
pub use display::Display;
pub use navigator::TerminalNavigator;
