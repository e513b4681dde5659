//! Subcommands. Each returns the text to print on success.

pub mod check;
pub mod dev;
pub mod generate;
pub mod init;
pub mod route;
