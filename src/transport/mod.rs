//! Command-line transport

pub mod cli;

pub use cli::{
    config_command, AccountsCommand, CliSession, CoderCommand, ConfigCommand, GithubCommand,
    PmCommand, ProjectsCommand,
};
