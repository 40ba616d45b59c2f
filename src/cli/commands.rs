use clap::{Args, Parser, Subcommand};

use crate::model::task::FilterMode;

#[derive(Parser)]
#[command(name = "tl", about = concat!("tally v", env!("CARGO_PKG_VERSION"), " - a local task list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a commented config.toml
    Init(InitArgs),
    /// List tasks (the default command)
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Mark a task done, or not done if it already is
    Toggle(IndexArgs),
    /// Change a task's text and/or due date
    Edit(EditArgs),
    /// Delete a task
    Rm(ConfirmIndexArgs),
    /// Delete every task
    Clear(ConfirmArgs),
    /// Mark every task done
    DoneAll,
    /// Mark every task not done
    UndoneAll,
    /// Show completion progress
    Progress,
    /// Show a motivational quote
    Quote,
    /// Show the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Which tasks to show: all, pending or completed (default from config)
    #[arg(long, short)]
    pub filter: Option<FilterMode>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Due date, e.g. "2025-06-01 14:30" or "06/01/2025 2:30 PM" (default: now)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Task number as shown by `tl list`
    pub index: usize,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task number as shown by `tl list`
    pub index: usize,
    /// New text (default: keep the current text)
    pub text: Vec<String>,
    /// New due date (past dates allowed)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct ConfirmIndexArgs {
    /// Task number as shown by `tl list`
    pub index: usize,
    /// Don't ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ConfirmArgs {
    /// Don't ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show at most this many entries
    #[arg(long, default_value = "10")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_filter(args: &[&str]) -> Result<Option<FilterMode>, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Some(Commands::List(list)) => Ok(list.filter),
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn filter_flag_uses_filter_mode_parsing() {
        assert_eq!(list_filter(&["tl", "list"]).unwrap(), None);
        assert_eq!(
            list_filter(&["tl", "list", "-f", "pending"]).unwrap(),
            Some(FilterMode::Pending)
        );
        assert_eq!(
            list_filter(&["tl", "list", "--filter", "Completed"]).unwrap(),
            Some(FilterMode::Completed)
        );
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let err = list_filter(&["tl", "list", "-f", "overdue"]).unwrap_err();
        assert!(err.to_string().contains("unknown filter 'overdue'"));
    }
}
