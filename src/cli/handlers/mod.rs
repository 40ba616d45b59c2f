mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::dialog::TerminalDialog;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery;
use crate::io::storage::FileStorage;
use crate::model::config::Config;
use crate::model::quote;
use crate::ops::controller::{Controller, Dialog, Resolution};
use crate::ops::store::{TaskError, TaskStore};
use crate::parse::date_parser;

type CmdResult = Result<ExitCode, Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref().map(Path::new));
    let command = cli
        .command
        .unwrap_or_else(|| Commands::List(ListArgs::default()));

    match command {
        // These don't touch the task list
        Commands::Init(args) => cmd_init(args, &data_dir).map(|()| ExitCode::SUCCESS),
        Commands::Quote => cmd_quote(json),
        Commands::Recovery(args) => cmd_recovery(args, &data_dir, json),

        Commands::List(args) => Session::open(data_dir)?.cmd_list(args, json),
        Commands::Add(args) => Session::open(data_dir)?.cmd_add(args, json),
        Commands::Toggle(args) => Session::open(data_dir)?.cmd_toggle(args),
        Commands::Edit(args) => Session::open(data_dir)?.cmd_edit(args),
        Commands::Rm(args) => Session::open(data_dir)?.cmd_rm(args),
        Commands::Clear(args) => Session::open(data_dir)?.cmd_clear(args),
        Commands::DoneAll => Session::open(data_dir)?.cmd_mark_all(true),
        Commands::UndoneAll => Session::open(data_dir)?.cmd_mark_all(false),
        Commands::Progress => Session::open(data_dir)?.cmd_progress(json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a 1-based task number from the command line to a list index.
fn task_index(number: usize) -> Result<usize, Box<dyn std::error::Error>> {
    number
        .checked_sub(1)
        .ok_or_else(|| "task numbers start at 1".into())
}

/// Restate store errors in the 1-based numbering the user typed.
fn user_error(e: TaskError) -> Box<dyn std::error::Error> {
    match e {
        TaskError::IndexOutOfRange { index, len } => {
            format!("no task {} (the list has {})", index + 1, len).into()
        }
        other => other.into(),
    }
}

fn parse_due(raw: &str) -> Result<chrono::NaiveDateTime, Box<dyn std::error::Error>> {
    date_parser::parse_due_input(raw).map_err(|e| format!("invalid --due: {}", e).into())
}

/// Alerts mean the command did nothing, which is a failure for scripts.
fn exit_code(alerts: usize) -> ExitCode {
    if alerts > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A task list opened from the data directory, with its config.
struct Session {
    data_dir: PathBuf,
    config: Config,
    controller: Controller<FileStorage>,
}

impl Session {
    fn open(data_dir: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config_io::read_config(&data_dir)?;
        let storage = FileStorage::new(&data_dir, config.storage.slot.as_str());
        let mut controller = Controller::new(TaskStore::open(storage));
        controller.set_filter(config.display.default_filter);
        log::debug!(
            "opened {} tasks from {}",
            controller.tasks().len(),
            data_dir.display()
        );
        Ok(Session {
            data_dir,
            config,
            controller,
        })
    }

    fn dialog(&self, yes: bool) -> TerminalDialog<std::io::StdinLock<'static>, std::io::Stderr> {
        TerminalDialog::stdio(yes || !self.config.confirm.deletes)
    }

    /// Show alerts and resolve confirmations, then report any failed save.
    fn finish<D: Dialog>(&mut self, dialog: &mut D) -> Result<Resolution, Box<dyn std::error::Error>> {
        let resolution = self.controller.present(dialog).map_err(user_error)?;
        self.check_saved()?;
        Ok(resolution)
    }

    fn check_saved(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        match self.controller.store_mut().take_save_error() {
            None => Ok(()),
            Some(e) => Err(format!(
                "could not save tasks: {} (the unsaved list was copied to {})",
                e,
                recovery::recovery_log_path(&self.data_dir).display()
            )
            .into()),
        }
    }

    // -----------------------------------------------------------------------
    // Read commands
    // -----------------------------------------------------------------------

    fn cmd_list(&mut self, args: ListArgs, json: bool) -> CmdResult {
        if let Some(filter) = args.filter {
            self.controller.set_filter(filter);
        }
        let c = &self.controller;
        let visible = c.visible();

        if json {
            print_json(&ListJson {
                filter: c.filter(),
                tasks: visible.iter().map(|(i, t)| task_to_json(*i, t)).collect(),
                counts: c.counts(),
                progress: progress_to_json(c.progress()),
            })?;
        } else {
            for line in format_listing(
                &visible,
                &c.counts(),
                &c.progress(),
                c.filter(),
                &self.config.display,
            ) {
                println!("{}", line);
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_progress(&mut self, json: bool) -> CmdResult {
        let progress = self.controller.progress();
        if json {
            print_json(&progress_to_json(progress))?;
        } else {
            println!("{}", format_progress_bar(&progress));
        }
        Ok(ExitCode::SUCCESS)
    }

    // -----------------------------------------------------------------------
    // Write commands
    // -----------------------------------------------------------------------

    fn cmd_add(&mut self, args: AddArgs, json: bool) -> CmdResult {
        if let Some(raw) = &args.due {
            let due = parse_due(raw)?;
            if self.controller.select_due(due) != due {
                eprintln!("note: due date is in the past, using now");
            }
        }

        let mut dialog = self.dialog(false);
        let added = self.controller.submit_new_task(&args.text.join(" "));
        self.finish(&mut dialog)?;

        if let Some(index) = added {
            let task = &self.controller.tasks()[index];
            if json {
                print_json(&task_to_json(index, task))?;
            } else {
                println!("Added {}. {}", index + 1, task.description);
            }
        }
        Ok(exit_code(dialog.alerts_shown()))
    }

    fn cmd_toggle(&mut self, args: IndexArgs) -> CmdResult {
        let index = task_index(args.index)?;
        let completed = self.controller.toggle(index).map_err(user_error)?;
        self.check_saved()?;

        let task = &self.controller.tasks()[index];
        let state = if completed { "Done" } else { "Not done" };
        println!("{}: {}. {}", state, args.index, task.description);
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_edit(&mut self, args: EditArgs) -> CmdResult {
        if args.text.is_empty() && args.due.is_none() {
            return Err("nothing to change (give new text and/or --due)".into());
        }
        let index = task_index(args.index)?;
        self.controller.begin_edit(index).map_err(user_error)?;
        if !args.text.is_empty() {
            self.controller.set_edit_text(&args.text.join(" "));
        }
        if let Some(raw) = &args.due {
            self.controller.set_edit_due(parse_due(raw)?);
        }

        let mut dialog = self.dialog(false);
        let saved = self.controller.commit_edit().map_err(user_error)?;
        self.finish(&mut dialog)?;

        if saved {
            let task = &self.controller.tasks()[index];
            println!(
                "Updated {}. {} (due {})",
                args.index,
                task.description,
                format_datetime(&task.due, &self.config.display.date_format)
            );
        }
        Ok(exit_code(dialog.alerts_shown()))
    }

    fn cmd_rm(&mut self, args: ConfirmIndexArgs) -> CmdResult {
        let index = task_index(args.index)?;
        self.controller.request_delete(index).map_err(user_error)?;

        let mut dialog = self.dialog(args.yes);
        match self.finish(&mut dialog)? {
            Resolution::Deleted(task) => println!("Deleted: {}", task.description),
            Resolution::Cancelled => println!("cancelled"),
            _ => {}
        }
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_clear(&mut self, args: ConfirmArgs) -> CmdResult {
        self.controller.request_delete_all();

        let mut dialog = self.dialog(args.yes);
        match self.finish(&mut dialog)? {
            Resolution::Cleared(count) => println!("Deleted {} tasks", count),
            Resolution::Cancelled => println!("cancelled"),
            _ => {}
        }
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_mark_all(&mut self, completed: bool) -> CmdResult {
        let changed = if completed {
            self.controller.mark_all_done()
        } else {
            self.controller.mark_all_undone()
        };
        self.check_saved()?;

        let state = if completed { "done" } else { "not done" };
        println!("Marked {} tasks {}", changed, state);
        Ok(ExitCode::SUCCESS)
    }
}

// ---------------------------------------------------------------------------
// Standalone commands
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct QuoteJson {
    quote: &'static str,
}

fn cmd_quote(json: bool) -> CmdResult {
    let quote = quote::random_quote();
    if json {
        print_json(&QuoteJson { quote })?;
    } else {
        println!("{}", quote);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_recovery(args: RecoveryArgs, data_dir: &Path, json: bool) -> CmdResult {
    let entries = recovery::read_recovery_entries(data_dir, Some(args.limit));
    if json {
        let out: Vec<RecoveryEntryJson> = entries.iter().map(recovery_entry_to_json).collect();
        print_json(&out)?;
        return Ok(ExitCode::SUCCESS);
    }

    if entries.is_empty() {
        println!("No recovery entries.");
        return Ok(ExitCode::SUCCESS);
    }
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_recovery_entry(entry) {
            println!("{}", line);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_numbers_are_one_based() {
        assert_eq!(task_index(1).unwrap(), 0);
        assert_eq!(task_index(12).unwrap(), 11);
        assert!(task_index(0).is_err());
    }

    #[test]
    fn index_errors_use_task_numbers() {
        let e = user_error(TaskError::IndexOutOfRange { index: 4, len: 2 });
        assert_eq!(e.to_string(), "no task 5 (the list has 2)");

        let e = user_error(TaskError::Validation("empty".to_string()));
        assert_eq!(e.to_string(), "empty");
    }

    #[test]
    fn bad_due_is_reported() {
        let e = parse_due("next tuesday").unwrap_err();
        assert!(e.to_string().starts_with("invalid --due:"));
        assert!(parse_due("2025-06-01 14:30").is_ok());
    }
}
