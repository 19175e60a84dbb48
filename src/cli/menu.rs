//! Interactive text menu
//!
//! A numbered menu over the backup operations. All input goes through a
//! [`Prompter`] and all output through a writer, so the loop can be driven
//! from tests. An operation that fails prints an error and the loop goes on.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::settings::Settings;
use crate::display::{format_archive_list, format_backup_outcome, format_source_tree};
use crate::error::{ArchivistError, ArchivistResult};

/// Source of user answers
pub trait Prompter {
    /// Show `message` and read one line
    ///
    /// Returns `None` at end of input.
    fn prompt(&mut self, message: &str) -> ArchivistResult<Option<String>>;
}

/// Prompts on stdout and reads from stdin
pub struct StdinPrompter<R> {
    input: R,
}

impl StdinPrompter<io::StdinLock<'static>> {
    /// Prompter over the process's stdin
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> StdinPrompter<R> {
    /// Prompter over any buffered reader
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Prompter for StdinPrompter<R> {
    fn prompt(&mut self, message: &str) -> ArchivistResult<Option<String>> {
        print!("{}", message);
        io::stdout().flush()?;

        // Raw bytes so a non-UTF-8 line is an invalid answer, not an I/O error
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }
}

/// Menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateBackup,
    ListBackups,
    ViewSource,
    Restore,
    DeleteAll,
    Exit,
}

impl MenuChoice {
    /// Parse a menu answer such as `"3"`
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::CreateBackup),
            "2" => Some(Self::ListBackups),
            "3" => Some(Self::ViewSource),
            "4" => Some(Self::Restore),
            "5" => Some(Self::DeleteAll),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

const MENU_TEXT: &str = "\
MAIN MENU:
1. Create Backup Now
2. List Backups
3. View Source Folder
4. Restore Backup
5. Delete All Backups
6. Exit";

const RULE: &str = "--------------------------------------------------";

/// The interactive menu loop
pub struct Menu<'a, P, W> {
    settings: &'a Settings,
    manager: BackupManager,
    prompter: P,
    out: W,
}

impl<'a, P: Prompter, W: Write> Menu<'a, P, W> {
    /// Create a menu over the given settings
    pub fn new(settings: &'a Settings, prompter: P, out: W) -> Self {
        Self {
            settings,
            manager: BackupManager::new(settings.clone()),
            prompter,
            out,
        }
    }

    /// Run until the user exits or input ends
    ///
    /// Only failures writing to the output end the loop with an error.
    pub fn run(&mut self) -> ArchivistResult<()> {
        writeln!(self.out, "Source folder:    {}", self.settings.source_dir.display())?;
        writeln!(self.out, "Backup folder:    {}", self.settings.archive_dir.display())?;
        writeln!(self.out, "Retention policy: {} day(s)", self.settings.retention_days)?;

        loop {
            writeln!(self.out)?;
            writeln!(self.out, "{}", RULE)?;
            writeln!(self.out, "{}", MENU_TEXT)?;
            writeln!(self.out, "{}", RULE)?;
            self.out.flush()?;

            let Some(answer) = self.prompter.prompt("Choose an option (1-6): ")? else {
                writeln!(self.out)?;
                return Ok(());
            };

            let Some(choice) = MenuChoice::parse(&answer) else {
                writeln!(self.out, "Invalid choice. Please try again.")?;
                continue;
            };

            if choice == MenuChoice::Exit {
                writeln!(self.out, "Goodbye!")?;
                return Ok(());
            }

            match self.dispatch(choice) {
                Ok(Some(text)) => write!(self.out, "{}", ensure_newline(text))?,
                Ok(None) => return Ok(()),
                Err(e) => writeln!(self.out, "Error: {}", e)?,
            }
        }
    }

    /// Run one menu action, returning its output or `None` at end of input
    fn dispatch(&mut self, choice: MenuChoice) -> ArchivistResult<Option<String>> {
        match choice {
            MenuChoice::CreateBackup => {
                let outcome = self.manager.create_backup()?;
                Ok(Some(format_backup_outcome(&outcome)))
            }
            MenuChoice::ListBackups => {
                let backups = self.manager.list_backups()?;
                Ok(Some(format_archive_list(&backups)))
            }
            MenuChoice::ViewSource => format_source_tree(&self.settings.source_dir).map(Some),
            MenuChoice::Restore => self.restore(),
            MenuChoice::DeleteAll => self.delete_all(),
            MenuChoice::Exit => Ok(Some(String::new())),
        }
    }

    fn restore(&mut self) -> ArchivistResult<Option<String>> {
        let backups = self.manager.list_backups()?;
        if backups.is_empty() {
            return Ok(Some("No backups to restore.".to_string()));
        }

        writeln!(self.out, "Choose a backup to restore:")?;
        for (i, backup) in backups.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, backup.filename)?;
        }

        let Some(answer) = self
            .prompter
            .prompt(&format!("Select (1-{}): ", backups.len()))?
        else {
            return Ok(None);
        };

        let selected = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| backups.get(i))
            .ok_or_else(|| ArchivistError::Validation(format!("Invalid selection: '{}'", answer)))?;

        let Some(target) = self.prompter.prompt(&format!(
            "Restore to folder (empty for '{}'): ",
            self.settings.restore_dir.display()
        ))?
        else {
            return Ok(None);
        };

        let destination = if target.is_empty() {
            self.settings.restore_dir.clone()
        } else {
            PathBuf::from(target)
        };

        let result = RestoreManager::new(&self.settings.restore_dir)
            .restore(&selected.path, Some(&destination))?;
        Ok(Some(result.summary()))
    }

    fn delete_all(&mut self) -> ArchivistResult<Option<String>> {
        let Some(answer) = self.prompter.prompt("Delete ALL backups? (y/n): ")? else {
            return Ok(None);
        };

        if !answer.eq_ignore_ascii_case("y") {
            return Ok(Some("Cancelled.".to_string()));
        }

        if self.manager.purge_backups()? {
            Ok(Some("All backups deleted.".to_string()))
        } else {
            Ok(Some("Backup folder does not exist.".to_string()))
        }
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
