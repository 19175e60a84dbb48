use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use archivist::backup::seed_demo_source;
use archivist::cli::{handle_backup_command, BackupCommands, Menu, StdinPrompter};
use archivist::config::{paths::ArchivistPaths, settings::Settings, SettingsOverrides};
use archivist::display::format_source_tree;

#[derive(Parser)]
#[command(
    name = "archivist",
    version,
    about = "Timestamped ZIP backups of a folder with age-based retention",
    long_about = "Archivist archives a source folder into backup_YYYYMMDD_HHMMSS.zip \
                  files, lists and restores them, and deletes archives older than \
                  the retention threshold. Run without a command for the interactive menu."
)]
struct Cli {
    /// Folder to back up
    #[arg(long, global = true, env = "ARCHIVIST_SOURCE")]
    source: Option<PathBuf>,

    /// Folder where archives are stored
    #[arg(long, global = true, env = "ARCHIVIST_ARCHIVE_DIR")]
    archive_dir: Option<PathBuf>,

    /// Delete archives older than this many days
    #[arg(long, global = true, env = "ARCHIVIST_RETENTION_DAYS")]
    retention_days: Option<u32>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Create the source folder with demo files if it does not exist
    Seed,

    /// Show the contents of the source folder
    Source,

    /// Launch the interactive menu
    Menu,

    /// Show current configuration and paths
    Config {
        /// Write the effective settings to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = ArchivistPaths::new()?;
    let settings = Settings::load_or_create(&paths)?.with_overrides(SettingsOverrides {
        source_dir: cli.source,
        archive_dir: cli.archive_dir,
        retention_days: cli.retention_days,
    });

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&settings, cmd)?;
        }
        Some(Commands::Seed) => match seed_demo_source(&settings.source_dir)? {
            Some(created) => {
                println!("Created '{}' with:", settings.source_dir.display());
                for path in created {
                    println!("  {}", path.display());
                }
            }
            None => {
                println!(
                    "'{}' already exists, nothing seeded.",
                    settings.source_dir.display()
                );
            }
        },
        Some(Commands::Source) => {
            print!("{}", format_source_tree(&settings.source_dir)?);
        }
        Some(Commands::Config { save }) => {
            println!("Archivist Configuration");
            println!("=======================");
            println!("Config file:      {}", paths.settings_file().display());
            println!("Source folder:    {}", settings.source_dir.display());
            println!("Backup folder:    {}", settings.archive_dir.display());
            println!("Restore folder:   {}", settings.restore_dir.display());
            println!("Retention:        {} day(s)", settings.retention_days);
            println!("Sweep on backup:  {}", settings.sweep_after_backup);

            if save {
                settings.save(&paths)?;
                println!();
                println!("Settings saved.");
            }
        }
        Some(Commands::Menu) | None => {
            let stdout = std::io::stdout();
            Menu::new(&settings, StdinPrompter::stdin(), stdout.lock()).run()?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
