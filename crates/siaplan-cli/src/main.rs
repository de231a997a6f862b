mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "siaplan",
    version,
    about = "Treatment plan generator: render plans to PDF and import them back"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a treatment plan PDF from a plan JSON file
    Generate {
        /// Path to the plan JSON file
        plan_file: PathBuf,

        /// Template settings JSON file (default: the saved user settings)
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Output PDF path (default: TreatmentPlan_<patient>_<date>.pdf)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Recover plan fields from a previously generated or legacy PDF
    Parse {
        /// Path to the PDF file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the recovered plan to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inspect or reset the fee schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// Inspect or reset the template settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// List the active fee schedule
    List,
    /// Show whether the stored schedule is current, outdated or absent
    Status,
    /// Replace the stored schedule with the shipped default
    Reset,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the active template settings as JSON
    Show,
    /// Discard saved template settings and return to the defaults
    Reset,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            plan_file,
            settings,
            out,
        } => commands::generate::run(plan_file, settings, out),
        Commands::Parse {
            input_file,
            output,
            out,
        } => commands::parse::run(input_file, &output, out),
        Commands::Schedule { action } => match action {
            ScheduleAction::List => commands::schedule::list(),
            ScheduleAction::Status => commands::schedule::status(),
            ScheduleAction::Reset => commands::schedule::reset(),
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(),
            SettingsAction::Reset => commands::settings::reset(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
