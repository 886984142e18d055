use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::host::sim::Quirks;

#[derive(Parser)]
#[command(name = "calcheck", about = concat!("[x] calcheck v", env!("CARGO_PKG_VERSION"), " - checkboxes for calendar tasks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read settings from a TOML file (missing fields keep their defaults)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to a file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive demo over a simulated calendar (default)
    Demo(DemoArgs),
    /// Parse a title's task marker
    Parse(ParseArgs),
    /// Toggle one simulated entry and report what got saved
    Simulate(SimulateArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Host elements the simulated calendar should leave out
#[derive(Args, Default, Clone, Copy)]
pub struct QuirkArgs {
    /// Event popover has no edit button
    #[arg(long)]
    pub omit_edit_trigger: bool,
    /// Edit modal has no title input
    #[arg(long)]
    pub omit_title_input: bool,
    /// Edit modal has no save button
    #[arg(long)]
    pub omit_save_control: bool,
}

impl From<QuirkArgs> for Quirks {
    fn from(args: QuirkArgs) -> Self {
        Quirks {
            omit_edit_trigger: args.omit_edit_trigger,
            omit_title_input: args.omit_title_input,
            omit_save_control: args.omit_save_control,
        }
    }
}

#[derive(Args, Default)]
pub struct DemoArgs {
    #[command(flatten)]
    pub quirks: QuirkArgs,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Event title, e.g. "[x] Buy milk"
    pub title: String,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Title of the simulated event
    #[arg(long, default_value = "[ ] Buy milk")]
    pub title: String,
    /// Place the event in the time grid instead of the all-day row
    #[arg(long)]
    pub timed: bool,
    /// How many times to click the checkbox
    #[arg(long, default_value_t = 1)]
    pub toggles: u32,
    /// Pause between clicks, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub gap_ms: u64,
    #[command(flatten)]
    pub quirks: QuirkArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_simulate_flags() {
        let cli = Cli::try_parse_from([
            "calcheck",
            "simulate",
            "--toggles",
            "3",
            "--omit-edit-trigger",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Simulate(args)) => {
                assert_eq!(args.toggles, 3);
                assert_eq!(args.title, "[ ] Buy milk");
                let quirks = Quirks::from(args.quirks);
                assert!(quirks.omit_edit_trigger);
                assert!(!quirks.omit_save_control);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_no_subcommand_means_demo() {
        let cli = Cli::try_parse_from(["calcheck", "-c", "cal.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("cal.toml")));
    }
}
