mod simulate;
pub use simulate::simulate;

use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::model::Config;
use crate::parse::parse_marker;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config = config_io::load_config(cli.config.as_deref())?;

    match cli.command {
        None => cmd_demo(DemoArgs::default(), config, cli.config),
        Some(cmd) => match cmd {
            Commands::Demo(args) => cmd_demo(args, config, cli.config),
            Commands::Parse(args) => cmd_parse(args, json),
            Commands::Simulate(args) => cmd_simulate(args, config, json),
            Commands::Config => cmd_config(&config, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_demo(
    args: DemoArgs,
    config: Config,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    crate::tui::run(config, args.quirks.into(), config_path)
}

fn cmd_parse(args: ParseArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let marker = parse_marker(&args.title);
    if json {
        let out = MarkerJson::from_marker(marker.as_ref());
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_marker_text(&args.title, marker.as_ref()));
    }
    Ok(())
}

fn cmd_simulate(
    args: SimulateArgs,
    config: Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let report = runtime.block_on(simulate(config, &args))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_simulate_text(&report));
    }
    Ok(())
}

fn cmd_config(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", config_io::config_to_toml(config)?);
    }
    Ok(())
}
