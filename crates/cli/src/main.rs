//! zonekit CLI: build, load and dump zone containers.
//!
//! Two modes:
//! - **Shell mode**: `zonekit [flags] COMMAND`: run a single command and exit
//! - **Script mode**: `zonekit [flags] < commands.txt`: one command per
//!   line from stdin, sharing loaded zones between lines

mod commands;
mod run;

use std::io::BufRead;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;
use zonekit_zone::ZoneConfig;

use commands::{build_cli, build_script_cmd};
use run::{execute, Context};

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let ctx = match Context::new(config_from(&matches)) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(2);
        }
    };

    let exit_code = match matches.subcommand() {
        Some((name, sub)) => run_one(&ctx, name, sub),
        None => run_script(&ctx),
    };
    process::exit(exit_code);
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "zonekit=info",
        1 => "zonekit=debug",
        _ => "zonekit=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_from(matches: &clap::ArgMatches) -> ZoneConfig {
    let mut config = ZoneConfig::default();
    if let Some(dir) = matches.get_one::<String>("source-dir") {
        config = config.with_source_dir(dir);
    }
    if let Some(dir) = matches.get_one::<String>("asset-dir") {
        config = config.with_asset_dir(dir);
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config = config.with_output_dir(dir);
    }
    if let Some(dir) = matches.get_one::<String>("dump-dir") {
        config = config.with_dump_dir(dir);
    }
    config
}

fn run_one(ctx: &Context, name: &str, sub: &clap::ArgMatches) -> i32 {
    match execute(ctx, name, sub) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    }
}

fn run_script(ctx: &Context) -> i32 {
    let mut exit_code = 0;
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("(error) {}", e);
                return 1;
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        debug!(target: "zonekit", line, "Script command");
        match build_script_cmd().try_get_matches_from(line.split_whitespace()) {
            Ok(matches) => {
                if let Some((name, sub)) = matches.subcommand() {
                    if run_one(ctx, name, sub) != 0 {
                        exit_code = 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                exit_code = 1;
            }
        }
    }
    exit_code
}
