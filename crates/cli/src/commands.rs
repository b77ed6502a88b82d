//! Clap command tree definition.
//!
//! Builds the `clap::Command` tree used by shell mode (directly) and by
//! script mode (via `try_get_matches_from`, one line at a time).

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("zonekit")
        .about("Build, load and dump zone containers")
        .subcommand_required(false)
        .arg(
            Arg::new("source-dir")
                .long("source-dir")
                .value_name("DIR")
                .help("Manifest directory (default: zone_source)")
                .global(true),
        )
        .arg(
            Arg::new("asset-dir")
                .long("asset-dir")
                .value_name("DIR")
                .help("Asset source directory (default: zonetool)")
                .global(true),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .help("Built container directory (default: zones)")
                .global(true),
        )
        .arg(
            Arg::new("dump-dir")
                .long("dump-dir")
                .value_name("DIR")
                .help("Dump directory (default: dump)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("More logging; repeat for trace output")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommands(zone_commands())
}

/// Build a command tree for script mode (no global flags).
pub fn build_script_cmd() -> Command {
    Command::new("script")
        .multicall(true)
        .subcommand_required(true)
        .subcommands(zone_commands())
}

fn zone_commands() -> Vec<Command> {
    vec![
        Command::new("buildzone")
            .about("Build a zone from its manifest")
            .arg(Arg::new("name").required(true).help("Zone name")),
        Command::new("buildzones")
            .about("Build every zone listed in a file, one per line")
            .arg(Arg::new("file").required(true).value_name("PATH")),
        Command::new("loadzone")
            .about("Load a built zone")
            .arg(Arg::new("name").required(true).help("Zone name")),
        Command::new("unloadzones").about("Unload every loaded zone"),
        Command::new("dumpzone")
            .about("Load a zone and dump its assets, converted to a target schema")
            .arg(
                Arg::new("args")
                    .required(true)
                    .num_args(1..=2)
                    .value_name("[SCHEMA] NAME")
                    .help("Target schema (default: h1) and zone name"),
            ),
        Command::new("verifyzone")
            .about("Load a zone and log every asset it holds")
            .arg(Arg::new("name").required(true).help("Zone name")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
        build_script_cmd().debug_assert();
    }

    #[test]
    fn test_dumpzone_takes_optional_schema() {
        let matches = build_cli()
            .try_get_matches_from(["zonekit", "dumpzone", "iw6", "mp_test"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let args: Vec<&String> = sub.get_many::<String>("args").unwrap().collect();
        assert_eq!(args, ["iw6", "mp_test"]);

        assert!(build_cli()
            .try_get_matches_from(["zonekit", "dumpzone", "a", "b", "c"])
            .is_err());
    }

    #[test]
    fn test_global_flags() {
        let matches = build_cli()
            .try_get_matches_from(["zonekit", "-vv", "buildzone", "mp_test", "--output-dir", "out"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        assert_eq!(matches.get_one::<String>("output-dir").unwrap(), "out");
    }
}
