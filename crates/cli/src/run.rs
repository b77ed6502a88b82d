//! Command execution.
//!
//! Every command is a thin call into the build driver or the zone database.

use std::path::Path;
use std::sync::Arc;

use clap::ArgMatches;
use zonekit_assets::TypeRegistry;
use zonekit_core::{Error, Result, Schema};
use zonekit_zone::{BuildReport, CaptureReport, Host, ZoneBuilder, ZoneConfig, ZoneDatabase};

/// State kept across the commands of one invocation
pub struct Context {
    registry: Arc<TypeRegistry>,
    db: ZoneDatabase,
}

impl Context {
    /// Create a context with the native registry
    pub fn new(config: ZoneConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(TypeRegistry::native());
        let db = ZoneDatabase::new(config, Arc::clone(&registry));
        Ok(Context { registry, db })
    }

    fn builder(&self) -> ZoneBuilder<'_> {
        ZoneBuilder::new(&self.registry, &self.db, self.db.config().clone())
    }
}

/// Execute one parsed subcommand
pub fn execute(ctx: &Context, name: &str, sub: &ArgMatches) -> Result<()> {
    match name {
        "buildzone" => {
            let report = ctx.builder().build(arg(sub, "name")?)?;
            print_build(&report);
            Ok(())
        }
        "buildzones" => {
            let results = ctx.builder().build_list(Path::new(arg(sub, "file")?))?;
            let mut failed = 0;
            for (zone, result) in results {
                match result {
                    Ok(report) => print_build(&report),
                    Err(e) => {
                        failed += 1;
                        eprintln!("(error) {}: {}", zone, e);
                    }
                }
            }
            if failed > 0 {
                return Err(Error::validation(format!("{} zone(s) failed to build", failed)));
            }
            Ok(())
        }
        "loadzone" => {
            let zone = arg(sub, "name")?;
            ctx.db.load_zone(zone)?;
            println!("loaded {} ({} live assets)", zone, ctx.db.asset_count());
            Ok(())
        }
        "unloadzones" => {
            ctx.db.unload_zones()?;
            println!("unloaded all zones");
            Ok(())
        }
        "dumpzone" => {
            let args: Vec<&String> = sub
                .get_many::<String>("args")
                .map(|values| values.collect())
                .unwrap_or_default();
            let (schema, zone) = match args.as_slice() {
                [zone] => (Schema::NATIVE, zone.as_str()),
                [schema, zone] => (parse_schema(schema)?, zone.as_str()),
                _ => return Err(Error::validation("usage: dumpzone [schema] <name>")),
            };
            let report = ctx.db.dump_zone(zone, schema)?;
            print_capture(&report);
            Ok(())
        }
        "verifyzone" => {
            let report = ctx.db.verify_zone(arg(sub, "name")?)?;
            print_capture(&report);
            Ok(())
        }
        other => Err(Error::validation(format!("unknown command `{}`", other))),
    }
}

fn arg<'m>(sub: &'m ArgMatches, id: &str) -> Result<&'m str> {
    sub.get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| Error::validation(format!("missing argument `{}`", id)))
}

fn parse_schema(name: &str) -> Result<Schema> {
    Schema::from_name(name).ok_or_else(|| {
        let known: Vec<String> = Schema::ALL.iter().map(ToString::to_string).collect();
        Error::validation(format!("unknown schema `{}` (expected one of {})", name, known.join(", ")))
    })
}

fn print_build(report: &BuildReport) {
    println!(
        "built {} -> {} ({} assets, {} bytes, {} errors)",
        report.zone,
        report.path.display(),
        report.assets,
        report.bytes,
        report.diagnostics.error_count()
    );
}

fn print_capture(report: &CaptureReport) {
    println!(
        "{} {:?}: {} assets captured, {} files dumped, {} references resolved, {} errors",
        report.zone,
        report.mode,
        report.captured,
        report.dumped.len(),
        report.resolved_references,
        report.diagnostics.error_count()
    );
    if let Some(log) = &report.log {
        println!("capture log: {}", log.display());
    }
}
