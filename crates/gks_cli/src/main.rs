use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use gks_core::core_api::{GildedKeyStorage, PatchReport};
use gks_core::debug;
use gks_core::key_usage::KeyUse;
use gks_core::migration::{MigrationOutcome, RemapTable};
use gks_core::schema::{Database, Profile};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Mod config directory (config.default.json, config.json, cases.json, barters.json).
    /// The bundled configuration is used when omitted.
    #[arg(long = "config-dir", global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add the cases and key tweaks to a database dump.
    PatchDb {
        #[arg(long, value_name = "DATABASE.json")]
        database: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Repair the case contents of a profile, as done at session start.
    Migrate {
        #[command(flatten)]
        target: ProfileTarget,
    },
    /// Spend one use of an entry key on the profile's equipment.
    UseKey {
        #[command(flatten)]
        target: ProfileTarget,
        #[arg(long, value_name = "ITEM_ID")]
        key: String,
    },
    /// List keys that no case has a slot for.
    MissingKeys {
        #[arg(long, value_name = "DATABASE.json")]
        database: PathBuf,
    },
    /// Put one of every key and case into the profile's stash.
    DebugGive {
        #[arg(long, value_name = "PROFILE.json")]
        profile: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Remove the items `debug-give` added.
    DebugStrip {
        #[arg(long, value_name = "PROFILE.json")]
        profile: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Debug, Args)]
struct ProfileTarget {
    #[arg(long, value_name = "DATABASE.json")]
    database: PathBuf,
    #[arg(long, value_name = "PROFILE.json")]
    profile: PathBuf,
    #[arg(long)]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = match cli.config_dir.as_deref() {
        Some(dir) => GildedKeyStorage::load(dir),
        None => GildedKeyStorage::with_defaults(),
    };
    let mut storage = storage.unwrap_or_else(|e| {
        eprintln!("Error loading mod config: {e}");
        process::exit(1);
    });
    tracing::debug!("{} cases configured", storage.cases().len());

    match cli.command {
        Command::PatchDb { database, output } => {
            let mut db: Database = read_json(&database);
            let report = patch_database(&mut storage, &mut db);
            if let Some(out_path) = output.as_deref() {
                write_json(out_path, &db);
            }
            if cli.json {
                print_json(&patch_report_json(&report));
            } else {
                println!(
                    "Created {} cases, {} barters; adjusted {} keys",
                    report.cases.len(),
                    report.barters,
                    report.keys_adjusted
                );
                if let Some(out_path) = output {
                    println!("Wrote patched database to {}", out_path.display());
                }
            }
        }
        Command::Migrate { target } => {
            let mut db: Database = read_json(&target.database);
            let mut profile: Profile = read_json(&target.profile);
            patch_database(&mut storage, &mut db);

            let outcome = storage.game_start(&mut profile);
            write_json(&target.output, &profile);
            if cli.json {
                print_json(&outcome_json(&outcome));
            } else {
                match &outcome {
                    MigrationOutcome::Skipped => println!("Profile has no inventory; skipped"),
                    MigrationOutcome::Committed(report) => println!(
                        "Migrated: {} legacy ids updated, {} items moved",
                        report.remapped, report.moved
                    ),
                    MigrationOutcome::RolledBack { remapped, error } => println!(
                        "Rolled back ({error}); {remapped} legacy ids updated"
                    ),
                }
            }
        }
        Command::UseKey { target, key } => {
            let mut db: Database = read_json(&target.database);
            let mut profile: Profile = read_json(&target.profile);
            patch_database(&mut storage, &mut db);

            let used = storage.use_entry_key(&mut profile, &db, &key);
            write_json(&target.output, &profile);
            if cli.json {
                print_json(&key_use_json(&used));
            } else {
                match used {
                    KeyUse::NoKey => println!("No key given"),
                    KeyUse::NotFound => println!("Key {key} is not on the equipment"),
                    KeyUse::Unlimited => println!("Key {key} has unlimited uses"),
                    KeyUse::Used { usages, maximum } => {
                        println!("Key {key} used {usages}/{maximum}")
                    }
                    KeyUse::Discarded { removed } => {
                        println!("Key {key} discarded ({removed} items removed)")
                    }
                }
            }
        }
        Command::MissingKeys { database } => {
            let mut db: Database = read_json(&database);
            patch_database(&mut storage, &mut db);
            let missing = storage.missing_keys(&db);
            if cli.json {
                print_json(&missing);
            } else {
                for key in &missing {
                    println!("{}\t{}", key.id, key.name.as_deref().unwrap_or("<unnamed>"));
                }
            }
        }
        Command::DebugGive { profile, output } => {
            let mut data: Profile = read_json(&profile);
            let given = debug::give_all_keys_and_cases(
                &mut data,
                storage.cases(),
                RemapTable::builtin(),
            )
            .unwrap_or_else(|| {
                eprintln!("Profile {} has no stash yet", profile.display());
                process::exit(1);
            });
            write_json(&output, &data);
            if cli.json {
                print_json(&json!({ "given": given }));
            } else {
                println!("Gave {given} items");
            }
        }
        Command::DebugStrip { profile, output } => {
            let mut data: Profile = read_json(&profile);
            let removed = debug::remove_debug_items(&mut data);
            write_json(&output, &data);
            if cli.json {
                print_json(&json!({ "removed": removed }));
            } else {
                println!("Removed {removed} items");
            }
        }
    }
}

fn patch_database(storage: &mut GildedKeyStorage, db: &mut Database) -> PatchReport {
    storage.post_db_load(db).unwrap_or_else(|e| {
        eprintln!("Error patching database: {e}");
        process::exit(1);
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> T {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON for {}: {e}", path.display());
        process::exit(1);
    });
    fs::write(path, rendered).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", path.display());
        process::exit(1);
    });
}

fn print_json<T: Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn patch_report_json(report: &PatchReport) -> JsonValue {
    json!({
        "cases": report.cases,
        "barters": report.barters,
        "keys_adjusted": report.keys_adjusted,
        "grid_filters_restored": report.grid_filters_restored,
        "labs_limit_set": report.labs_limit_set,
    })
}

fn outcome_json(outcome: &MigrationOutcome) -> JsonValue {
    match outcome {
        MigrationOutcome::Skipped => json!({ "status": "skipped" }),
        MigrationOutcome::Committed(report) => json!({
            "status": "committed",
            "remapped": report.remapped,
            "moved": report.moved,
            "containers": report.containers,
        }),
        MigrationOutcome::RolledBack { remapped, error } => json!({
            "status": "rolled_back",
            "remapped": remapped,
            "error_code": format!("{:?}", error.code),
            "error": error.message,
        }),
    }
}

fn key_use_json(used: &KeyUse) -> JsonValue {
    match used {
        KeyUse::NoKey => json!({ "result": "no_key" }),
        KeyUse::NotFound => json!({ "result": "not_found" }),
        KeyUse::Unlimited => json!({ "result": "unlimited" }),
        KeyUse::Used { usages, maximum } => {
            json!({ "result": "used", "usages": usages, "maximum": maximum })
        }
        KeyUse::Discarded { removed } => json!({ "result": "discarded", "removed": removed }),
    }
}
