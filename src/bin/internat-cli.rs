#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use internat::{
    calendar::Phase,
    io,
    model::{AssignmentRecord, ShiftKind},
    rotation::{self, RotationCatalog},
    scheduler::{ScheduleOptions, Scheduler},
    storage::{JsonStorage, Storage},
};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de planification des gardes d'internes (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des internes depuis un CSV
    Import {
        #[arg(long)]
        csv: String,
        /// Catalogue de rotations JSON (défaut : catalogue intégré)
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Lancer une phase de planification
    Schedule {
        /// training, first-half ou second-half
        #[arg(long)]
        phase: String,
        /// Année de départ de l'année académique (celle de juillet)
        #[arg(long)]
        year: i32,
        /// Graine du générateur aléatoire (tirage rejouable)
        #[arg(long)]
        seed: Option<u64>,
        /// Export JSON de l'issue, diagnostics compris (optionnel)
        #[arg(long)]
        out_json: Option<String>,
        /// Export CSV des affectations (optionnel)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Lister les internes et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        /// Export CSV des gardes entérinées
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier la cohérence du roster
    Check {
        /// Export CSV du rapport (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Afficher le catalogue de rotations intégré
    Rotations {
        /// Export JSON du catalogue (optionnel)
        #[arg(long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster)?;
    let mut roster = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::Import { csv, catalog } => {
            let catalog = match catalog {
                Some(path) => rotation::load_catalog_from_file(path)?,
                None => RotationCatalog::builtin(),
            };
            let trainees = io::import_trainees_csv(csv, &catalog)?;
            for t in &trainees {
                if roster.find_by_handle(&t.handle).is_some() {
                    bail!("duplicate handle: {}", t.handle);
                }
            }
            let count = trainees.len();
            roster.trainees.extend(trainees);
            storage.save(&roster)?;
            println!("Imported {count} trainee(s)");
            0
        }
        Commands::Schedule {
            phase,
            year,
            seed,
            out_json,
            out_csv,
        } => {
            let phase = parse_phase(&phase)?;
            let opts = ScheduleOptions {
                seed,
                ..ScheduleOptions::default()
            };
            let scheduler = Scheduler::new(&roster, opts);
            let outcome = scheduler.run(phase, year)?;
            print!("{}", outcome.summary());
            if let Some(path) = out_json {
                io::export_outcome_json(path, &outcome)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &roster, &outcome.assignments)?;
            }
            if outcome.is_success() {
                roster.commit_assignments(&outcome.assignments);
                storage.save(&roster)?;
                println!(
                    "Committed {} assignment(s) into {}",
                    outcome.assignments.len(),
                    cli.roster
                );
                0
            } else {
                eprintln!("schedule incomplete; roster left untouched");
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, &roster)?;
            }
            if let Some(path) = out_csv {
                let mut records = Vec::new();
                for t in &roster.trainees {
                    for &date in &t.committed {
                        records.push(AssignmentRecord {
                            trainee: t.id.clone(),
                            date,
                            kind: ShiftKind::of(date),
                        });
                    }
                }
                records.sort_by(|a, b| {
                    (a.date, a.trainee.as_str()).cmp(&(b.date, b.trainee.as_str()))
                });
                io::export_assignments_csv(path, &roster, &records)?;
            }
            // impression compacte
            for t in &roster.trainees {
                println!(
                    "{} | {} | {} | {} garde(s), {} h",
                    t.handle,
                    t.display_name,
                    t.tier,
                    t.committed.len(),
                    t.committed_hours()
                );
            }
            0
        }
        Commands::Check { report } => {
            let mut findings: Vec<(String, String, &str)> = Vec::new();

            let mut handles: BTreeMap<&str, u32> = BTreeMap::new();
            for t in &roster.trainees {
                *handles.entry(t.handle.as_str()).or_insert(0) += 1;
            }
            for (handle, n) in handles {
                if n > 1 {
                    findings.push((handle.to_string(), String::new(), "duplicate-handle"));
                }
            }
            for t in &roster.trainees {
                for date in t.committed.intersection(&t.vacations) {
                    findings.push((t.handle.clone(), date.to_string(), "committed-on-vacation"));
                }
            }

            if findings.is_empty() {
                println!("OK: roster is coherent");
                0
            } else {
                eprintln!("Found {} finding(s)", findings.len());
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["handle", "date", "kind"])?;
                    for (handle, date, kind) in &findings {
                        w.write_record([handle.as_str(), date.as_str(), kind])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
        Commands::Rotations { out } => {
            let catalog = RotationCatalog::builtin();
            if let Some(path) = out {
                rotation::export_catalog_json(path, &catalog)?;
            }
            println!("{} rotation(s)", catalog.len());
            for code in catalog.codes() {
                if let Some(cap) = catalog.resolve(code) {
                    println!(
                        "{code} | short={} long={} flex_short={} flex_long={}",
                        cap.allows_short, cap.allows_long, cap.flex_short, cap.flex_long
                    );
                }
            }
            0
        }
    };

    std::process::exit(code);
}

fn parse_phase(raw: &str) -> Result<Phase> {
    match raw.to_ascii_lowercase().as_str() {
        "training" => Ok(Phase::Training),
        "first-half" | "first" => Ok(Phase::FirstHalf),
        "second-half" | "second" => Ok(Phase::SecondHalf),
        _ => bail!("unknown phase: {raw} (expected training, first-half or second-half)"),
    }
}
