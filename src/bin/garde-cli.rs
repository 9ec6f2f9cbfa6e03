#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use garde::{
    io,
    model::{BuildingId, FloorId, ShiftId, Supervisor, SupervisorId, VacationId},
    notification::{LogNotifier, OutboxNotifier, SharedNotifier},
    repository::{LocationDirectory, RosterRepository, SupervisorDirectory, SupervisorPatch},
    scheduler::{NewShift, NewVacation, SchedError, ScheduleOptions, Scheduler, ShiftPatch},
    timecalc,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des gardes de surveillantes (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: PathBuf,

    /// Durée maximale d'une garde (heures, borne incluse)
    #[arg(long, global = true, default_value_t = 6)]
    max_shift_hours: u32,

    /// Dossier où écrire les notifications d'affectation (sinon : logs)
    #[arg(long, global = true)]
    outbox: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter une surveillante
    AddSupervisor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Importer des surveillantes depuis un CSV
    ImportSupervisors {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Modifier une surveillante
    EditSupervisor {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Supprimer une surveillante (ses gardes et congés restent)
    DeleteSupervisor {
        #[arg(long)]
        id: String,
    },

    /// Lister les surveillantes (par nom)
    Supervisors,

    /// Ajouter un bâtiment et ses étages
    AddBuilding {
        #[arg(long)]
        number: u32,
        /// liste "0;1;2"
        #[arg(long, default_value = "")]
        floors: String,
    },

    /// Importer des bâtiments depuis un CSV
    ImportBuildings {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Lister bâtiments et étages
    Buildings,

    /// Créer une garde
    CreateShift {
        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
        /// HH:MM
        #[arg(long)]
        start: Option<String>,
        /// HH:MM
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        floor: Option<String>,
        #[arg(long)]
        supervisor: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        created_by: Option<String>,
    },

    /// Modifier une garde (champs absents inchangés)
    EditShift {
        #[arg(long)]
        id: String,
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        floor: Option<String>,
        #[arg(long)]
        supervisor: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Supprimer une garde
    DeleteShift {
        #[arg(long)]
        id: String,
    },

    /// Gardes d'une surveillante ou d'une journée
    Shifts {
        #[arg(long, conflicts_with = "date")]
        supervisor: Option<String>,
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
    },

    /// Planning de la semaine [start, start+6]
    Week {
        #[arg(long, value_parser = parse_day)]
        start: Option<NaiveDate>,
    },

    /// Étages sans garde ce jour-là
    Uncovered {
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
    },

    /// Déclarer un congé (bornes incluses)
    AddVacation {
        #[arg(long)]
        supervisor: Option<String>,
        #[arg(long, value_parser = parse_day)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_day)]
        to: Option<NaiveDate>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        created_by: Option<String>,
    },

    /// Congés d'une surveillante (plus récents d'abord)
    Vacations {
        #[arg(long)]
        supervisor: String,
    },

    /// Supprimer un congé
    DeleteVacation {
        #[arg(long)]
        id: String,
    },

    /// Chercher une surveillante par nom, avec gardes et congés
    Agenda {
        #[arg(long)]
        name: String,
    },

    /// Exporter le roster et/ou les gardes
    Export {
        #[arg(long)]
        out_json: Option<PathBuf>,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    timecalc::parse_day(raw).map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Code 0 si OK, 2 si la demande est refusée ; les pannes internes remontent.
fn outcome<T: Serialize>(res: Result<T, SchedError>) -> Result<i32> {
    match res {
        Ok(value) => {
            print_json(&value)?;
            Ok(0)
        }
        Err(err) if err.is_client_error() => {
            eprintln!("error: {err}");
            if let Some(payload) = err.conflicts_json() {
                eprintln!("{}", serde_json::to_string_pretty(&payload)?);
            }
            Ok(2)
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let repo = RosterRepository::open_json(&cli.roster)?;
    let notifier: SharedNotifier = match &cli.outbox {
        Some(dir) => Arc::new(OutboxNotifier::new(dir.clone())),
        None => Arc::new(LogNotifier::new()),
    };
    let scheduler = Scheduler::with_notifier(repo, notifier)
        .with_options(ScheduleOptions::with_max_hours(cli.max_shift_hours));
    let repo = scheduler.repository();

    let code = match cli.cmd {
        Commands::AddSupervisor {
            name,
            email,
            phone,
            notes,
        } => {
            let mut sup = Supervisor::new(name, email, phone);
            sup.notes = notes;
            let id = repo.add_supervisor(sup)?;
            println!("{id}");
            0
        }
        Commands::ImportSupervisors { csv } => {
            let people = io::import_supervisors_csv(csv)?;
            let n = people.len();
            for sup in people {
                repo.add_supervisor(sup)?;
            }
            println!("imported {n} supervisor(s)");
            0
        }
        Commands::EditSupervisor {
            id,
            name,
            email,
            phone,
            notes,
        } => {
            let patch = SupervisorPatch {
                name,
                email,
                phone,
                notes,
            };
            match repo.update_supervisor(&SupervisorId::new(&id), patch)? {
                Some(sup) => {
                    print_json(&sup)?;
                    0
                }
                None => bail!("unknown supervisor: {id}"),
            }
        }
        Commands::DeleteSupervisor { id } => {
            let removed = repo.remove_supervisor(&SupervisorId::new(id))?;
            print_json(&serde_json::json!({ "deleted": removed }))?;
            0
        }
        Commands::Supervisors => {
            print_json(&repo.supervisors()?)?;
            0
        }
        Commands::AddBuilding { number, floors } => {
            let floors = io::parse_floor_list(&floors)?;
            let id = repo.add_building(number)?;
            for f in floors {
                repo.add_floor(&id, f)?;
            }
            println!("{id}");
            0
        }
        Commands::ImportBuildings { csv } => {
            let rows = io::import_buildings_csv(csv)?;
            let n = rows.len();
            for row in rows {
                let id = repo.add_building(row.number)?;
                for f in row.floors {
                    repo.add_floor(&id, f)?;
                }
            }
            println!("imported {n} building(s)");
            0
        }
        Commands::Buildings => {
            let mut out = Vec::new();
            for b in repo.buildings()? {
                let floors = repo.floors_of(&b)?;
                out.push(serde_json::json!({
                    "id": b.id,
                    "number": b.number,
                    "floors": floors,
                }));
            }
            print_json(&out)?;
            0
        }
        Commands::CreateShift {
            date,
            start,
            end,
            building,
            floor,
            supervisor,
            note,
            created_by,
        } => {
            let input = NewShift {
                date,
                start_time: start,
                end_time: end,
                building: building.map(BuildingId::new),
                floor: floor.map(FloorId::new),
                supervisor: supervisor.map(SupervisorId::new),
                note,
                created_by,
            };
            outcome(scheduler.create_shift(input))?
        }
        Commands::EditShift {
            id,
            date,
            start,
            end,
            building,
            floor,
            supervisor,
            note,
        } => {
            let patch = ShiftPatch {
                date,
                start_time: start,
                end_time: end,
                building: building.map(BuildingId::new),
                floor: floor.map(FloorId::new),
                supervisor: supervisor.map(SupervisorId::new),
                note,
                created_by: None,
            };
            outcome(scheduler.edit_shift(&ShiftId::new(id), patch))?
        }
        Commands::DeleteShift { id } => outcome(
            scheduler
                .delete_shift(&ShiftId::new(id))
                .map(|removed| serde_json::json!({ "deleted": removed })),
        )?,
        Commands::Shifts { supervisor, date } => match (supervisor, date) {
            (Some(id), _) => outcome(scheduler.shifts_by_supervisor(&SupervisorId::new(id)))?,
            (None, Some(day)) => outcome(scheduler.shifts_by_date(day))?,
            (None, None) => bail!("either --supervisor or --date is required"),
        },
        Commands::Week { start } => outcome(scheduler.week_schedule(start))?,
        Commands::Uncovered { date } => outcome(scheduler.uncovered_floors(date))?,
        Commands::AddVacation {
            supervisor,
            from,
            to,
            reason,
            note,
            created_by,
        } => {
            let input = NewVacation {
                supervisor: supervisor.map(SupervisorId::new),
                start_date: from,
                end_date: to,
                reason,
                note,
                created_by,
            };
            outcome(scheduler.create_vacation(input))?
        }
        Commands::Vacations { supervisor } => {
            outcome(scheduler.vacations_by_supervisor(&SupervisorId::new(supervisor)))?
        }
        Commands::DeleteVacation { id } => outcome(
            scheduler
                .delete_vacation(&VacationId::new(id))
                .map(|removed| serde_json::json!({ "deleted": removed })),
        )?,
        Commands::Agenda { name } => outcome(scheduler.supervisor_agenda(&name))?,
        Commands::Export { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, &repo.snapshot()?)?;
            }
            if let Some(path) = out_csv {
                let details = scheduler.all_shifts().map_err(anyhow::Error::from)?;
                io::export_shifts_csv(path, &details)?;
            }
            0
        }
    };

    scheduler.wait_notifications();
    std::process::exit(code);
}
