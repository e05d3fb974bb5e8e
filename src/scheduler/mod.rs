mod conflicts;
mod normal;
mod repair;
mod training;
mod types;
mod util;

pub use types::{Conflict, Deficit, ScheduleError, ScheduleOptions, ScheduleOutcome};

use crate::calendar::{academic_months, Phase};
use crate::model::{AssignmentRecord, Roster, ShiftKind, Tier, Trainee, TraineeId};
use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Scheduler : un effectif figé au départ, des fournées de travail mutées
/// par le run, et le générateur aléatoire qui arbitre les égalités.
#[derive(Debug)]
pub struct Scheduler {
    trainees: Vec<Trainee>,
    opts: ScheduleOptions,
    rng: SmallRng,
}

impl Scheduler {
    /// Capture un instantané de l'effectif. Le roster d'origine n'est jamais
    /// modifié par un run ; l'appelant entérine l'issue s'il la retient.
    pub fn new(roster: &Roster, opts: ScheduleOptions) -> Self {
        let rng = match opts.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            trainees: roster.trainees.clone(),
            opts,
            rng,
        }
    }

    pub fn trainees(&self) -> &[Trainee] {
        &self.trainees
    }

    pub fn trainee(&self, handle: &str) -> Option<&Trainee> {
        self.trainees.iter().find(|t| t.handle == handle)
    }

    /// Lance la phase sur sa fenêtre standard de l'année académique donnée.
    pub fn run(self, phase: Phase, year: i32) -> Result<ScheduleOutcome, ScheduleError> {
        let (start, end) = phase.window(year);
        match phase {
            Phase::Training => self.run_training(start, end),
            Phase::FirstHalf | Phase::SecondHalf => self.run_normal(start, end),
        }
    }

    /// Phase d'apprentissage sur une fenêtre arbitraire.
    pub fn run_training(
        mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        validate_window(start, end)?;
        validate_capabilities(
            &self.trainees,
            &[Tier::Pgy1, Tier::Pgy2, Tier::Pgy3],
            start,
            end,
        )?;
        let (deficits, unresolved) =
            training::run(&mut self.trainees, start, end, &mut self.rng)?;
        Ok(self.into_outcome(deficits, unresolved))
    }

    /// Phase normale sur une fenêtre arbitraire.
    pub fn run_normal(
        mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        validate_window(start, end)?;
        validate_capabilities(&self.trainees, &[Tier::Pgy1, Tier::Pgy2], start, end)?;
        let (deficits, unresolved) =
            normal::run(&mut self.trainees, start, end, &self.opts, &mut self.rng)?;
        Ok(self.into_outcome(deficits, unresolved))
    }

    /// Gardes de la fournée courante devenues illégales.
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect(&self.trainees)
    }

    /// Passes de réparation standard : d'abord au sein de chaque niveau,
    /// puis entre PGY-1 et PGY-2. Renvoie les conflits restants.
    pub fn repair(&mut self) -> Vec<Conflict> {
        repair::repair_pass(
            &mut self.trainees,
            repair::RepairScope::Within(Tier::Pgy1),
            &mut self.rng,
        );
        repair::repair_pass(
            &mut self.trainees,
            repair::RepairScope::Within(Tier::Pgy2),
            &mut self.rng,
        );
        repair::repair_pass(
            &mut self.trainees,
            repair::RepairScope::Within(Tier::Pgy3),
            &mut self.rng,
        );
        repair::repair_pass(
            &mut self.trainees,
            repair::RepairScope::Cross(Tier::Pgy1, Tier::Pgy2),
            &mut self.rng,
        );
        conflicts::detect(&self.trainees)
    }

    /// Échange manuel de deux dates de la fournée courante.
    pub fn swap_days(
        &mut self,
        a: &TraineeId,
        da: NaiveDate,
        b: &TraineeId,
        db: NaiveDate,
    ) -> Result<(), ScheduleError> {
        repair::swap_days(&mut self.trainees, a, da, b, db)
    }

    fn into_outcome(self, deficits: Vec<Deficit>, unresolved: Vec<Conflict>) -> ScheduleOutcome {
        let mut assignments = Vec::new();
        for t in &self.trainees {
            for &date in &t.working {
                assignments.push(AssignmentRecord {
                    trainee: t.id.clone(),
                    date,
                    kind: ShiftKind::of(date),
                });
            }
        }
        assignments.sort_by(|a, b| {
            (a.date, a.trainee.as_str()).cmp(&(b.date, b.trainee.as_str()))
        });
        ScheduleOutcome {
            assignments,
            deficits,
            unresolved,
        }
    }
}

fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<(), ScheduleError> {
    if start > end {
        return Err(ScheduleError::InvalidWindow { start, end });
    }
    Ok(())
}

/// Un interne participant sans capacité renseignée sur un mois de la fenêtre
/// est une erreur de saisie : mieux vaut échouer avant de construire quoi
/// que ce soit.
fn validate_capabilities(
    trainees: &[Trainee],
    tiers: &[Tier],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ScheduleError> {
    let months = academic_months(start, end);
    for t in trainees {
        if !tiers.contains(&t.tier) {
            continue;
        }
        for &month in &months {
            if t.capability_for_month(month).is_none() {
                return Err(ScheduleError::MissingCapability {
                    handle: t.handle.clone(),
                    month: month as u32,
                });
            }
        }
    }
    Ok(())
}
