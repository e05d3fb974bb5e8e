use crate::model::{AssignmentRecord, ShiftKind, Tier, TraineeId};
use chrono::NaiveDate;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options d'un run de planification.
///
/// Les valeurs par défaut correspondent au réglage production ; seul `seed`
/// mérite d'être fixé en test pour rejouer un tirage.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    /// Graine du générateur aléatoire (`None` = entropie de l'OS).
    pub seed: Option<u64>,
    /// Nombre de constructions complètes tentées en phase normale
    /// avant d'accepter le meilleur flot partiel.
    pub max_flow_attempts: u32,
    /// Tirages bornés pour placer une unité de quota sur un interne.
    pub quota_pick_attempts: u32,
    /// Écart d'heures toléré entre l'interne le plus chargé et le moins chargé.
    pub balance_gap_hours: i64,
    /// Garde-fou : nombre maximal de transferts d'équilibrage par tentative.
    pub balance_transfer_cap: u32,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_flow_attempts: 50,
            quota_pick_attempts: 50,
            balance_gap_hours: 24,
            balance_transfer_cap: 512,
        }
    }
}

/// Manque de couverture sur un type de garde, constaté après le flot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deficit {
    pub kind: ShiftKind,
    /// Nombre de jours de ce type restés sans interne.
    pub missing: u32,
}

/// Garde devenue illégale au regard des règles d'éligibilité.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Conflict {
    pub trainee: TraineeId,
    pub date: NaiveDate,
    pub kind: ShiftKind,
}

/// Résultat d'un run : les affectations retenues plus les diagnostics.
///
/// Un run qui se termine renvoie toujours `Ok(ScheduleOutcome)` ; les
/// insuffisances (déficits, conflits non réparés) sont des données, pas des
/// erreurs. Seules les entrées malformées font échouer l'appel.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleOutcome {
    /// Affectations de garde, triées par date puis identifiant.
    pub assignments: Vec<AssignmentRecord>,
    pub deficits: Vec<Deficit>,
    /// Conflits que la réparation locale n'a pas su résoudre.
    pub unresolved: Vec<Conflict>,
}

impl ScheduleOutcome {
    /// Vrai si toutes les journées sont couvertes et tous les conflits levés.
    pub fn is_success(&self) -> bool {
        self.deficits.is_empty() && self.unresolved.is_empty()
    }

    /// Petit compte rendu textuel, affiché par la CLI.
    pub fn summary(&self) -> String {
        use std::fmt::Write as _;
        let mut s = String::new();
        let _ = writeln!(s, "assignments: {}", self.assignments.len());
        if self.deficits.is_empty() {
            s.push_str("deficits: none\n");
        } else {
            for d in &self.deficits {
                let _ = writeln!(s, "deficit: {} missing {}", d.kind, d.missing);
            }
        }
        if self.unresolved.is_empty() {
            s.push_str("unresolved: none\n");
        } else {
            for c in &self.unresolved {
                let _ = writeln!(
                    s,
                    "unresolved: {} on {} ({})",
                    c.trainee.as_str(),
                    c.date,
                    c.kind
                );
            }
        }
        s
    }
}

/// Erreurs de planification.
///
/// Réservées aux entrées malformées ou aux fenêtres impossibles à poser ;
/// une couverture incomplète n'est pas une erreur (voir [`ScheduleOutcome`]).
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("no capability recorded for {handle} in academic month {month}")]
    MissingCapability { handle: String, month: u32 },

    #[error("unknown rotation code \"{rotation}\" for {handle} in academic month {month}")]
    UnknownRotation {
        handle: String,
        month: u32,
        rotation: String,
    },

    #[error("too many rotation codes for {handle}: {count} listed for 12 academic months")]
    TooManyRotations { handle: String, count: usize },

    #[error("training phase requires at least one {tier} trainee")]
    EmptyTier { tier: Tier },

    #[error("no PGY-1 or PGY-2 trainee available for the window")]
    EmptyPool,

    #[error("unknown trainee: {0}")]
    UnknownTrainee(String),

    #[error("swap invalid: {0}")]
    SwapInvalid(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
