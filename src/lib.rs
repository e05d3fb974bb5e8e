#![forbid(unsafe_code)]
//! Internat — moteur de planification des gardes d'internes (sans BD).
//!
//! - Tableau de service par flot maximal (Dinic), égalités arbitrées au hasard.
//! - Deux phases : initiation PGY-1 (juillet–août), puis régime normal par
//!   semestre académique.
//! - Éligibilité par rotation mensuelle, vacances et repos autour des
//!   week-ends ; réparation locale par échanges de gardes.
//! - Stockage fichiers (JSON/CSV) ; dates civiles naïves, sans fuseau.

pub mod calendar;
pub mod eligibility;
pub mod flow;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod rotation;
pub mod scheduler;
#[cfg(feature = "serde")]
pub mod storage;

pub use calendar::{CallCalendar, Phase};
pub use model::{AssignmentRecord, RoleCapability, Roster, ShiftKind, Tier, Trainee, TraineeId};
pub use rotation::RotationCatalog;
pub use scheduler::{
    Conflict, Deficit, ScheduleError, ScheduleOptions, ScheduleOutcome, Scheduler,
};
#[cfg(feature = "serde")]
pub use storage::{JsonStorage, Storage};
