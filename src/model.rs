use chrono::{Datelike, NaiveDate, Weekday};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Trainee
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraineeId(String);

impl TraineeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Niveau d'ancienneté (année de post-graduat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tier {
    Pgy1,
    Pgy2,
    Pgy3,
}

/// Contraintes propres à un niveau. Une seule entité `Trainee` paramétrée
/// par ce petit objet de règles, plutôt que trois types quasi identiques.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Seul le PGY-1 porte une date butoir d'initiation avant laquelle
    /// aucune garde ne peut lui être confiée.
    pub enforces_cutoff: bool,
}

impl Tier {
    pub fn policy(self) -> TierPolicy {
        TierPolicy {
            enforces_cutoff: matches!(self, Tier::Pgy1),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Pgy1 => "PGY1",
            Tier::Pgy2 => "PGY2",
            Tier::Pgy3 => "PGY3",
        };
        f.write_str(s)
    }
}

/// Capacités de garde dérivées de la rotation du mois.
/// Les variantes `flex_*` n'ouvrent le créneau que pendant le statut
/// d'initiation (`Trainee::in_training`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoleCapability {
    pub allows_short: bool,
    pub allows_long: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flex_short: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flex_long: bool,
}

impl RoleCapability {
    /// Rotation sans restriction (gardes courtes et longues).
    pub fn full() -> Self {
        Self {
            allows_short: true,
            allows_long: true,
            flex_short: false,
            flex_long: false,
        }
    }

    pub fn permits_short(&self, in_training: bool) -> bool {
        self.allows_short || (in_training && self.flex_short)
    }

    pub fn permits_long(&self, in_training: bool) -> bool {
        self.allows_long || (in_training && self.flex_long)
    }
}

/// Type de garde, entièrement déterminé par le jour de semaine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShiftKind {
    /// Garde courte de semaine (3 h).
    #[cfg_attr(feature = "serde", serde(rename = "Short"))]
    Short,
    /// Garde de samedi (24 h).
    #[cfg_attr(feature = "serde", serde(rename = "24h"))]
    Long24,
    /// Garde de dimanche (12 h).
    #[cfg_attr(feature = "serde", serde(rename = "12h"))]
    Long12,
}

impl ShiftKind {
    pub const ALL: [ShiftKind; 3] = [ShiftKind::Short, ShiftKind::Long24, ShiftKind::Long12];

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat => ShiftKind::Long24,
            Weekday::Sun => ShiftKind::Long12,
            _ => ShiftKind::Short,
        }
    }

    /// Durée en heures.
    pub fn hours(self) -> i64 {
        match self {
            ShiftKind::Short => 3,
            ShiftKind::Long24 => 24,
            ShiftKind::Long12 => 12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShiftKind::Short => "Short",
            ShiftKind::Long24 => "24h",
            ShiftKind::Long12 => "12h",
        }
    }

    pub fn is_weekend(self) -> bool {
        !matches!(self, ShiftKind::Short)
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interne (membre du tableau de garde).
///
/// `committed` fige les gardes issues des runs précédents ; `working` est le
/// brouillon du run courant et n'est jamais persisté.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trainee {
    pub id: TraineeId,
    pub handle: String,
    pub display_name: String,
    pub tier: Tier,
    /// Capacités par mois académique (juillet = 0 … juin = 11).
    #[cfg_attr(feature = "serde", serde(default = "empty_caps"))]
    pub caps: [Option<RoleCapability>; 12],
    #[cfg_attr(feature = "serde", serde(default))]
    pub vacations: BTreeSet<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub committed: BTreeSet<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub working: BTreeSet<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub in_training: bool,
    /// Date butoir d'initiation (PGY-1 uniquement) : aucune garde le jour
    /// même ni avant.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cutoff: Option<NaiveDate>,
}

fn empty_caps() -> [Option<RoleCapability>; 12] {
    [None; 12]
}

impl Trainee {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D, tier: Tier) -> Self {
        Self {
            id: TraineeId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            tier,
            caps: empty_caps(),
            vacations: BTreeSet::new(),
            committed: BTreeSet::new(),
            working: BTreeSet::new(),
            in_training: false,
            cutoff: None,
        }
    }

    /// Capacité du mois académique `month` (juillet = 0).
    pub fn capability_for_month(&self, month: usize) -> Option<RoleCapability> {
        self.caps.get(month).copied().flatten()
    }

    /// Jour de garde, toutes origines confondues (historique figé + brouillon).
    pub fn is_working(&self, date: NaiveDate) -> bool {
        self.committed.contains(&date) || self.working.contains(&date)
    }

    /// Heures des gardes figées par les runs précédents.
    pub fn committed_hours(&self) -> i64 {
        self.committed.iter().map(|d| ShiftKind::of(*d).hours()).sum()
    }

    /// Heures du brouillon courant.
    pub fn working_hours(&self) -> i64 {
        self.working.iter().map(|d| ShiftKind::of(*d).hours()).sum()
    }
}

/// Enregistrement d'affectation : l'unique sortie du moteur.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssignmentRecord {
    pub trainee: TraineeId,
    pub date: NaiveDate,
    pub kind: ShiftKind,
}

/// Tableau complet des internes.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roster {
    pub trainees: Vec<Trainee>,
}

impl Roster {
    pub fn find_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Trainee> {
        self.trainees.iter().find(|t| t.handle == handle)
    }
    pub fn find_by_id<'a>(&'a self, id: &TraineeId) -> Option<&'a Trainee> {
        self.trainees.iter().find(|t| &t.id == id)
    }
    pub fn find_mut_by_handle(&mut self, handle: &str) -> Option<&mut Trainee> {
        self.trainees.iter_mut().find(|t| t.handle == handle)
    }
    pub fn find_mut_by_id(&mut self, id: &TraineeId) -> Option<&mut Trainee> {
        self.trainees.iter_mut().find(|t| &t.id == id)
    }

    pub fn tier_count(&self, tier: Tier) -> usize {
        self.trainees.iter().filter(|t| t.tier == tier).count()
    }

    /// Fige les affectations d'un run réussi dans l'historique `committed`.
    pub fn commit_assignments(&mut self, records: &[AssignmentRecord]) {
        for rec in records {
            if let Some(t) = self.find_mut_by_id(&rec.trainee) {
                t.committed.insert(rec.date);
            }
        }
    }
}
