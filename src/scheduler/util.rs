use crate::model::{ShiftKind, Tier, Trainee, TraineeId};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Division entière arrondie vers le haut. `b` doit être non nul.
pub(super) fn ceil_div(a: usize, b: usize) -> usize {
    debug_assert!(b > 0);
    a.div_ceil(b)
}

/// Position d'un type de garde dans les tableaux de quotas,
/// alignée sur [`ShiftKind::ALL`].
pub(super) fn kind_slot(kind: ShiftKind) -> usize {
    match kind {
        ShiftKind::Short => 0,
        ShiftKind::Long24 => 1,
        ShiftKind::Long12 => 2,
    }
}

/// Union des dates déjà entérinées sur tout l'effectif. Ces journées sont
/// retirées du calendrier avant toute construction de graphe.
pub(super) fn committed_coverage(trainees: &[Trainee]) -> BTreeSet<NaiveDate> {
    let mut covered = BTreeSet::new();
    for t in trainees {
        covered.extend(t.committed.iter().copied());
    }
    covered
}

/// Heures prévisionnelles d'un interne : historique entériné plus quotas
/// de la tentative en cours.
pub(super) fn projected_hours(trainee: &Trainee, quota: &[u32; 3]) -> i64 {
    let mut hours = trainee.committed_hours();
    for (slot, &n) in quota.iter().enumerate() {
        hours += i64::from(n) * ShiftKind::ALL[slot].hours();
    }
    hours
}

/// Indices des internes d'un niveau donné, dans l'ordre de l'effectif.
pub(super) fn tier_indices(trainees: &[Trainee], tier: Tier) -> Vec<usize> {
    trainees
        .iter()
        .enumerate()
        .filter(|(_, t)| t.tier == tier)
        .map(|(i, _)| i)
        .collect()
}

pub(super) fn find_trainee_index(trainees: &[Trainee], id: &TraineeId) -> Option<usize> {
    trainees.iter().position(|t| &t.id == id)
}
