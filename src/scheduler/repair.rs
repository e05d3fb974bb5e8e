use super::{conflicts, util, ScheduleError};
use crate::eligibility::can_work;
use crate::model::{ShiftKind, Tier, Trainee, TraineeId};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

/// Périmètre d'une passe de réparation : échange entre internes du même
/// niveau, ou entre les deux niveaux d'une paire.
#[derive(Debug, Clone, Copy)]
pub(super) enum RepairScope {
    Within(Tier),
    Cross(Tier, Tier),
}

impl RepairScope {
    fn covers(self, tier: Tier) -> bool {
        match self {
            RepairScope::Within(t) => tier == t,
            RepairScope::Cross(a, b) => tier == a || tier == b,
        }
    }

    fn partner_of(self, tier: Tier) -> Tier {
        match self {
            RepairScope::Within(t) => t,
            RepairScope::Cross(a, b) => {
                if tier == a {
                    b
                } else {
                    a
                }
            }
        }
    }
}

/// Une passe de réparation : pour chaque garde devenue illégale dans le
/// périmètre, cherche un partenaire et tente un échange de dates de même
/// type. Les conflits restants seront relevés par la détection finale.
pub(super) fn repair_pass<R: Rng>(trainees: &mut [Trainee], scope: RepairScope, rng: &mut R) {
    let found = conflicts::detect_in(trainees, |tier| scope.covers(tier));
    for c in found {
        let Some(i) = util::find_trainee_index(trainees, &c.trainee) else {
            continue;
        };
        // un échange précédent peut avoir assaini cette date entre-temps
        if !trainees[i].working.contains(&c.date) || can_work(&trainees[i], c.date) {
            continue;
        }
        try_relocate(trainees, i, c.date, c.kind, scope, rng);
    }
}

/// Cherche un partenaire capable de reprendre `date` en échange d'une de ses
/// propres gardes du même type. L'échange est appliqué puis re-vérifié des
/// deux côtés, et annulé si l'un des deux devient illégal.
fn try_relocate<R: Rng>(
    trainees: &mut [Trainee],
    i: usize,
    date: NaiveDate,
    kind: ShiftKind,
    scope: RepairScope,
    rng: &mut R,
) -> bool {
    let partner_tier = scope.partner_of(trainees[i].tier);

    let mut candidates: Vec<usize> = (0..trainees.len())
        .filter(|&j| j != i && trainees[j].tier == partner_tier)
        .collect();
    candidates.shuffle(rng);

    for j in candidates {
        if trainees[j].is_working(date) || !can_work(&trainees[j], date) {
            continue;
        }
        let mut offers: Vec<NaiveDate> = trainees[j]
            .working
            .iter()
            .copied()
            .filter(|&d| ShiftKind::of(d) == kind && !trainees[i].is_working(d))
            .collect();
        offers.shuffle(rng);

        for other in offers {
            if !can_work(&trainees[i], other) {
                continue;
            }
            raw_swap(trainees, i, date, j, other);
            if can_work(&trainees[i], other) && can_work(&trainees[j], date) {
                return true;
            }
            raw_swap(trainees, i, other, j, date);
        }
    }
    false
}

/// Échange brut : `a` cède `da` et reprend `db`, `b` fait l'inverse.
/// Aucune validation ici, l'appelant vérifie avant et après.
fn raw_swap(trainees: &mut [Trainee], a: usize, da: NaiveDate, b: usize, db: NaiveDate) {
    trainees[a].working.remove(&da);
    trainees[a].working.insert(db);
    trainees[b].working.remove(&db);
    trainees[b].working.insert(da);
}

/// Échange manuel entre deux internes, exposé par [`super::Scheduler::swap_days`].
///
/// Valide que chacun tient bien sa date dans la fournée courante (jamais dans
/// l'historique entériné), applique l'échange puis re-vérifie l'éligibilité
/// des deux dates reçues ; tout manquement annule l'opération.
pub(super) fn swap_days(
    trainees: &mut [Trainee],
    a: &TraineeId,
    da: NaiveDate,
    b: &TraineeId,
    db: NaiveDate,
) -> Result<(), ScheduleError> {
    let Some(i) = util::find_trainee_index(trainees, a) else {
        return Err(ScheduleError::UnknownTrainee(a.as_str().to_string()));
    };
    let Some(j) = util::find_trainee_index(trainees, b) else {
        return Err(ScheduleError::UnknownTrainee(b.as_str().to_string()));
    };
    if i == j {
        return Err(ScheduleError::SwapInvalid("both sides name the same trainee"));
    }
    if !trainees[i].working.contains(&da) {
        return Err(ScheduleError::SwapInvalid(
            "first trainee does not hold the first date",
        ));
    }
    if !trainees[j].working.contains(&db) {
        return Err(ScheduleError::SwapInvalid(
            "second trainee does not hold the second date",
        ));
    }
    if trainees[i].is_working(db) || trainees[j].is_working(da) {
        return Err(ScheduleError::SwapInvalid(
            "receiving side already on duty that day",
        ));
    }

    raw_swap(trainees, i, da, j, db);
    if !can_work(&trainees[i], db) || !can_work(&trainees[j], da) {
        raw_swap(trainees, i, db, j, da);
        return Err(ScheduleError::SwapInvalid("swap breaks eligibility rules"));
    }
    Ok(())
}
