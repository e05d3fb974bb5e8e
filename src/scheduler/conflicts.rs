use super::Conflict;
use crate::eligibility::can_work;
use crate::model::{ShiftKind, Tier, Trainee};

/// Balaie les dates de travail de la fournée courante et signale celles que
/// les règles d'éligibilité n'autorisent plus. Les dates entérinées ne sont
/// jamais remises en cause : seule la fournée en cours est mobile.
pub(super) fn detect(trainees: &[Trainee]) -> Vec<Conflict> {
    detect_in(trainees, |_| true)
}

/// Variante filtrée par niveau, utilisée pour limiter une passe de
/// réparation aux internes concernés.
pub(super) fn detect_in<F>(trainees: &[Trainee], keep: F) -> Vec<Conflict>
where
    F: Fn(Tier) -> bool,
{
    let mut out = Vec::new();

    for t in trainees {
        if !keep(t.tier) {
            continue;
        }
        for &date in &t.working {
            if !can_work(t, date) {
                out.push(Conflict {
                    trainee: t.id.clone(),
                    date,
                    kind: ShiftKind::of(date),
                });
            }
        }
    }

    out
}
