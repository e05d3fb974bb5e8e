use super::repair::{repair_pass, RepairScope};
use super::{conflicts, util, Conflict, Deficit, ScheduleError};
use crate::calendar::CallCalendar;
use crate::eligibility::can_work;
use crate::flow::FlowGraph;
use crate::model::{ShiftKind, Tier, Trainee};
use chrono::NaiveDate;
use rand::Rng;

/// Phase d'apprentissage : trois problèmes de flot successifs qui adossent
/// chaque PGY-1 à un senior.
///
/// 1. gardes courtes, trois par PGY-1, doublées par un PGY-3 ;
/// 2. samedis, un par PGY-1, doublé par un PGY-2 ;
/// 3. dimanches, un par PGY-1, doublé par un PGY-2.
///
/// Chaque problème voit les affectations des précédents : l'éligibilité est
/// réévaluée entre deux constructions. Un flot maximal sous l'objectif est
/// enregistré comme déficit, jamais retenté : à graphe identique, la valeur
/// du flot maximal ne dépend pas de l'ordre d'insertion des arcs.
pub(super) fn run<R: Rng>(
    trainees: &mut [Trainee],
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut R,
) -> Result<(Vec<Deficit>, Vec<Conflict>), ScheduleError> {
    let mut calendar = CallCalendar::over(start, end);
    calendar.retain_uncovered(&util::committed_coverage(trainees));

    let juniors = util::tier_indices(trainees, Tier::Pgy1);
    let seconds = util::tier_indices(trainees, Tier::Pgy2);
    let seniors = util::tier_indices(trainees, Tier::Pgy3);

    let mut deficits = Vec::new();

    if !juniors.is_empty() {
        if seniors.is_empty() {
            return Err(ScheduleError::EmptyTier { tier: Tier::Pgy3 });
        }
        if seconds.is_empty() {
            return Err(ScheduleError::EmptyTier { tier: Tier::Pgy2 });
        }

        let senior_cap = util::ceil_div(3 * juniors.len(), seniors.len());
        pair_days(
            trainees,
            &Pairing {
                left: &juniors,
                left_cap: 3,
                days: calendar.days_of(ShiftKind::Short),
                right: &seniors,
                right_cap: senior_cap as i64,
            },
            ShiftKind::Short,
            &mut deficits,
            rng,
        );

        let second_cap = util::ceil_div(juniors.len(), seconds.len()) as i64;
        for kind in [ShiftKind::Long24, ShiftKind::Long12] {
            pair_days(
                trainees,
                &Pairing {
                    left: &juniors,
                    left_cap: 1,
                    days: calendar.days_of(kind),
                    right: &seconds,
                    right_cap: second_cap,
                },
                kind,
                &mut deficits,
                rng,
            );
        }
    }

    repair_pass(trainees, RepairScope::Within(Tier::Pgy1), rng);
    repair_pass(trainees, RepairScope::Within(Tier::Pgy2), rng);
    repair_pass(trainees, RepairScope::Within(Tier::Pgy3), rng);
    repair_pass(trainees, RepairScope::Cross(Tier::Pgy1, Tier::Pgy2), rng);

    let unresolved = conflicts::detect(trainees);
    Ok((deficits, unresolved))
}

/// Un problème d'appariement : chaque jour retenu reçoit exactement un
/// interne de gauche et un de droite, sous plafond individuel de chaque côté.
struct Pairing<'a> {
    left: &'a [usize],
    left_cap: i64,
    days: &'a [NaiveDate],
    right: &'a [usize],
    right_cap: i64,
}

/// Résout un appariement et inscrit les dates obtenues dans les fournées de
/// travail. Tout écart entre l'objectif et le flot atteint devient un déficit.
fn pair_days<R: Rng>(
    trainees: &mut [Trainee],
    pairing: &Pairing,
    kind: ShiftKind,
    deficits: &mut Vec<Deficit>,
    rng: &mut R,
) {
    let required = pairing.left_cap * pairing.left.len() as i64;
    if required == 0 {
        return;
    }

    let (flow, picks) = solve_pairing(trainees, pairing, rng);
    for (idx, date) in picks {
        trainees[idx].working.insert(date);
    }
    if flow < required {
        deficits.push(Deficit {
            kind,
            missing: (required - flow) as u32,
        });
    }
}

/// Construit et résout le graphe d'appariement.
///
/// Topologie : source → interne gauche → (entrée jour → sortie jour) →
/// interne droit → puits. Le dédoublement des nœuds jour force une garde au
/// plus par jour de chaque côté ; les arcs interne→jour n'existent que si
/// l'éligibilité du moment l'autorise.
fn solve_pairing<R: Rng>(
    trainees: &[Trainee],
    pairing: &Pairing,
    rng: &mut R,
) -> (i64, Vec<(usize, NaiveDate)>) {
    let mut g = FlowGraph::new();
    let source = g.add_node();
    let left_nodes: Vec<usize> = pairing.left.iter().map(|_| g.add_node()).collect();
    let day_base = g.node_count();
    for _ in pairing.days {
        g.add_node();
        g.add_node();
    }
    let right_nodes: Vec<usize> = pairing.right.iter().map(|_| g.add_node()).collect();
    let sink = g.add_node();

    for &ln in &left_nodes {
        g.add_edge(source, ln, pairing.left_cap);
    }
    for (d, &day) in pairing.days.iter().enumerate() {
        let day_in = day_base + 2 * d;
        let day_out = day_in + 1;
        g.add_edge(day_in, day_out, 1);
        for (k, &idx) in pairing.left.iter().enumerate() {
            if can_work(&trainees[idx], day) {
                g.add_edge(left_nodes[k], day_in, 1);
            }
        }
        for (k, &idx) in pairing.right.iter().enumerate() {
            if can_work(&trainees[idx], day) {
                g.add_edge(day_out, right_nodes[k], 1);
            }
        }
    }
    for &rn in &right_nodes {
        g.add_edge(rn, sink, pairing.right_cap);
    }

    let flow = g.solve(source, sink, rng);

    let day_of = |node: usize| pairing.days[(node - day_base) / 2];
    let mut picks = Vec::new();
    for (k, &ln) in left_nodes.iter().enumerate() {
        for &ei in g.outgoing(ln) {
            let e = g.edge(ei);
            if e.flow() > 0 {
                picks.push((pairing.left[k], day_of(e.to)));
            }
        }
    }
    // côté droit, le flot se lit sur les arcs retour : un arc vers la sortie
    // d'un jour avec un flot négatif marque la garde doublée ce jour-là
    for (k, &rn) in right_nodes.iter().enumerate() {
        for &ei in g.outgoing(rn) {
            let e = g.edge(ei);
            if e.flow() < 0 {
                picks.push((pairing.right[k], day_of(e.to)));
            }
        }
    }

    (flow, picks)
}
