use super::repair::{repair_pass, RepairScope};
use super::{conflicts, util, Conflict, Deficit, ScheduleError, ScheduleOptions};
use crate::calendar::CallCalendar;
use crate::eligibility::can_work;
use crate::flow::FlowGraph;
use crate::model::{ShiftKind, Tier, Trainee};
use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Phase normale : couverture de chaque jour de la fenêtre par un PGY-1 ou
/// un PGY-2, en autonomie.
///
/// Une tentative enchaîne quatre étapes : tirage de quotas par interne et
/// par type de garde, équilibrage des heures prévisionnelles, flot maximal
/// combiné, extraction. Si le flot n'atteint pas le nombre de jours, tout
/// est rejoué depuis le tirage ; au bout de `max_flow_attempts` tentatives,
/// la meilleure couverture partielle est retenue et l'écart devient déficit.
pub(super) fn run<R: Rng>(
    trainees: &mut [Trainee],
    start: NaiveDate,
    end: NaiveDate,
    opts: &ScheduleOptions,
    rng: &mut R,
) -> Result<(Vec<Deficit>, Vec<Conflict>), ScheduleError> {
    let mut calendar = CallCalendar::over(start, end);
    calendar.retain_uncovered(&util::committed_coverage(trainees));

    let mut pool = util::tier_indices(trainees, Tier::Pgy1);
    pool.extend(util::tier_indices(trainees, Tier::Pgy2));
    if pool.is_empty() {
        if calendar.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        return Err(ScheduleError::EmptyPool);
    }

    // jours tenables par interne et par type, mesurés avant toute affectation
    let eligible = count_eligible(trainees, &pool, &calendar);
    let required = calendar.total_days() as i64;

    let mut best: Option<Attempt> = None;
    for _ in 0..opts.max_flow_attempts.max(1) {
        let quotas = draw_quotas(&pool, &eligible, &calendar, opts, rng);
        let quotas = balance_hours(trainees, &pool, quotas, opts, rng);
        let attempt = solve_cover(trainees, &pool, &quotas, &calendar, rng);
        let full = attempt.flow >= required;
        if best.as_ref().map_or(true, |b| attempt.flow > b.flow) {
            best = Some(attempt);
        }
        if full {
            break;
        }
    }

    let mut deficits = Vec::new();
    if let Some(att) = best {
        let mut covered = [0u32; 3];
        for (idx, date) in att.picks {
            trainees[idx].working.insert(date);
            covered[util::kind_slot(ShiftKind::of(date))] += 1;
        }
        for (slot, &kind) in ShiftKind::ALL.iter().enumerate() {
            let want = calendar.count(kind) as u32;
            if covered[slot] < want {
                deficits.push(Deficit {
                    kind,
                    missing: want - covered[slot],
                });
            }
        }
    }

    repair_pass(trainees, RepairScope::Within(Tier::Pgy1), rng);
    repair_pass(trainees, RepairScope::Within(Tier::Pgy2), rng);
    repair_pass(trainees, RepairScope::Cross(Tier::Pgy1, Tier::Pgy2), rng);

    let unresolved = conflicts::detect(trainees);
    Ok((deficits, unresolved))
}

struct Attempt {
    flow: i64,
    picks: Vec<(usize, NaiveDate)>,
}

/// Jours de chaque type qu'un interne pourrait tenir, éligibilité mesurée à
/// l'entrée de phase. Sert de plafond aux quotas : inutile d'accorder plus
/// d'unités que de jours tenables.
fn count_eligible(trainees: &[Trainee], pool: &[usize], calendar: &CallCalendar) -> Vec<[u32; 3]> {
    pool.iter()
        .map(|&idx| {
            let mut counts = [0u32; 3];
            for (slot, &kind) in ShiftKind::ALL.iter().enumerate() {
                counts[slot] = calendar
                    .days_of(kind)
                    .iter()
                    .filter(|&&d| can_work(&trainees[idx], d))
                    .count() as u32;
            }
            counts
        })
        .collect()
}

/// Distribue une unité de quota par jour à couvrir, sur un interne tiré au
/// hasard. Un tirage n'est retenu que si l'interne garde de la marge sur ses
/// jours tenables ; après `quota_pick_attempts` refus l'unité reste à quai,
/// et le manque ressortira en déficit après le flot.
fn draw_quotas<R: Rng>(
    pool: &[usize],
    eligible: &[[u32; 3]],
    calendar: &CallCalendar,
    opts: &ScheduleOptions,
    rng: &mut R,
) -> Vec<[u32; 3]> {
    let mut quotas = vec![[0u32; 3]; pool.len()];
    for (slot, &kind) in ShiftKind::ALL.iter().enumerate() {
        for _ in 0..calendar.count(kind) {
            for _ in 0..opts.quota_pick_attempts.max(1) {
                let p = rng.random_range(0..pool.len());
                if eligible[p][slot] > quotas[p][slot] {
                    quotas[p][slot] += 1;
                    break;
                }
            }
        }
    }
    quotas
}

/// Rapproche les charges horaires prévisionnelles : tant que l'écart entre
/// l'interne le plus chargé et le moins chargé dépasse `balance_gap_hours`,
/// déplace une unité de quota du plus chargé vers un interne nettement moins
/// chargé, tiré au hasard. Le pas de 24 h peut faire osciller l'écart, d'où
/// le plafond `balance_transfer_cap` plutôt qu'un test de convergence.
fn balance_hours<R: Rng>(
    trainees: &[Trainee],
    pool: &[usize],
    mut quotas: Vec<[u32; 3]>,
    opts: &ScheduleOptions,
    rng: &mut R,
) -> Vec<[u32; 3]> {
    for _ in 0..opts.balance_transfer_cap {
        let hours: Vec<i64> = pool
            .iter()
            .zip(&quotas)
            .map(|(&idx, q)| util::projected_hours(&trainees[idx], q))
            .collect();

        let mut giver = 0;
        for p in 1..hours.len() {
            if hours[p] > hours[giver] {
                giver = p;
            }
        }
        let max_h = hours[giver];
        let min_h = hours.iter().copied().min().unwrap_or(max_h);
        if max_h - min_h <= opts.balance_gap_hours {
            break;
        }

        let receivers: Vec<usize> = (0..pool.len())
            .filter(|&p| p != giver && max_h - hours[p] >= opts.balance_gap_hours)
            .collect();
        let Some(&recv) = receivers.choose(rng) else {
            break;
        };
        let slots: Vec<usize> = (0..3).filter(|&s| quotas[giver][s] > 0).collect();
        let Some(&slot) = slots.choose(rng) else {
            break;
        };
        quotas[giver][slot] -= 1;
        quotas[recv][slot] += 1;
    }
    quotas
}

/// Construit et résout le flot de couverture d'une tentative.
///
/// Topologie : source → (interne, type) plafonné au quota → jour éligible de
/// ce type (capacité 1) → puits. Le flot maximal vaut le nombre de jours
/// couverts ; l'extraction relit les arcs (interne, type) → jour saturés.
fn solve_cover<R: Rng>(
    trainees: &[Trainee],
    pool: &[usize],
    quotas: &[[u32; 3]],
    calendar: &CallCalendar,
    rng: &mut R,
) -> Attempt {
    let mut g = FlowGraph::new();
    let source = g.add_node();
    let unit_base = g.node_count();
    for _ in 0..pool.len() * 3 {
        g.add_node();
    }

    let mut days: Vec<NaiveDate> = Vec::with_capacity(calendar.total_days());
    let mut day_slots: Vec<usize> = Vec::with_capacity(calendar.total_days());
    for (slot, &kind) in ShiftKind::ALL.iter().enumerate() {
        for &d in calendar.days_of(kind) {
            days.push(d);
            day_slots.push(slot);
        }
    }
    let day_base = g.node_count();
    for _ in &days {
        g.add_node();
    }
    let sink = g.add_node();

    let unit = |p: usize, slot: usize| unit_base + p * 3 + slot;
    for p in 0..pool.len() {
        for slot in 0..3 {
            if quotas[p][slot] > 0 {
                g.add_edge(source, unit(p, slot), i64::from(quotas[p][slot]));
            }
        }
    }
    for (d, &date) in days.iter().enumerate() {
        let slot = day_slots[d];
        for (p, &idx) in pool.iter().enumerate() {
            if quotas[p][slot] > 0 && can_work(&trainees[idx], date) {
                g.add_edge(unit(p, slot), day_base + d, 1);
            }
        }
        g.add_edge(day_base + d, sink, 1);
    }

    let flow = g.solve(source, sink, rng);

    let mut picks = Vec::new();
    for (p, &idx) in pool.iter().enumerate() {
        for slot in 0..3 {
            for &ei in g.outgoing(unit(p, slot)) {
                let e = g.edge(ei);
                if e.flow() > 0 {
                    picks.push((idx, days[e.to - day_base]));
                }
            }
        }
    }

    Attempt { flow, picks }
}
