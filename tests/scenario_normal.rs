#![forbid(unsafe_code)]
use chrono::NaiveDate;
use internat::{
    Phase, RoleCapability, Roster, ScheduleError, ScheduleOptions, Scheduler, ShiftKind, Tier,
    Trainee,
};
use std::collections::BTreeSet;

#[test]
fn every_day_of_the_window_is_covered_exactly_once() {
    let roster = pool_roster();
    let scheduler = Scheduler::new(&roster, seeded(29));
    let outcome = scheduler
        .run_normal(d(2025, 7, 1), d(2025, 7, 31))
        .unwrap();

    assert!(outcome.deficits.is_empty(), "{}", outcome.summary());
    assert_eq!(outcome.assignments.len(), 31);
    let dates: BTreeSet<NaiveDate> = outcome.assignments.iter().map(|r| r.date).collect();
    assert_eq!(dates.len(), 31);
    assert!(outcome
        .assignments
        .iter()
        .all(|r| r.kind == ShiftKind::of(r.date)));
    assert!(outcome
        .assignments
        .iter()
        .all(|r| r.date >= d(2025, 7, 1) && r.date <= d(2025, 7, 31)));

    // le PGY-3 de l'effectif reste en dehors de la phase normale
    let rita = roster.find_by_handle("rita").unwrap().id.clone();
    assert!(outcome.assignments.iter().all(|r| r.trainee != rita));
}

#[test]
fn committed_days_are_skipped_but_kept() {
    let mut roster = pool_roster();
    roster
        .find_mut_by_handle("carl")
        .unwrap()
        .committed
        .insert(d(2025, 7, 10));

    let scheduler = Scheduler::new(&roster, seeded(29));
    let outcome = scheduler
        .run_normal(d(2025, 7, 1), d(2025, 7, 31))
        .unwrap();

    assert!(outcome.deficits.is_empty(), "{}", outcome.summary());
    assert_eq!(outcome.assignments.len(), 30);
    assert!(outcome.assignments.iter().all(|r| r.date != d(2025, 7, 10)));
    // le roster d'origine garde son historique
    assert!(roster
        .find_by_handle("carl")
        .unwrap()
        .committed
        .contains(&d(2025, 7, 10)));
}

#[test]
fn vacations_are_never_scheduled_over() {
    let mut roster = pool_roster();
    {
        let dora = roster.find_mut_by_handle("dora").unwrap();
        for day in 7..=13 {
            dora.vacations.insert(d(2025, 7, day));
        }
    }

    let scheduler = Scheduler::new(&roster, seeded(17));
    let outcome = scheduler
        .run_normal(d(2025, 7, 1), d(2025, 7, 31))
        .unwrap();

    assert!(outcome.deficits.is_empty(), "{}", outcome.summary());
    let dora = roster.find_by_handle("dora").unwrap().id.clone();
    assert!(outcome
        .assignments
        .iter()
        .filter(|r| r.trainee == dora)
        .all(|r| r.date < d(2025, 7, 7) || r.date > d(2025, 7, 13)));
}

#[test]
fn second_half_window_runs_through_june() {
    let roster = pool_roster();
    let scheduler = Scheduler::new(&roster, seeded(3));
    let outcome = scheduler.run(Phase::SecondHalf, 2025).unwrap();

    assert!(outcome.deficits.is_empty(), "{}", outcome.summary());
    let dates: BTreeSet<NaiveDate> = outcome.assignments.iter().map(|r| r.date).collect();
    assert_eq!(dates.len(), 181); // 1er janvier au 30 juin 2026
    assert_eq!(dates.first(), Some(&d(2026, 1, 1)));
    assert_eq!(dates.last(), Some(&d(2026, 6, 30)));
}

#[test]
fn seeded_normal_runs_are_reproducible() {
    let roster = pool_roster();
    let first = Scheduler::new(&roster, seeded(8))
        .run_normal(d(2025, 7, 1), d(2025, 7, 31))
        .unwrap();
    let second = Scheduler::new(&roster, seeded(8))
        .run_normal(d(2025, 7, 1), d(2025, 7, 31))
        .unwrap();
    assert_eq!(first.assignments, second.assignments);
}

#[test]
fn a_window_without_any_junior_fails_fast() {
    let mut roster = Roster::default();
    roster.trainees.push(full_trainee("rita", Tier::Pgy3));

    let err = Scheduler::new(&roster, seeded(1))
        .run_normal(d(2025, 7, 1), d(2025, 7, 31))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::EmptyPool));
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn full_trainee(handle: &str, tier: Tier) -> Trainee {
    let mut t = Trainee::new(handle, handle.to_uppercase(), tier);
    t.caps = [Some(RoleCapability::full()); 12];
    t
}

/// Deux PGY-1, deux PGY-2 et un PGY-3 témoin qui ne doit jamais être tiré.
fn pool_roster() -> Roster {
    let mut roster = Roster::default();
    roster.trainees.push(full_trainee("ana", Tier::Pgy1));
    roster.trainees.push(full_trainee("bea", Tier::Pgy1));
    roster.trainees.push(full_trainee("carl", Tier::Pgy2));
    roster.trainees.push(full_trainee("dora", Tier::Pgy2));
    roster.trainees.push(full_trainee("rita", Tier::Pgy3));
    roster
}

fn seeded(seed: u64) -> ScheduleOptions {
    ScheduleOptions {
        seed: Some(seed),
        ..ScheduleOptions::default()
    }
}
