#![forbid(unsafe_code)]
use chrono::NaiveDate;
use internat::{
    RoleCapability, Roster, ScheduleError, ScheduleOptions, Scheduler, ShiftKind, Tier, Trainee,
    TraineeId,
};
use std::collections::BTreeSet;

#[test]
fn swap_exchanges_exactly_the_two_dates() {
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.working.insert(d(2025, 7, 9));
    let mut bob = full_trainee("bob", Tier::Pgy1);
    bob.working.insert(d(2025, 7, 17));
    bob.working.insert(d(2025, 7, 22));
    let (alice_id, bob_id) = (alice.id.clone(), bob.id.clone());
    roster.trainees.push(alice);
    roster.trainees.push(bob);

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    scheduler
        .swap_days(&alice_id, d(2025, 7, 9), &bob_id, d(2025, 7, 17))
        .unwrap();

    let alice = scheduler.trainee("alice").unwrap();
    let bob = scheduler.trainee("bob").unwrap();
    assert_eq!(alice.working, dates(&[d(2025, 7, 17)]));
    assert_eq!(bob.working, dates(&[d(2025, 7, 9), d(2025, 7, 22)]));
}

#[test]
fn swap_rejects_a_date_the_trainee_does_not_hold() {
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.working.insert(d(2025, 7, 9));
    let mut bob = full_trainee("bob", Tier::Pgy1);
    bob.working.insert(d(2025, 7, 17));
    let (alice_id, bob_id) = (alice.id.clone(), bob.id.clone());
    roster.trainees.push(alice);
    roster.trainees.push(bob);

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    let err = scheduler
        .swap_days(&alice_id, d(2025, 7, 10), &bob_id, d(2025, 7, 17))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::SwapInvalid(_)));
    assert_eq!(scheduler.trainee("alice").unwrap().working, dates(&[d(2025, 7, 9)]));
}

#[test]
fn swap_rejects_an_unknown_trainee() {
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.working.insert(d(2025, 7, 9));
    let alice_id = alice.id.clone();
    roster.trainees.push(alice);

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    let ghost = TraineeId::new("ghost");
    let err = scheduler
        .swap_days(&alice_id, d(2025, 7, 9), &ghost, d(2025, 7, 17))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownTrainee(_)));
}

#[test]
fn swap_reverts_when_the_result_breaks_a_rule() {
    // bob garde son lundi 7 ; reprendre le dimanche 6 l'y adosserait
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.working.insert(d(2025, 7, 6)); // dimanche
    let mut bob = full_trainee("bob", Tier::Pgy1);
    bob.working.insert(d(2025, 7, 7)); // lundi
    bob.working.insert(d(2025, 7, 14)); // lundi suivant
    let (alice_id, bob_id) = (alice.id.clone(), bob.id.clone());
    roster.trainees.push(alice);
    roster.trainees.push(bob);

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    let err = scheduler
        .swap_days(&alice_id, d(2025, 7, 6), &bob_id, d(2025, 7, 14))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::SwapInvalid(_)));

    let alice = scheduler.trainee("alice").unwrap();
    let bob = scheduler.trainee("bob").unwrap();
    assert_eq!(alice.working, dates(&[d(2025, 7, 6)]));
    assert_eq!(bob.working, dates(&[d(2025, 7, 7), d(2025, 7, 14)]));
}

#[test]
fn repair_relocates_an_illegal_saturday() {
    // alice tient samedi 5 et dimanche 6 : les deux gardes se bloquent
    // mutuellement, bob offre son samedi 12 comme porte de sortie
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.working.insert(d(2025, 7, 5));
    alice.working.insert(d(2025, 7, 6));
    let mut bob = full_trainee("bob", Tier::Pgy1);
    bob.working.insert(d(2025, 7, 12));
    roster.trainees.push(alice);
    roster.trainees.push(bob);

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    assert_eq!(scheduler.detect_conflicts().len(), 2);

    let unresolved = scheduler.repair();
    assert!(unresolved.is_empty());

    let alice = scheduler.trainee("alice").unwrap();
    let bob = scheduler.trainee("bob").unwrap();
    assert_eq!(alice.working, dates(&[d(2025, 7, 6), d(2025, 7, 12)]));
    assert_eq!(bob.working, dates(&[d(2025, 7, 5)]));
}

#[test]
fn repair_surfaces_what_it_cannot_fix() {
    // congé posé après coup sur une garde tenue, aucun partenaire n'a de
    // samedi à offrir en échange
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.working.insert(d(2025, 7, 5));
    alice.vacations.insert(d(2025, 7, 5));
    roster.trainees.push(alice);
    roster.trainees.push(full_trainee("bob", Tier::Pgy1));

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    let unresolved = scheduler.repair();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].date, d(2025, 7, 5));
    assert_eq!(unresolved[0].kind, ShiftKind::Long24);
    assert_eq!(scheduler.trainee("alice").unwrap().working, dates(&[d(2025, 7, 5)]));
}

#[test]
fn committed_history_is_never_flagged_nor_moved() {
    // une garde entérinée qui chevauche un congé est un problème de saisie,
    // pas un conflit que le moteur aurait le droit de déplacer
    let mut roster = Roster::default();
    let mut alice = full_trainee("alice", Tier::Pgy1);
    alice.committed.insert(d(2025, 7, 5));
    alice.vacations.insert(d(2025, 7, 5));
    roster.trainees.push(alice);

    let mut scheduler = Scheduler::new(&roster, seeded(5));
    assert!(scheduler.detect_conflicts().is_empty());
    assert!(scheduler.repair().is_empty());
    assert!(scheduler
        .trainee("alice")
        .unwrap()
        .committed
        .contains(&d(2025, 7, 5)));
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dates(days: &[NaiveDate]) -> BTreeSet<NaiveDate> {
    days.iter().copied().collect()
}

fn full_trainee(handle: &str, tier: Tier) -> Trainee {
    let mut t = Trainee::new(handle, handle.to_uppercase(), tier);
    t.caps = [Some(RoleCapability::full()); 12];
    t
}

fn seeded(seed: u64) -> ScheduleOptions {
    ScheduleOptions {
        seed: Some(seed),
        ..ScheduleOptions::default()
    }
}
