//! Découpage du calendrier : fenêtres de planification et répartition des
//! jours par type de garde. L'année académique démarre en juillet.

use crate::model::ShiftKind;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

/// Fenêtre de planification demandée au moteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Période d'initiation PGY-1 : juillet–août.
    Training,
    /// Premier semestre académique : juillet–décembre.
    FirstHalf,
    /// Second semestre académique : janvier–juin (année civile suivante).
    SecondHalf,
}

impl Phase {
    /// Bornes incluses de la fenêtre pour l'année académique débutant en
    /// juillet de `year`.
    pub fn window(self, year: i32) -> (NaiveDate, NaiveDate) {
        match self {
            Phase::Training => (date(year, 7, 1), date(year, 8, 31)),
            Phase::FirstHalf => (date(year, 7, 1), date(year, 12, 31)),
            Phase::SecondHalf => (date(year + 1, 1, 1), date(year + 1, 6, 30)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Training => "training",
            Phase::FirstHalf => "first-half",
            Phase::SecondHalf => "second-half",
        };
        f.write_str(s)
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    // Bornes fixes de fenêtres : toujours des dates valides.
    NaiveDate::from_ymd_opt(year, month, day).expect("calendar window bound")
}

/// Mois académique d'une date : juillet = 0 … juin = 11.
pub fn academic_month(date: NaiveDate) -> usize {
    use chrono::Datelike;
    (date.month() as usize + 5) % 12
}

/// Mois académiques touchés par une fenêtre, bornes comprises.
pub fn academic_months(start: NaiveDate, end: NaiveDate) -> BTreeSet<usize> {
    let mut months = BTreeSet::new();
    let mut current = start;
    while current <= end {
        months.insert(academic_month(current));
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    months
}

/// Jours d'une fenêtre, classés par type de garde, en ordre croissant.
#[derive(Debug, Clone, Default)]
pub struct CallCalendar {
    short_days: Vec<NaiveDate>,
    saturdays: Vec<NaiveDate>,
    sundays: Vec<NaiveDate>,
}

impl CallCalendar {
    /// Classe chaque jour de `[start, end]` dans son panier. Une fenêtre
    /// inversée produit un calendrier vide.
    pub fn over(start: NaiveDate, end: NaiveDate) -> Self {
        let mut cal = CallCalendar::default();
        let mut current = start;
        while current <= end {
            match ShiftKind::of(current) {
                ShiftKind::Short => cal.short_days.push(current),
                ShiftKind::Long24 => cal.saturdays.push(current),
                ShiftKind::Long12 => cal.sundays.push(current),
            }
            current = match current.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        cal
    }

    /// Retire les jours déjà couverts par l'historique figé d'un interne
    /// quelconque : ces jours ont déjà leur garde.
    pub fn retain_uncovered(&mut self, covered: &BTreeSet<NaiveDate>) {
        self.short_days.retain(|d| !covered.contains(d));
        self.saturdays.retain(|d| !covered.contains(d));
        self.sundays.retain(|d| !covered.contains(d));
    }

    pub fn days_of(&self, kind: ShiftKind) -> &[NaiveDate] {
        match kind {
            ShiftKind::Short => &self.short_days,
            ShiftKind::Long24 => &self.saturdays,
            ShiftKind::Long12 => &self.sundays,
        }
    }

    pub fn count(&self, kind: ShiftKind) -> usize {
        self.days_of(kind).len()
    }

    pub fn total_days(&self) -> usize {
        self.short_days.len() + self.saturdays.len() + self.sundays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_days() == 0
    }

    /// Tous les jours de la fenêtre, tous types confondus, en ordre croissant.
    pub fn all_days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = self
            .short_days
            .iter()
            .chain(self.saturdays.iter())
            .chain(self.sundays.iter())
            .copied()
            .collect();
        days.sort_unstable();
        days
    }
}
