//! Règles d'éligibilité d'un interne pour une date donnée.
//!
//! `can_work` est une fonction pure de l'état de l'interne et de la date :
//! elle est appelée à la construction du graphe de flot comme pendant la
//! réparation, son déterminisme est donc porteur.

use crate::calendar::academic_month;
use crate::model::{ShiftKind, Trainee};
use chrono::{Datelike, NaiveDate, Weekday};

/// Règles, évaluées dans l'ordre, tout échec court-circuite à `false` :
/// 1. jour de congés ;
/// 2. aucune capacité enregistrée pour le mois académique de la date
///    (erreur de données à signaler en amont, voir la validation du run) ;
/// 3. week-end : capacité longue (ou flex en initiation), et ni la veille ni
///    le lendemain déjà en garde ;
/// 4. semaine : capacité courte (ou flex en initiation), et pas adossé à un
///    samedi travaillé (veille de) ni à un dimanche travaillé (lendemain de) ;
/// 5. date butoir d'initiation : aucune garde le jour même ni avant.
pub fn can_work(trainee: &Trainee, date: NaiveDate) -> bool {
    if trainee.vacations.contains(&date) {
        return false;
    }

    let cap = match trainee.capability_for_month(academic_month(date)) {
        Some(cap) => cap,
        None => return false,
    };

    if ShiftKind::of(date).is_weekend() {
        if !cap.permits_long(trainee.in_training) {
            return false;
        }
        if let Some(prev) = date.pred_opt() {
            if trainee.is_working(prev) {
                return false;
            }
        }
        if let Some(next) = date.succ_opt() {
            if trainee.is_working(next) {
                return false;
            }
        }
    } else {
        if !cap.permits_short(trainee.in_training) {
            return false;
        }
        if let Some(next) = date.succ_opt() {
            if next.weekday() == Weekday::Sat && trainee.is_working(next) {
                return false;
            }
        }
        if let Some(prev) = date.pred_opt() {
            if prev.weekday() == Weekday::Sun && trainee.is_working(prev) {
                return false;
            }
        }
    }

    if trainee.tier.policy().enforces_cutoff {
        if let Some(cutoff) = trainee.cutoff {
            if date <= cutoff {
                return false;
            }
        }
    }

    true
}
