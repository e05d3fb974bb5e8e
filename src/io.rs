use crate::model::{AssignmentRecord, RoleCapability, Roster, Tier, Trainee};
use crate::rotation::RotationCatalog;
use crate::scheduler::ScheduleOutcome;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Import d'internes depuis CSV : header
/// `handle,display_name,tier[,in_training][,cutoff][,vacations][,committed][,rotations]`.
///
/// Les colonnes de dates acceptent des listes `;`-séparées de jours
/// `YYYY-MM-DD` ou d'intervalles `YYYY-MM-DD..YYYY-MM-DD` (bornes comprises).
/// `rotations` liste jusqu'à douze codes du catalogue, de juillet à juin ;
/// sans rotation déclarée, l'interne est réputé apte tous les mois.
pub fn import_trainees_csv<P: AsRef<Path>>(
    path: P,
    catalog: &RotationCatalog,
) -> anyhow::Result<Vec<Trainee>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        let tier_raw = rec.get(2).context("missing tier")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid trainee row (empty)");
        }
        let tier =
            parse_tier(tier_raw).with_context(|| format!("invalid tier for handle {handle}"))?;
        let mut trainee = Trainee::new(handle.to_string(), display.to_string(), tier);

        if let Some(flag) = rec.get(3) {
            let flag = flag.trim();
            if !flag.is_empty() {
                trainee.in_training = parse_bool(flag)
                    .with_context(|| format!("invalid in_training value for handle {handle}"))?;
            }
        }
        if let Some(raw) = rec.get(4) {
            let raw = raw.trim();
            if !raw.is_empty() {
                let cutoff = parse_date(raw)
                    .with_context(|| format!("invalid cutoff value for handle {handle}"))?;
                trainee.cutoff = Some(cutoff);
            }
        }
        if let Some(ranges) = rec.get(5) {
            let ranges = ranges.trim();
            if !ranges.is_empty() {
                trainee.vacations = parse_dates(ranges)
                    .with_context(|| format!("invalid vacations value for handle {handle}"))?;
            }
        }
        if let Some(ranges) = rec.get(6) {
            let ranges = ranges.trim();
            if !ranges.is_empty() {
                trainee.committed = parse_dates(ranges)
                    .with_context(|| format!("invalid committed value for handle {handle}"))?;
            }
        }
        match rec.get(7).map(str::trim) {
            Some(codes) if !codes.is_empty() => {
                let codes: Vec<&str> = codes.split(';').map(str::trim).collect();
                catalog
                    .apply(&mut trainee, &codes)
                    .with_context(|| format!("invalid rotations for handle {handle}"))?;
            }
            _ => {
                trainee.caps = [Some(RoleCapability::full()); 12];
            }
        }
        out.push(trainee);
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_tier(s: &str) -> anyhow::Result<Tier> {
    match s.to_ascii_uppercase().as_str() {
        "1" | "PGY1" | "PGY-1" => Ok(Tier::Pgy1),
        "2" | "PGY2" | "PGY-2" => Ok(Tier::Pgy2),
        "3" | "PGY3" | "PGY-3" => Ok(Tier::Pgy3),
        _ => bail!("expected tier 1, 2 or 3"),
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_dates(raw: &str) -> anyhow::Result<BTreeSet<NaiveDate>> {
    let mut out = BTreeSet::new();
    for chunk in raw.split(';') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        if let Some((start_raw, end_raw)) = chunk.split_once("..").or_else(|| chunk.split_once('/'))
        {
            let start = parse_date(start_raw.trim())?;
            let end = parse_date(end_raw.trim())?;
            if end < start {
                bail!("range ends before it starts: {chunk}");
            }
            let mut current = start;
            while current <= end {
                out.insert(current);
                current = match current.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }
        } else {
            out.insert(parse_date(chunk)?);
        }
    }
    Ok(out)
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export JSON d'une issue de run, diagnostics compris
pub fn export_outcome_json<P: AsRef<Path>>(path: P, outcome: &ScheduleOutcome) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(outcome)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des affectations : header `date,kind,hours,handle,display_name`
pub fn export_assignments_csv<P: AsRef<Path>>(
    path: P,
    roster: &Roster,
    records: &[AssignmentRecord],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "kind", "hours", "handle", "display_name"])?;
    let mut hours_buf = itoa::Buffer::new();
    for rec in records {
        let (handle, display) = roster
            .find_by_id(&rec.trainee)
            .map(|t| (t.handle.as_str(), t.display_name.as_str()))
            .unwrap_or(("", ""));
        let date = rec.date.format("%Y-%m-%d").to_string();
        w.write_record([
            date.as_str(),
            rec.kind.label(),
            hours_buf.format(rec.kind.hours()),
            handle,
            display,
        ])?;
    }
    w.flush()?;
    Ok(())
}
