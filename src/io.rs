use crate::model::{Roster, Supervisor};
use crate::scheduler::ShiftDetails;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de surveillantes depuis CSV: header `name,email,phone[,notes]`
pub fn import_supervisors_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Supervisor>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let email = rec.get(1).context("missing email")?.trim();
        let phone = rec.get(2).context("missing phone")?.trim();
        if name.is_empty() || email.is_empty() || phone.is_empty() {
            bail!("invalid supervisor row (empty field)");
        }
        let mut sup = Supervisor::new(name, email, phone);
        sup.notes = rec
            .get(3)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        out.push(sup);
    }
    Ok(out)
}

/// Ligne d'import de bâtiment : numéro + étages dans l'ordre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingRow {
    pub number: u32,
    pub floors: Vec<i32>,
}

/// Import de bâtiments: header `building_number,floor_numbers` (étages séparés par `;`)
pub fn import_buildings_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<BuildingRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let raw = rec.get(0).context("missing building_number")?.trim();
        let number: u32 = raw
            .parse()
            .with_context(|| format!("invalid building number: {raw}"))?;
        let floors = parse_floor_list(rec.get(1).unwrap_or(""))
            .with_context(|| format!("invalid floors for building {number}"))?;
        out.push(BuildingRow { number, floors });
    }
    Ok(out)
}

/// "0;1;2" ou "0,1,2" → [0, 1, 2]
pub fn parse_floor_list(raw: &str) -> anyhow::Result<Vec<i32>> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            chunk
                .parse::<i32>()
                .with_context(|| format!("invalid floor number: {chunk}"))
        })
        .collect()
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des gardes:
/// header `id,date,start_time,end_time,building_number,floor_number,supervisor`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, shifts: &[ShiftDetails]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "date",
        "start_time",
        "end_time",
        "building_number",
        "floor_number",
        "supervisor",
    ])?;
    for d in shifts {
        let s = &d.shift;
        let date = s.date.to_string();
        let building = d
            .building
            .as_ref()
            .map(|b| b.number.to_string())
            .unwrap_or_default();
        let floor = d
            .floor
            .as_ref()
            .map(|f| f.number.to_string())
            .unwrap_or_default();
        let supervisor = d.supervisor.as_ref().map(|p| p.name.as_str()).unwrap_or("");
        w.write_record([
            s.id.as_str(),
            date.as_str(),
            s.start_time.as_str(),
            s.end_time.as_str(),
            building.as_str(),
            floor.as_str(),
            supervisor,
        ])?;
    }
    w.flush()?;
    Ok(())
}
