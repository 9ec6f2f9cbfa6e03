#![forbid(unsafe_code)]
mod common;

use common::{day, fixture};
use garde::io;
use tempfile::tempdir;

#[test]
fn import_supervisors_and_buildings() {
    let dir = tempdir().unwrap();
    let people = dir.path().join("people.csv");
    std::fs::write(
        &people,
        "name,email,phone,notes\nAlice Martin,alice@example.org,0600000001,\nBob Durand,bob@example.org,0600000002,nuit uniquement\n",
    )
    .unwrap();
    let sups = io::import_supervisors_csv(&people).unwrap();
    assert_eq!(sups.len(), 2);
    assert_eq!(sups[0].notes, None);
    assert_eq!(sups[1].notes.as_deref(), Some("nuit uniquement"));

    let buildings = dir.path().join("buildings.csv");
    std::fs::write(&buildings, "building_number,floor_numbers\n1,0;1;2\n2,\n").unwrap();
    let rows = io::import_buildings_csv(&buildings).unwrap();
    assert_eq!(rows[0], io::BuildingRow { number: 1, floors: vec![0, 1, 2] });
    assert!(rows[1].floors.is_empty());
}

#[test]
fn bad_rows_are_rejected() {
    let dir = tempdir().unwrap();
    let people = dir.path().join("people.csv");
    std::fs::write(&people, "name,email,phone\nAlice,,0600000001\n").unwrap();
    assert!(io::import_supervisors_csv(&people).is_err());
    assert!(io::parse_floor_list("1;deux").is_err());
}

#[test]
fn export_shifts_csv_uses_numbers_and_names() {
    let fx = fixture();
    fx.scheduler
        .create_shift(fx.shift(&fx.alice, day(2024, 3, 4), "08:00", "12:00"))
        .unwrap();
    let dir = tempdir().unwrap();
    let out = dir.path().join("shifts.csv");
    io::export_shifts_csv(&out, &fx.scheduler.all_shifts().unwrap()).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,date,start_time,end_time,building_number,floor_number,supervisor")
    );
    assert!(lines
        .next()
        .unwrap()
        .ends_with(",2024-03-04,08:00,12:00,1,1,Alice Martin"));
}
