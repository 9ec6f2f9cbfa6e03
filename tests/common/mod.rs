#![allow(dead_code)]
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use garde::{
    notification::SharedNotifier, Building, BuildingId, Floor, FloorId, NewShift, NewVacation,
    NoopNotifier, Notifier, Roster, RosterRepository, Scheduler, Shift, ShiftId, Supervisor,
    SupervisorId,
};
use std::sync::{Arc, Mutex};

/// Deux bâtiments {B1: [F1, F2], B2: [F3]}, deux surveillantes.
pub struct Fixture {
    pub scheduler: Scheduler<RosterRepository>,
    pub alice: SupervisorId,
    pub bob: SupervisorId,
    pub b1: BuildingId,
    pub b2: BuildingId,
    pub f1: FloorId,
    pub f2: FloorId,
    pub f3: FloorId,
}

pub fn fixture() -> Fixture {
    fixture_with(Arc::new(NoopNotifier))
}

pub fn fixture_with(notifier: SharedNotifier) -> Fixture {
    let repo = RosterRepository::in_memory(Roster::default());
    let alice = repo
        .add_supervisor(Supervisor::new("Alice Martin", "alice@example.org", "0600000001"))
        .unwrap();
    let bob = repo
        .add_supervisor(Supervisor::new("Bob Durand", "bob@example.org", "0600000002"))
        .unwrap();
    let b1 = repo.add_building(1).unwrap();
    let f1 = repo.add_floor(&b1, 1).unwrap();
    let f2 = repo.add_floor(&b1, 2).unwrap();
    let b2 = repo.add_building(2).unwrap();
    let f3 = repo.add_floor(&b2, 1).unwrap();

    Fixture {
        scheduler: Scheduler::with_notifier(repo, notifier),
        alice,
        bob,
        b1,
        b2,
        f1,
        f2,
        f3,
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

impl Fixture {
    /// Garde sur B1/F1.
    pub fn shift(&self, who: &SupervisorId, date: NaiveDate, start: &str, end: &str) -> NewShift {
        NewShift {
            date: Some(date),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            building: Some(self.b1.clone()),
            floor: Some(self.f1.clone()),
            supervisor: Some(who.clone()),
            note: None,
            created_by: Some("admin".to_string()),
        }
    }

    pub fn vacation(&self, who: &SupervisorId, from: NaiveDate, to: NaiveDate) -> NewVacation {
        NewVacation {
            supervisor: Some(who.clone()),
            start_date: Some(from),
            end_date: Some(to),
            reason: Some("congé annuel".to_string()),
            note: None,
            created_by: None,
        }
    }
}

/// Garde les notifications reçues : (email, shift).
#[derive(Default)]
pub struct Recording {
    pub sent: Mutex<Vec<(String, ShiftId)>>,
}

impl Notifier for Recording {
    fn notify_shift_assigned(
        &self,
        supervisor: &Supervisor,
        shift: &Shift,
        _: &Building,
        _: &Floor,
    ) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((supervisor.email.clone(), shift.id.clone()));
        Ok(())
    }
}

pub struct Failing;

impl Notifier for Failing {
    fn notify_shift_assigned(&self, _: &Supervisor, _: &Shift, _: &Building, _: &Floor) -> Result<()> {
        Err(anyhow!("smtp unreachable"))
    }
}

pub struct Panicking;

impl Notifier for Panicking {
    fn notify_shift_assigned(&self, _: &Supervisor, _: &Shift, _: &Building, _: &Floor) -> Result<()> {
        panic!("renderer exploded")
    }
}
