//! Interfaces d'accès aux données consommées par le scheduler, et leur
//! implémentation sur un `Roster` en mémoire (optionnellement persisté).

use crate::model::{
    Building, BuildingId, Floor, FloorId, Roster, Shift, ShiftId, Supervisor, SupervisorId,
    Vacation, VacationId,
};
use crate::storage::{Commit, JsonStorage, Storage};
use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};
use thiserror::Error;

/// Le roster persistant a été modifié par un autre processus depuis le dernier
/// chargement. La copie en mémoire est rafraîchie ; l'écriture n'a pas eu lieu.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("roster changed on disk (now at revision {revision}), reload and retry")]
pub struct StaleRoster {
    pub revision: u64,
}

const REGISTRY_ATTEMPTS: usize = 5;

pub trait SupervisorDirectory {
    fn supervisor(&self, id: &SupervisorId) -> Result<Option<Supervisor>>;
    fn supervisors(&self) -> Result<Vec<Supervisor>>;

    fn supervisor_exists(&self, id: &SupervisorId) -> Result<bool> {
        Ok(self.supervisor(id)?.is_some())
    }
}

pub trait LocationDirectory {
    fn building(&self, id: &BuildingId) -> Result<Option<Building>>;
    fn floor(&self, id: &FloorId) -> Result<Option<Floor>>;
    /// Tous les bâtiments, dans l'ordre d'enregistrement.
    fn buildings(&self) -> Result<Vec<Building>>;

    /// Étages d'un bâtiment dans l'ordre du bâtiment ; les références orphelines sont ignorées.
    fn floors_of(&self, building: &Building) -> Result<Vec<Floor>> {
        let mut out = Vec::with_capacity(building.floors.len());
        for id in &building.floors {
            if let Some(f) = self.floor(id)? {
                out.push(f);
            }
        }
        Ok(out)
    }
}

/// Critères de sélection des gardes (bornes de dates incluses).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftFilter {
    pub supervisor: Option<SupervisorId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ShiftFilter {
    pub fn all() -> Self {
        Self::default()
    }
    pub fn for_supervisor(id: &SupervisorId) -> Self {
        Self {
            supervisor: Some(id.clone()),
            ..Self::default()
        }
    }
    pub fn on(mut self, day: NaiveDate) -> Self {
        self.from = Some(day);
        self.to = Some(day);
        self
    }
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn matches(&self, shift: &Shift) -> bool {
        self.supervisor.as_ref().map_or(true, |s| &shift.supervisor == s)
            && self.from.map_or(true, |d| shift.date >= d)
            && self.to.map_or(true, |d| shift.date <= d)
    }
}

pub trait ShiftRepository {
    fn shift(&self, id: &ShiftId) -> Result<Option<Shift>>;
    fn shifts_matching(&self, filter: &ShiftFilter) -> Result<Vec<Shift>>;
    fn insert_shift(&self, shift: Shift) -> Result<()>;
    /// Remplace la garde de même id ; erreur si elle n'existe plus.
    fn replace_shift(&self, shift: Shift) -> Result<()>;
    fn remove_shift(&self, id: &ShiftId) -> Result<bool>;
}

pub trait VacationRepository {
    fn vacations_of(&self, supervisor: &SupervisorId) -> Result<Vec<Vacation>>;
    fn insert_vacation(&self, vacation: Vacation) -> Result<()>;
    fn remove_vacation(&self, id: &VacationId) -> Result<bool>;
}

/// Tout ce dont le scheduler a besoin.
pub trait Repository:
    SupervisorDirectory + LocationDirectory + ShiftRepository + VacationRepository
{
}

impl<T> Repository for T where
    T: SupervisorDirectory + LocationDirectory + ShiftRepository + VacationRepository
{
}

/// Modification partielle d'une surveillante.
#[derive(Debug, Clone, Default)]
pub struct SupervisorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

type Backend = Box<dyn Storage + Send + Sync>;

/// Repository basé sur un `Roster` protégé par un `RwLock`.
///
/// Chaque écriture est appliquée sur une copie, sauvegardée par le backend
/// (s'il y en a un), puis publiée.
pub struct RosterRepository {
    roster: RwLock<Roster>,
    backend: Option<Backend>,
}

impl RosterRepository {
    pub fn in_memory(roster: Roster) -> Self {
        Self {
            roster: RwLock::new(roster),
            backend: None,
        }
    }

    pub fn with_storage<S>(storage: S, roster: Roster) -> Self
    where
        S: Storage + Send + Sync + 'static,
    {
        Self {
            roster: RwLock::new(roster),
            backend: Some(Box::new(storage)),
        }
    }

    /// Ouvre un roster JSON (vide si le fichier est absent).
    pub fn open_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = JsonStorage::open(path)?;
        let roster = storage.load_or_default()?;
        Ok(Self::with_storage(storage, roster))
    }

    pub fn snapshot(&self) -> Result<Roster> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Roster>> {
        self.roster
            .read()
            .map_err(|_| anyhow!("roster lock poisoned"))
    }

    /// Applique `f` sur une copie, la persiste puis la publie.
    ///
    /// Si le backend a avancé entre-temps, la copie en mémoire est remplacée par
    /// son contenu et l'appel échoue avec `StaleRoster`.
    fn write<T>(&self, f: impl FnOnce(&mut Roster) -> Result<T>) -> Result<T> {
        let mut guard = self
            .roster
            .write()
            .map_err(|_| anyhow!("roster lock poisoned"))?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        next.revision = guard.revision.wrapping_add(1);
        if let Some(backend) = &self.backend {
            if let Commit::Stale(current) = backend.commit(guard.revision, &next)? {
                let revision = current.revision;
                *guard = *current;
                return Err(StaleRoster { revision }.into());
            }
        }
        *guard = next;
        Ok(out)
    }

    /// `write` rejoué sur la copie rafraîchie tant que le roster est périmé.
    fn write_fresh<T>(&self, f: impl Fn(&mut Roster) -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match self.write(&f) {
                Err(err) if err.is::<StaleRoster>() && attempt < REGISTRY_ATTEMPTS => attempt += 1,
                other => return other,
            }
        }
    }

    pub fn add_supervisor(&self, supervisor: Supervisor) -> Result<SupervisorId> {
        let id = supervisor.id.clone();
        self.write_fresh(|r| {
            if r.find_supervisor(&supervisor.id).is_some() {
                bail!("duplicate supervisor id: {}", supervisor.id);
            }
            r.supervisors.push(supervisor.clone());
            Ok(())
        })?;
        Ok(id)
    }

    pub fn update_supervisor(
        &self,
        id: &SupervisorId,
        patch: SupervisorPatch,
    ) -> Result<Option<Supervisor>> {
        self.write_fresh(|r| {
            let Some(sup) = r.supervisors.iter_mut().find(|s| &s.id == id) else {
                return Ok(None);
            };
            if let Some(name) = &patch.name {
                sup.name.clone_from(name);
            }
            if let Some(email) = &patch.email {
                sup.email.clone_from(email);
            }
            if let Some(phone) = &patch.phone {
                sup.phone.clone_from(phone);
            }
            if patch.notes.is_some() {
                sup.notes.clone_from(&patch.notes);
            }
            Ok(Some(sup.clone()))
        })
    }

    /// Supprime la fiche uniquement ; gardes et congés restent (références pendantes).
    pub fn remove_supervisor(&self, id: &SupervisorId) -> Result<bool> {
        self.write_fresh(|r| {
            let before = r.supervisors.len();
            r.supervisors.retain(|s| &s.id != id);
            Ok(r.supervisors.len() != before)
        })
    }

    pub fn add_building(&self, number: u32) -> Result<BuildingId> {
        self.write_fresh(|r| {
            if r.find_building_by_number(number).is_some() {
                bail!("building {number} already exists");
            }
            let id = BuildingId::random();
            r.buildings.push(Building {
                id: id.clone(),
                number,
                floors: Vec::new(),
            });
            Ok(id)
        })
    }

    /// Ajoute un étage à la fin de la liste du bâtiment.
    pub fn add_floor(&self, building: &BuildingId, number: i32) -> Result<FloorId> {
        self.write_fresh(|r| {
            let id = FloorId::random();
            let b = r
                .buildings
                .iter_mut()
                .find(|b| &b.id == building)
                .ok_or_else(|| anyhow!("unknown building: {building}"))?;
            b.floors.push(id.clone());
            r.floors.push(Floor {
                id: id.clone(),
                number,
                building: Some(building.clone()),
            });
            Ok(id)
        })
    }
}

impl SupervisorDirectory for RosterRepository {
    fn supervisor(&self, id: &SupervisorId) -> Result<Option<Supervisor>> {
        Ok(self.read()?.find_supervisor(id).cloned())
    }

    fn supervisors(&self) -> Result<Vec<Supervisor>> {
        let mut out = self.read()?.supervisors.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

impl LocationDirectory for RosterRepository {
    fn building(&self, id: &BuildingId) -> Result<Option<Building>> {
        Ok(self.read()?.find_building(id).cloned())
    }

    fn floor(&self, id: &FloorId) -> Result<Option<Floor>> {
        Ok(self.read()?.find_floor(id).cloned())
    }

    fn buildings(&self) -> Result<Vec<Building>> {
        Ok(self.read()?.buildings.clone())
    }
}

impl ShiftRepository for RosterRepository {
    fn shift(&self, id: &ShiftId) -> Result<Option<Shift>> {
        Ok(self.read()?.find_shift(id).cloned())
    }

    fn shifts_matching(&self, filter: &ShiftFilter) -> Result<Vec<Shift>> {
        Ok(self
            .read()?
            .shifts
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    fn insert_shift(&self, shift: Shift) -> Result<()> {
        self.write(|r| {
            r.shifts.push(shift);
            Ok(())
        })
    }

    fn replace_shift(&self, shift: Shift) -> Result<()> {
        self.write(|r| {
            let slot = r
                .find_shift_mut(&shift.id)
                .ok_or_else(|| anyhow!("shift vanished: {}", shift.id))?;
            *slot = shift;
            Ok(())
        })
    }

    fn remove_shift(&self, id: &ShiftId) -> Result<bool> {
        self.write(|r| {
            let before = r.shifts.len();
            r.shifts.retain(|s| &s.id != id);
            Ok(r.shifts.len() != before)
        })
    }
}

impl VacationRepository for RosterRepository {
    fn vacations_of(&self, supervisor: &SupervisorId) -> Result<Vec<Vacation>> {
        Ok(self
            .read()?
            .vacations
            .iter()
            .filter(|v| &v.supervisor == supervisor)
            .cloned()
            .collect())
    }

    fn insert_vacation(&self, vacation: Vacation) -> Result<()> {
        self.write(|r| {
            r.vacations.push(vacation);
            Ok(())
        })
    }

    fn remove_vacation(&self, id: &VacationId) -> Result<bool> {
        self.write(|r| {
            let before = r.vacations.len();
            r.vacations.retain(|v| &v.id != id);
            Ok(r.vacations.len() != before)
        })
    }
}
