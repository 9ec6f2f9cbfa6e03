use super::{util, SchedError, Scheduler, ShiftDetails, SupervisorAgenda, UncoveredFloor, WeekSchedule};
use crate::model::{EntityKind, FloorId, Shift, SupervisorId};
use crate::repository::{Repository, ShiftFilter};
use chrono::{Days, NaiveDate};
use std::collections::HashSet;

impl<R: Repository> Scheduler<R> {
    /// Gardes d'une journée, par heure de début.
    pub fn shifts_by_date(&self, day: NaiveDate) -> Result<Vec<ShiftDetails>, SchedError> {
        self.ordered(ShiftFilter::all().on(day))
    }

    /// Gardes d'une surveillante, par (date, heure de début).
    pub fn shifts_by_supervisor(
        &self,
        supervisor: &SupervisorId,
    ) -> Result<Vec<ShiftDetails>, SchedError> {
        self.ordered(ShiftFilter::for_supervisor(supervisor))
    }

    /// Toutes les gardes, par (date, heure de début).
    pub fn all_shifts(&self) -> Result<Vec<ShiftDetails>, SchedError> {
        self.ordered(ShiftFilter::all())
    }

    /// Semaine glissante `[start, start + 6]`.
    pub fn week_schedule(&self, start: Option<NaiveDate>) -> Result<WeekSchedule, SchedError> {
        let start = start.ok_or(SchedError::MissingField("start"))?;
        let end = start
            .checked_add_days(Days::new(6))
            .ok_or(SchedError::InvalidInterval)?;
        let shifts = self.ordered(ShiftFilter::all().between(start, end))?;
        Ok(WeekSchedule { start, end, shifts })
    }

    /// Étages (tous bâtiments confondus) qu'aucune garde ne référence ce jour-là.
    pub fn uncovered_floors(&self, day: Option<NaiveDate>) -> Result<Vec<UncoveredFloor>, SchedError> {
        let day = day.ok_or(SchedError::MissingField("date"))?;
        let covered: HashSet<FloorId> = self
            .repo
            .shifts_matching(&ShiftFilter::all().on(day))?
            .into_iter()
            .map(|s| s.floor)
            .collect();

        let mut out = Vec::new();
        for building in self.repo.buildings()? {
            for floor in self.repo.floors_of(&building)? {
                if covered.contains(&floor.id) {
                    continue;
                }
                out.push(UncoveredFloor {
                    building_id: building.id.clone(),
                    building_number: building.number,
                    floor_id: floor.id,
                    floor_number: floor.number,
                });
            }
        }
        Ok(out)
    }

    /// Recherche (insensible à la casse) d'une surveillante par nom, avec ses gardes et congés.
    pub fn supervisor_agenda(&self, name: &str) -> Result<SupervisorAgenda, SchedError> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SchedError::MissingField("name"));
        }
        let mut all = self.repo.supervisors()?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        let supervisor = all
            .into_iter()
            .find(|s| s.name.to_lowercase().contains(&needle))
            .ok_or(SchedError::NotFound(EntityKind::Supervisor))?;

        let shifts = self.shifts_by_supervisor(&supervisor.id)?;
        let mut vacations = self.repo.vacations_of(&supervisor.id)?;
        vacations.sort_by_key(|v| v.start_date);
        Ok(SupervisorAgenda {
            supervisor,
            shifts,
            vacations,
        })
    }

    fn ordered(&self, filter: ShiftFilter) -> Result<Vec<ShiftDetails>, SchedError> {
        let mut shifts = self.repo.shifts_matching(&filter)?;
        util::sort_chronologically(&mut shifts);
        shifts.into_iter().map(|s| self.expand(s)).collect()
    }

    fn expand(&self, shift: Shift) -> Result<ShiftDetails, SchedError> {
        Ok(ShiftDetails {
            supervisor: self.repo.supervisor(&shift.supervisor)?,
            building: self.repo.building(&shift.building)?,
            floor: self.repo.floor(&shift.floor)?,
            shift,
        })
    }
}
