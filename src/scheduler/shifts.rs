use super::{util, NewShift, SchedError, Scheduler, ShiftDetails, ShiftDraft, ShiftPatch};
use crate::model::{Building, EntityKind, Floor, Shift, ShiftId, Supervisor};
use crate::repository::Repository;
use crate::timecalc;
use chrono::Utc;
use tracing::debug;

/// Garde validée : références chargées, heures canoniques.
struct Checked {
    building: Building,
    floor: Floor,
    supervisor: Supervisor,
    start_time: String,
    end_time: String,
}

impl<R: Repository> Scheduler<R> {
    /// Crée une garde après validation complète, puis notifie la surveillante.
    pub fn create_shift(&self, input: NewShift) -> Result<ShiftDetails, SchedError> {
        let draft = input.into_draft()?;

        let (shift, checked) = util::retry_stale(|| {
            self.locks.with(&[&draft.supervisor], || -> Result<_, SchedError> {
                let checked = self.validate(&draft, None)?;
                let shift = Shift {
                    id: ShiftId::random(),
                    date: draft.date,
                    start_time: checked.start_time.clone(),
                    end_time: checked.end_time.clone(),
                    building: draft.building.clone(),
                    floor: draft.floor.clone(),
                    supervisor: draft.supervisor.clone(),
                    note: draft.note.clone(),
                    created_by: draft.created_by.clone(),
                    created_at: Utc::now(),
                };
                self.repo.insert_shift(shift.clone())?;
                Ok((shift, checked))
            })
        })?;
        debug!(shift = %shift.id, supervisor = %shift.supervisor, date = %shift.date, "shift created");

        // best-effort : un échec d'envoi n'annule pas la garde
        self.dispatcher.dispatch(
            checked.supervisor.clone(),
            shift.clone(),
            checked.building.clone(),
            checked.floor.clone(),
        );

        Ok(ShiftDetails {
            shift,
            supervisor: Some(checked.supervisor),
            building: Some(checked.building),
            floor: Some(checked.floor),
        })
    }

    /// Modifie une garde : même validation que la création, sans se comparer à
    /// elle-même et sans nouvelle notification.
    pub fn edit_shift(&self, id: &ShiftId, patch: ShiftPatch) -> Result<ShiftDetails, SchedError> {
        util::retry_stale(|| loop {
            if let Some(details) = self.edit_once(id, &patch)? {
                return Ok(details);
            }
        })
    }

    /// `None` si la garde a changé de surveillante avant la prise des verrous.
    fn edit_once(&self, id: &ShiftId, patch: &ShiftPatch) -> Result<Option<ShiftDetails>, SchedError> {
        let existing = self
            .repo
            .shift(id)?
            .ok_or(SchedError::NotFound(EntityKind::Shift))?;
        let target = patch.merge_onto(&existing).supervisor;

        self.locks.with(&[&existing.supervisor, &target], || -> Result<_, SchedError> {
            let current = self
                .repo
                .shift(id)?
                .ok_or(SchedError::NotFound(EntityKind::Shift))?;
            if current.supervisor != existing.supervisor {
                return Ok(None);
            }
            self.apply_edit(current, patch).map(Some)
        })
    }

    fn apply_edit(&self, current: Shift, patch: &ShiftPatch) -> Result<ShiftDetails, SchedError> {
        let draft = patch.merge_onto(&current);
        let checked = self.validate(&draft, Some(&current.id))?;
        let updated = Shift {
            id: current.id,
            date: draft.date,
            start_time: checked.start_time,
            end_time: checked.end_time,
            building: draft.building,
            floor: draft.floor,
            supervisor: draft.supervisor,
            note: draft.note,
            created_by: draft.created_by,
            created_at: current.created_at,
        };
        self.repo.replace_shift(updated.clone())?;
        debug!(shift = %updated.id, "shift updated");

        Ok(ShiftDetails {
            shift: updated,
            supervisor: Some(checked.supervisor),
            building: Some(checked.building),
            floor: Some(checked.floor),
        })
    }

    /// Suppression sans condition ; `false` si la garde n'existait pas.
    pub fn delete_shift(&self, id: &ShiftId) -> Result<bool, SchedError> {
        let removed = util::retry_stale(|| Ok(self.repo.remove_shift(id)?))?;
        debug!(shift = %id, removed, "shift delete");
        Ok(removed)
    }

    fn validate(&self, draft: &ShiftDraft, exclude: Option<&ShiftId>) -> Result<Checked, SchedError> {
        let building = self
            .repo
            .building(&draft.building)?
            .ok_or(SchedError::NotFound(EntityKind::Building))?;
        let floor = self
            .repo
            .floor(&draft.floor)?
            .ok_or(SchedError::NotFound(EntityKind::Floor))?;
        let supervisor = self
            .repo
            .supervisor(&draft.supervisor)?
            .ok_or(SchedError::NotFound(EntityKind::Supervisor))?;

        if self.is_supervisor_on_vacation(&draft.supervisor, draft.date)? {
            return Err(SchedError::SupervisorOnVacation {
                supervisor: draft.supervisor.clone(),
                date: draft.date,
            });
        }

        let start = timecalc::to_instant(draft.date, &draft.start_time)?;
        let end = timecalc::to_instant(draft.date, &draft.end_time)?;
        if end <= start {
            return Err(SchedError::InvalidInterval);
        }

        let hours = timecalc::duration_hours(start, end);
        let max_hours = self.opts.max_shift_hours();
        if hours > max_hours {
            return Err(SchedError::DurationExceeded { hours, max_hours });
        }

        if let Some(conflict) =
            self.find_overlapping_shift(&draft.supervisor, draft.date, start, end, exclude)?
        {
            return Err(SchedError::OverlappingShift(Box::new(conflict)));
        }

        Ok(Checked {
            building,
            floor,
            supervisor,
            start_time: timecalc::canonical_time(&draft.start_time)?,
            end_time: timecalc::canonical_time(&draft.end_time)?,
        })
    }
}
