use super::{util, NewVacation, SchedError, Scheduler};
use crate::model::{SupervisorId, Vacation, VacationId};
use crate::repository::{Repository, ShiftFilter};
use chrono::Utc;
use tracing::debug;

impl<R: Repository> Scheduler<R> {
    /// Enregistre un congé si aucune garde ni aucun autre congé ne tombe dans la période.
    pub fn create_vacation(&self, input: NewVacation) -> Result<Vacation, SchedError> {
        let (supervisor, start_date, end_date, reason) = input.required()?;
        if end_date < start_date {
            return Err(SchedError::InvalidInterval);
        }

        let vacation = util::retry_stale(|| {
            self.locks.with(&[&supervisor], || -> Result<Vacation, SchedError> {
                let filter = ShiftFilter::for_supervisor(&supervisor).between(start_date, end_date);
                let mut shifts = self.repo.shifts_matching(&filter)?;
                if !shifts.is_empty() {
                    util::sort_chronologically(&mut shifts);
                    return Err(SchedError::ShiftsExistInPeriod(shifts));
                }

                let mut overlaps: Vec<Vacation> = self
                    .repo
                    .vacations_of(&supervisor)?
                    .into_iter()
                    .filter(|v| v.intersects(start_date, end_date))
                    .collect();
                if !overlaps.is_empty() {
                    overlaps.sort_by_key(|v| v.start_date);
                    return Err(SchedError::OverlappingVacation(overlaps));
                }

                let vacation = Vacation {
                    id: VacationId::random(),
                    supervisor: supervisor.clone(),
                    start_date,
                    end_date,
                    reason: reason.clone(),
                    note: input.note(),
                    created_by: input.created_by(),
                    created_at: Utc::now(),
                };
                self.repo.insert_vacation(vacation.clone())?;
                Ok(vacation)
            })
        })?;
        debug!(vacation = %vacation.id, supervisor = %vacation.supervisor, "vacation created");
        Ok(vacation)
    }

    /// Suppression sans revalidation des gardes de la période.
    pub fn delete_vacation(&self, id: &VacationId) -> Result<bool, SchedError> {
        let removed = util::retry_stale(|| Ok(self.repo.remove_vacation(id)?))?;
        debug!(vacation = %id, removed, "vacation delete");
        Ok(removed)
    }

    /// Congés d'une surveillante, du plus récent au plus ancien.
    pub fn vacations_by_supervisor(
        &self,
        supervisor: &SupervisorId,
    ) -> Result<Vec<Vacation>, SchedError> {
        let mut out = self.repo.vacations_of(supervisor)?;
        out.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(out)
    }
}
