use super::{util, SchedError, Scheduler};
use crate::model::{Shift, ShiftId, SupervisorId};
use crate::repository::{Repository, ShiftFilter};
use crate::timecalc;
use chrono::{NaiveDate, NaiveDateTime};

impl<R: Repository> Scheduler<R> {
    /// Première garde de la surveillante, ce jour-là, qui chevauche `[start, end)`.
    ///
    /// Les candidates sont examinées par heure de début croissante : en cas de
    /// conflits multiples, la plus tôt est rapportée.
    pub fn find_overlapping_shift(
        &self,
        supervisor: &SupervisorId,
        day: NaiveDate,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<&ShiftId>,
    ) -> Result<Option<Shift>, SchedError> {
        let filter = ShiftFilter::for_supervisor(supervisor).on(day);
        let mut candidates = Vec::new();
        for shift in self.repo.shifts_matching(&filter)? {
            if exclude == Some(&shift.id) {
                continue;
            }
            let (s_start, s_end) = util::stored_interval(&shift)?;
            candidates.push((s_start, s_end, shift));
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(candidates
            .into_iter()
            .find(|(s_start, s_end, _)| timecalc::intervals_overlap(*s_start, *s_end, start, end))
            .map(|(_, _, shift)| shift))
    }

    /// Vrai si un congé de la surveillante contient `day` (bornes incluses).
    pub fn is_supervisor_on_vacation(
        &self,
        supervisor: &SupervisorId,
        day: NaiveDate,
    ) -> Result<bool, SchedError> {
        Ok(self
            .repo
            .vacations_of(supervisor)?
            .iter()
            .any(|v| v.contains(day)))
    }
}
