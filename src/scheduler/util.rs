use super::SchedError;
use crate::model::{Shift, SupervisorId};
use crate::repository::StaleRoster;
use crate::timecalc;
use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Intervalle d'une garde déjà enregistrée.
pub(super) fn stored_interval(shift: &Shift) -> Result<(NaiveDateTime, NaiveDateTime), SchedError> {
    let start = timecalc::to_instant(shift.date, &shift.start_time);
    let end = timecalc::to_instant(shift.date, &shift.end_time);
    match (start, end) {
        (Ok(s), Ok(e)) => Ok((s, e)),
        (Err(err), _) | (_, Err(err)) => Err(SchedError::Internal(
            anyhow!(err).context(format!("stored shift {} has unreadable times", shift.id)),
        )),
    }
}

fn sort_key(shift: &Shift) -> (NaiveDate, Option<NaiveTime>, &str) {
    (
        shift.date,
        timecalc::parse_time(&shift.start_time).ok(),
        shift.start_time.as_str(),
    )
}

/// Tri par (date, heure de début).
pub(super) fn sort_chronologically(shifts: &mut [Shift]) {
    shifts.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

/// Nombre de tentatives quand le roster persistant a avancé sous nos pieds.
const STALE_ATTEMPTS: usize = 5;

/// Rejoue `op` (validation comprise) tant que l'écriture échoue sur un roster périmé.
pub(super) fn retry_stale<T>(mut op: impl FnMut() -> Result<T, SchedError>) -> Result<T, SchedError> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(SchedError::Internal(err))
                if err.is::<StaleRoster>() && attempt < STALE_ATTEMPTS =>
            {
                debug!(attempt, "roster changed on disk, retrying");
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Verrous par surveillante : sérialise vérification + écriture pour une même personne.
///
/// Une entrée n'existe que tant qu'un appel la détient ou l'attend.
#[derive(Debug, Default)]
pub(super) struct SupervisorLocks {
    slots: Mutex<HashMap<SupervisorId, Arc<Mutex<()>>>>,
}

impl SupervisorLocks {
    /// Exécute `body` en détenant les verrous des surveillantes données
    /// (dédoublonnées, prises par id croissant).
    pub(super) fn with<T>(&self, ids: &[&SupervisorId], body: impl FnOnce() -> T) -> T {
        let slots = self.slots(ids);
        let out = {
            let _held: Vec<MutexGuard<'_, ()>> = slots
                .iter()
                .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
                .collect();
            body()
        };
        drop(slots);
        self.prune(ids);
        out
    }

    fn slots(&self, ids: &[&SupervisorId]) -> Vec<Arc<Mutex<()>>> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        ids.into_iter()
            .map(|id| Arc::clone(slots.entry(id.clone()).or_default()))
            .collect()
    }

    /// Retire les entrées que plus personne ne détient.
    fn prune(&self, ids: &[&SupervisorId]) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        for id in ids {
            if slots.get(*id).is_some_and(|m| Arc::strong_count(m) == 1) {
                slots.remove(*id);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
