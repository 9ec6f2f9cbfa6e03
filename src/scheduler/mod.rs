mod conflicts;
mod queries;
mod shifts;
mod types;
mod util;
mod vacations;

pub use types::{
    NewShift, NewVacation, SchedError, ScheduleOptions, ShiftDetails, ShiftDraft, ShiftPatch,
    SupervisorAgenda, UncoveredFloor, WeekSchedule,
};

use crate::notification::{Dispatcher, LogNotifier, SharedNotifier};
use crate::repository::Repository;
use std::sync::Arc;
use util::SupervisorLocks;

/// Scheduler : valide et enregistre gardes et congés au-dessus d'un repository.
///
/// Sans état propre hors repository : les vérifications de conflit et les écritures
/// d'une même surveillante sont sérialisées par un verrou dédié.
pub struct Scheduler<R> {
    repo: R,
    opts: ScheduleOptions,
    dispatcher: Dispatcher,
    locks: SupervisorLocks,
}

impl<R: Repository> Scheduler<R> {
    /// Scheduler qui journalise les notifications d'affectation.
    pub fn new(repo: R) -> Self {
        Self::with_notifier(repo, Arc::new(LogNotifier::new()))
    }

    pub fn with_notifier(repo: R, notifier: SharedNotifier) -> Self {
        Self {
            repo,
            opts: ScheduleOptions::default(),
            dispatcher: Dispatcher::new(notifier),
            locks: SupervisorLocks::default(),
        }
    }

    pub fn with_options(mut self, opts: ScheduleOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn options(&self) -> ScheduleOptions {
        self.opts
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Attend les notifications encore en vol.
    pub fn wait_notifications(&self) {
        self.dispatcher.wait_idle();
    }
}
