#![forbid(unsafe_code)]
//! Garde : planification des gardes des surveillantes d'internat (sans BD).
//!
//! - Gardes par bâtiment/étage, 6 h maximum, sans chevauchement pour une même personne.
//! - Congés incompatibles avec les gardes (dans les deux sens).
//! - Vues : par jour, par surveillante, par semaine, étages non couverts.
//! - Stockage fichier JSON atomique ; dates locales naïves, sans fuseau.

pub mod io;
pub mod model;
pub mod notification;
pub mod repository;
pub mod scheduler;
pub mod storage;
pub mod timecalc;

pub use model::{
    Building, BuildingId, EntityKind, Floor, FloorId, Roster, Shift, ShiftId, Supervisor,
    SupervisorId, Vacation, VacationId,
};
pub use notification::{
    AssignmentMessage, AssignmentRenderer, Dispatcher, LogNotifier, NoopNotifier, Notifier,
    OutboxNotifier, TextAssignment,
};
pub use repository::{
    LocationDirectory, Repository, RosterRepository, ShiftFilter, ShiftRepository, StaleRoster,
    SupervisorDirectory, SupervisorPatch, VacationRepository,
};
pub use scheduler::{
    NewShift, NewVacation, SchedError, ScheduleOptions, Scheduler, ShiftDetails, ShiftPatch,
    SupervisorAgenda, UncoveredFloor, WeekSchedule,
};
pub use storage::{Commit, JsonStorage, Storage};
