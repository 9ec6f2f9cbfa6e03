use crate::model::{
    Building, BuildingId, EntityKind, Floor, FloorId, Shift, Supervisor, SupervisorId, Vacation,
};
use crate::timecalc::TimeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options de planification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Durée maximale d'une garde, borne incluse.
    pub max_shift_minutes: u32,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            max_shift_minutes: 6 * 60,
        }
    }
}

impl ScheduleOptions {
    pub fn with_max_hours(hours: u32) -> Self {
        Self {
            max_shift_minutes: hours.saturating_mul(60),
        }
    }

    pub fn max_shift_hours(&self) -> f64 {
        f64::from(self.max_shift_minutes) / 60.0
    }
}

/// Demande de création de garde. Les champs obligatoires sont optionnels ici :
/// leur absence est une erreur de validation, pas une erreur de désérialisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewShift {
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub building: Option<BuildingId>,
    pub floor: Option<FloorId>,
    pub supervisor: Option<SupervisorId>,
    pub note: Option<String>,
    pub created_by: Option<String>,
}

/// Modification partielle d'une garde ; `None` (ou vide) garde la valeur existante.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftPatch {
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub building: Option<BuildingId>,
    pub floor: Option<FloorId>,
    pub supervisor: Option<SupervisorId>,
    pub note: Option<String>,
    pub created_by: Option<String>,
}

/// Garde complète, pas encore validée.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftDraft {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub building: BuildingId,
    pub floor: FloorId,
    pub supervisor: SupervisorId,
    pub note: Option<String>,
    pub created_by: Option<String>,
}

fn text(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn id<T: Clone>(v: &Option<T>, as_str: impl Fn(&T) -> &str) -> Option<T> {
    v.as_ref().filter(|x| !as_str(x).trim().is_empty()).cloned()
}

impl NewShift {
    pub fn into_draft(self) -> Result<ShiftDraft, SchedError> {
        Ok(ShiftDraft {
            date: self.date.ok_or(SchedError::MissingField("date"))?,
            start_time: text(&self.start_time).ok_or(SchedError::MissingField("start_time"))?,
            end_time: text(&self.end_time).ok_or(SchedError::MissingField("end_time"))?,
            building: id(&self.building, BuildingId::as_str)
                .ok_or(SchedError::MissingField("building"))?,
            floor: id(&self.floor, FloorId::as_str).ok_or(SchedError::MissingField("floor"))?,
            supervisor: id(&self.supervisor, SupervisorId::as_str)
                .ok_or(SchedError::MissingField("supervisor"))?,
            note: text(&self.note),
            created_by: text(&self.created_by),
        })
    }
}

impl ShiftPatch {
    /// Applique le patch sur une garde existante, champ par champ.
    pub fn merge_onto(&self, existing: &Shift) -> ShiftDraft {
        ShiftDraft {
            date: self.date.unwrap_or(existing.date),
            start_time: text(&self.start_time).unwrap_or_else(|| existing.start_time.clone()),
            end_time: text(&self.end_time).unwrap_or_else(|| existing.end_time.clone()),
            building: id(&self.building, BuildingId::as_str)
                .unwrap_or_else(|| existing.building.clone()),
            floor: id(&self.floor, FloorId::as_str).unwrap_or_else(|| existing.floor.clone()),
            supervisor: id(&self.supervisor, SupervisorId::as_str)
                .unwrap_or_else(|| existing.supervisor.clone()),
            note: text(&self.note).or_else(|| existing.note.clone()),
            created_by: text(&self.created_by).or_else(|| existing.created_by.clone()),
        }
    }
}

/// Demande de création de congé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVacation {
    pub supervisor: Option<SupervisorId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<String>,
}

impl NewVacation {
    pub(super) fn required(
        &self,
    ) -> Result<(SupervisorId, NaiveDate, NaiveDate, String), SchedError> {
        Ok((
            id(&self.supervisor, SupervisorId::as_str)
                .ok_or(SchedError::MissingField("supervisor"))?,
            self.start_date.ok_or(SchedError::MissingField("start_date"))?,
            self.end_date.ok_or(SchedError::MissingField("end_date"))?,
            text(&self.reason).ok_or(SchedError::MissingField("reason"))?,
        ))
    }

    pub(super) fn note(&self) -> Option<String> {
        text(&self.note)
    }

    pub(super) fn created_by(&self) -> Option<String> {
        text(&self.created_by)
    }
}

/// Garde avec ses références développées (absentes si la cible a été supprimée).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDetails {
    pub shift: Shift,
    pub supervisor: Option<Supervisor>,
    pub building: Option<Building>,
    pub floor: Option<Floor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub shifts: Vec<ShiftDetails>,
}

/// Étage sans aucune garde sur une journée donnée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncoveredFloor {
    pub building_id: BuildingId,
    pub building_number: u32,
    pub floor_id: FloorId,
    pub floor_number: i32,
}

/// Résultat de la recherche d'une surveillante par nom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorAgenda {
    pub supervisor: Supervisor,
    pub shifts: Vec<ShiftDetails>,
    pub vacations: Vec<Vacation>,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} not found")]
    NotFound(EntityKind),
    #[error("invalid time format: {0:?} (expected HH:MM)")]
    InvalidTimeFormat(String),
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid interval: end must be after start")]
    InvalidInterval,
    #[error("shift duration {hours:.2}h exceeds the {max_hours}h limit")]
    DurationExceeded { hours: f64, max_hours: f64 },
    #[error("supervisor {supervisor} is on vacation on {date}")]
    SupervisorOnVacation {
        supervisor: SupervisorId,
        date: NaiveDate,
    },
    #[error(
        "supervisor already has an overlapping shift on {} ({}-{})",
        .0.date, .0.start_time, .0.end_time
    )]
    OverlappingShift(Box<Shift>),
    #[error("supervisor has {} assigned shift(s) inside this period", .0.len())]
    ShiftsExistInPeriod(Vec<Shift>),
    #[error("supervisor already has {} vacation(s) overlapping this period", .0.len())]
    OverlappingVacation(Vec<Vacation>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<TimeError> for SchedError {
    fn from(err: TimeError) -> Self {
        match err {
            TimeError::InvalidTime(raw) => SchedError::InvalidTimeFormat(raw),
            TimeError::InvalidDate(raw) => SchedError::InvalidDate(raw),
        }
    }
}

impl SchedError {
    /// Vrai pour les refus de validation, faux pour les pannes internes.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SchedError::Internal(_))
    }

    /// Enregistrements en conflit, pour expliquer le refus à l'utilisateur.
    pub fn conflicts_json(&self) -> Option<serde_json::Value> {
        match self {
            SchedError::OverlappingShift(s) => serde_json::to_value(s).ok(),
            SchedError::ShiftsExistInPeriod(v) => serde_json::to_value(v).ok(),
            SchedError::OverlappingVacation(v) => serde_json::to_value(v).ok(),
            _ => None,
        }
    }
}
