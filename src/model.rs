use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! strong_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

strong_id!(
    /// Identifiant fort pour Supervisor
    SupervisorId
);
strong_id!(
    /// Identifiant fort pour Building
    BuildingId
);
strong_id!(
    /// Identifiant fort pour Floor
    FloorId
);
strong_id!(
    /// Identifiant fort pour Shift
    ShiftId
);
strong_id!(
    /// Identifiant fort pour Vacation
    VacationId
);

/// Type d'entité référencée (utilisé par les erreurs `NotFound`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Building,
    Floor,
    Supervisor,
    Shift,
    Vacation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Building => "building",
            EntityKind::Floor => "floor",
            EntityKind::Supervisor => "supervisor",
            EntityKind::Shift => "shift",
            EntityKind::Vacation => "vacation",
        };
        f.write_str(s)
    }
}

/// Surveillante (identité + contact)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supervisor {
    pub id: SupervisorId,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Supervisor {
    pub fn new<N: Into<String>, E: Into<String>, P: Into<String>>(
        name: N,
        email: E,
        phone: P,
    ) -> Self {
        Self {
            id: SupervisorId::random(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            notes: None,
            created_at: Utc::now(),
        }
    }
}

/// Bâtiment : possède une liste ordonnée d'étages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub number: u32,
    #[serde(default)]
    pub floors: Vec<FloorId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub number: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<BuildingId>,
}

/// Garde : une surveillante couvre un étage d'un bâtiment sur un créneau d'une journée.
///
/// `date` est le marqueur de jour ; `start_time`/`end_time` sont des heures murales
/// "HH:MM" combinées avec `date` pour obtenir des instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub building: BuildingId,
    pub floor: FloorId,
    pub supervisor: SupervisorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Congé d'une surveillante, bornes incluses (jours calendaires).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    pub id: VacationId,
    pub supervisor: SupervisorId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vacation {
    /// Vrai si `day` est dans `[start_date, end_date]`.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Intersection inclusive avec une autre plage de jours.
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// Instantané complet des données de planification
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    /// Incrémentée à chaque écriture ; sert à détecter une copie périmée.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub supervisors: Vec<Supervisor>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub vacations: Vec<Vacation>,
}

impl Roster {
    pub fn find_supervisor(&self, id: &SupervisorId) -> Option<&Supervisor> {
        self.supervisors.iter().find(|s| &s.id == id)
    }
    pub fn find_building(&self, id: &BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| &b.id == id)
    }
    pub fn find_building_by_number(&self, number: u32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.number == number)
    }
    pub fn find_floor(&self, id: &FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| &f.id == id)
    }
    pub fn find_shift(&self, id: &ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }
    pub fn find_shift_mut(&mut self, id: &ShiftId) -> Option<&mut Shift> {
        self.shifts.iter_mut().find(|s| &s.id == id)
    }
}
