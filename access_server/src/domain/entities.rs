use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::calendar::LabStamp;

// Role of a person in the lab. Serialized with the codes stored in the allow-lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "AYUDANTE")]
    Assistant,
    #[serde(rename = "ESTUDIANTE")]
    Student,
}

impl Role {
    pub fn code(self) -> &'static str {
        match self {
            Role::Assistant => "AYUDANTE",
            Role::Student => "ESTUDIANTE",
        }
    }

    // Accepts the stored codes and the English names, ignoring case.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AYUDANTE" | "ASSISTANT" => Some(Role::Assistant),
            "ESTUDIANTE" | "STUDENT" => Some(Role::Student),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "Entrada")]
    Entrance,
    #[serde(rename = "Salida")]
    Exit,
}

impl EventType {
    // The n-th event of a person on a given day (0-indexed) is an entrance iff n is even.
    pub fn from_prior_count(prior_events: i64) -> EventType {
        if prior_events % 2 == 0 {
            EventType::Entrance
        } else {
            EventType::Exit
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::Entrance => "Entrada",
            EventType::Exit => "Salida",
        }
    }

    pub fn parse(value: &str) -> Option<EventType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "entrada" | "entrance" => Some(EventType::Entrance),
            "salida" | "exit" => Some(EventType::Exit),
            _ => None,
        }
    }
}

// Canonical scan payload after alias normalization and freshness checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanPayload {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: Role,
    pub issued_at_ms: i64,
}

// Allow-list entry. Read-only from the perspective of this service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl Person {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

// Who is scanning and how. The ledger stamps date and time while it holds the
// person's lock, then assigns the id and event type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendanceDraft {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub method: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttendanceEvent {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub weekday_label: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub method: String,
    pub event_type: EventType,
}

impl AttendanceEvent {
    pub fn from_draft(
        id: i64,
        draft: AttendanceDraft,
        stamp: LabStamp,
        event_type: EventType,
    ) -> Self {
        Self {
            id,
            date: stamp.date,
            time: stamp.time,
            weekday_label: stamp.weekday_label,
            name: draft.name,
            surname: draft.surname,
            email: draft.email,
            method: draft.method,
            event_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentPerson {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub since: NaiveTime,
}

// Assistants inside the lab as of the moment the snapshot was taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancySnapshot {
    pub people: Vec<PresentPerson>,
}

impl OccupancySnapshot {
    pub fn count(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
