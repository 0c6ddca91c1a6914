use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::calendar::LabCalendar;
use crate::domain::entities::{AttendanceEvent, EventType, OccupancySnapshot, PresentPerson, Role};
use crate::domain::ports::AttendanceLedger;
use crate::use_cases::storage::with_timeout;

// Read-only view over the assistant ledger answering who is inside right now.
pub struct OccupancyUseCase<L> {
    pub ledger: L,
    pub calendar: LabCalendar,
    pub storage_timeout: Duration,
}

impl<L> OccupancyUseCase<L>
where
    L: AttendanceLedger,
{
    pub async fn currently_present(&self, now: DateTime<Utc>) -> Result<OccupancySnapshot, String> {
        let today = self.calendar.today(now);
        let events = with_timeout(
            self.storage_timeout,
            "occupancy read",
            self.ledger.events_on(Role::Assistant, today),
        )
        .await?;

        Ok(fold_present(events))
    }
}

// Keeps each email's latest event and returns those whose latest event is an entrance.
pub fn fold_present(mut events: Vec<AttendanceEvent>) -> OccupancySnapshot {
    events.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));

    let mut latest: HashMap<String, AttendanceEvent> = HashMap::new();
    for event in events {
        latest.insert(event.email.clone(), event);
    }

    let mut people: Vec<PresentPerson> = latest
        .into_values()
        .filter(|event| event.event_type == EventType::Entrance)
        .map(|event| PresentPerson {
            email: event.email,
            name: event.name,
            surname: event.surname,
            since: event.time,
        })
        .collect();
    people.sort_by(|a, b| a.since.cmp(&b.since).then_with(|| a.email.cmp(&b.email)));

    OccupancySnapshot { people }
}
