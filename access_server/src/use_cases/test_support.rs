use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::domain::calendar::LabCalendar;
use crate::domain::entities::{AttendanceDraft, AttendanceEvent, EventType, Person, Role};
use crate::domain::ports::{AttendanceLedger, Clock, PersonDirectory};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn lab_calendar() -> LabCalendar {
    LabCalendar::new(chrono_tz::America::Santiago)
}

// 12:00 lab time on Tuesday 2025-03-04.
pub(crate) fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap()
}

pub(crate) fn person(id: i64, email: &str, role: Role, active: bool) -> Person {
    Person {
        id,
        name: format!("Name{id}"),
        surname: format!("Surname{id}"),
        email: email.to_string(),
        role,
        active,
    }
}

pub(crate) fn event_at(id: i64, email: &str, time: &str, event_type: EventType) -> AttendanceEvent {
    AttendanceEvent {
        id,
        date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
        time: NaiveTime::parse_from_str(time, "%H:%M:%S").expect("valid time"),
        weekday_label: "martes".to_string(),
        name: "Test".to_string(),
        surname: "Person".to_string(),
        email: email.to_string(),
        method: "QR".to_string(),
        event_type,
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryDirectory {
    people: Vec<Person>,
    fail: bool,
}

impl InMemoryDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_person(mut self, person: Person) -> Self {
        self.people.push(person);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl PersonDirectory for InMemoryDirectory {
    async fn find_active(&self, role: Role, email: &str) -> Result<Option<Person>, String> {
        if self.fail {
            return Err("directory unavailable".to_string());
        }

        Ok(self
            .people
            .iter()
            .find(|person| person.role == role && person.email == email && person.active)
            .cloned())
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct LedgerFailures {
    pub append: bool,
    pub events_on: bool,
}

// Instant the ledger stamps the next append with, advanced by `tick` after each one.
struct LedgerClock {
    now: DateTime<Utc>,
    tick: Duration,
}

// Ledger fake whose append is atomic under a single mutex, like the advisory lock.
// Rows are stamped from its own clock while the mutex is held.
#[derive(Clone)]
pub(crate) struct InMemoryLedger {
    rows: Arc<Mutex<Vec<(Role, AttendanceEvent)>>>,
    clock: Arc<Mutex<LedgerClock>>,
    calendar: LabCalendar,
    failures: LedgerFailures,
}

impl InMemoryLedger {
    pub(crate) fn new() -> Self {
        Self {
            rows: Arc::default(),
            clock: Arc::new(Mutex::new(LedgerClock {
                now: noon(),
                tick: Duration::zero(),
            })),
            calendar: lab_calendar(),
            failures: LedgerFailures::default(),
        }
    }

    pub(crate) fn at(self, now: DateTime<Utc>) -> Self {
        self.set_now(now);
        self
    }

    pub(crate) fn ticking(self, tick: Duration) -> Self {
        self.clock.lock().expect("clock mutex poisoned").tick = tick;
        self
    }

    pub(crate) fn set_now(&self, now: DateTime<Utc>) {
        self.clock.lock().expect("clock mutex poisoned").now = now;
    }

    pub(crate) fn with_failures(mut self, failures: LedgerFailures) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn seed(&self, role: Role, event: AttendanceEvent) {
        let mut guard = self.rows.lock().expect("ledger mutex poisoned");
        guard.push((role, event));
    }

    pub(crate) fn events(&self, role: Role) -> Vec<AttendanceEvent> {
        let guard = self.rows.lock().expect("ledger mutex poisoned");
        guard
            .iter()
            .filter(|(row_role, _)| *row_role == role)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub(crate) fn total_events(&self) -> usize {
        self.rows.lock().expect("ledger mutex poisoned").len()
    }
}

#[async_trait]
impl AttendanceLedger for InMemoryLedger {
    async fn append(
        &self,
        role: Role,
        draft: AttendanceDraft,
    ) -> Result<AttendanceEvent, String> {
        if self.failures.append {
            return Err("append failed".to_string());
        }

        let mut guard = self.rows.lock().expect("ledger mutex poisoned");
        let stamp = {
            let mut clock = self.clock.lock().expect("clock mutex poisoned");
            let now = clock.now;
            clock.now = now + clock.tick;
            self.calendar.stamp(now)
        };
        let prior = guard
            .iter()
            .filter(|(row_role, event)| {
                *row_role == role && event.email == draft.email && event.date == stamp.date
            })
            .count();
        let id = guard.len() as i64 + 1;
        let event = AttendanceEvent::from_draft(
            id,
            draft,
            stamp,
            EventType::from_prior_count(prior as i64),
        );
        guard.push((role, event.clone()));
        Ok(event)
    }

    async fn events_on(&self, role: Role, date: NaiveDate) -> Result<Vec<AttendanceEvent>, String> {
        if self.failures.events_on {
            return Err("read failed".to_string());
        }

        let mut events: Vec<AttendanceEvent> = self
            .events(role)
            .into_iter()
            .filter(|event| event.date == date)
            .collect();
        events.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn recent(&self, role: Role, limit: i64) -> Result<Vec<AttendanceEvent>, String> {
        let mut events = self.events(role);
        events.sort_by(|a, b| (b.date, b.time, b.id).cmp(&(a.date, a.time, a.id)));
        events.truncate(limit.max(0) as usize);
        Ok(events)
    }
}
