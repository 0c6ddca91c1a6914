use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use crate::domain::calendar::LabCalendar;
use crate::domain::entities::{AttendanceDraft, AttendanceEvent, EventType, Person, Role};
use crate::domain::ports::{AttendanceLedger, PersonDirectory};

fn allow_list_table(role: Role) -> &'static str {
    match role {
        Role::Assistant => "allowed_assistants",
        Role::Student => "allowed_students",
    }
}

fn ledger_table(role: Role) -> &'static str {
    match role {
        Role::Assistant => "assistant_attendance",
        Role::Student => "student_attendance",
    }
}

#[derive(sqlx::FromRow)]
struct PersonRow {
    id: i64,
    name: String,
    surname: String,
    email: String,
    active: bool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    event_date: NaiveDate,
    event_time: NaiveTime,
    weekday: String,
    name: String,
    surname: String,
    email: String,
    method: String,
    event_type: String,
}

impl EventRow {
    fn into_event(self) -> Result<AttendanceEvent, String> {
        let event_type = EventType::parse(&self.event_type)
            .ok_or_else(|| format!("unknown event type {:?} in row {}", self.event_type, self.id))?;
        Ok(AttendanceEvent {
            id: self.id,
            date: self.event_date,
            time: self.event_time,
            weekday_label: self.weekday,
            name: self.name,
            surname: self.surname,
            email: self.email,
            method: self.method,
            event_type,
        })
    }
}

// PostgreSQL-backed allow-lists.
#[derive(Clone)]
pub struct PostgresPersonDirectory {
    pub db: PgPool,
}

#[async_trait]
impl PersonDirectory for PostgresPersonDirectory {
    async fn find_active(&self, role: Role, email: &str) -> Result<Option<Person>, String> {
        let sql = format!(
            "SELECT id, name, surname, email, active FROM {} WHERE email = $1 AND active = TRUE",
            allow_list_table(role)
        );
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| err.to_string())?;

        Ok(row.map(|row| Person {
            id: row.id,
            name: row.name,
            surname: row.surname,
            email: row.email,
            role,
            active: row.active,
        }))
    }
}

// PostgreSQL-backed attendance ledgers, one table per role.
#[derive(Clone)]
pub struct PostgresAttendanceLedger {
    pub db: PgPool,
    pub calendar: LabCalendar,
}

#[async_trait]
impl AttendanceLedger for PostgresAttendanceLedger {
    async fn append(
        &self,
        role: Role,
        draft: AttendanceDraft,
    ) -> Result<AttendanceEvent, String> {
        let table = ledger_table(role);
        let mut tx = self.db.begin().await.map_err(|err| err.to_string())?;

        // Serializes concurrent scans of the same person in this ledger; the lock is
        // released when the transaction ends.
        let lock_key = format!("{table}:{}", draft.email);
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&lock_key)
            .execute(&mut *tx)
            .await
            .map_err(|err| err.to_string())?;

        // Stamped under the lock from the database clock, so rows of one person are
        // ordered in time exactly as they are counted.
        let stamped_at: DateTime<Utc> = sqlx::query_scalar("SELECT clock_timestamp()")
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| err.to_string())?;
        let stamp = self.calendar.stamp(stamped_at);

        let count_sql = format!("SELECT COUNT(*) FROM {table} WHERE email = $1 AND event_date = $2");
        let prior: i64 = sqlx::query_scalar(&count_sql)
            .bind(&draft.email)
            .bind(stamp.date)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| err.to_string())?;
        let event_type = EventType::from_prior_count(prior);

        let insert_sql = format!(
            r#"
            INSERT INTO {table}
                (event_date, event_time, weekday, name, surname, email, method, event_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#
        );
        let id: i64 = sqlx::query_scalar(&insert_sql)
            .bind(stamp.date)
            .bind(stamp.time)
            .bind(&stamp.weekday_label)
            .bind(&draft.name)
            .bind(&draft.surname)
            .bind(&draft.email)
            .bind(&draft.method)
            .bind(event_type.label())
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| err.to_string())?;

        tx.commit().await.map_err(|err| err.to_string())?;

        Ok(AttendanceEvent::from_draft(id, draft, stamp, event_type))
    }

    async fn events_on(&self, role: Role, date: NaiveDate) -> Result<Vec<AttendanceEvent>, String> {
        let sql = format!(
            r#"
            SELECT id, event_date, event_time, weekday, name, surname, email, method, event_type
            FROM {}
            WHERE event_date = $1
            ORDER BY event_time ASC, id ASC
            "#,
            ledger_table(role)
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(date)
            .fetch_all(&self.db)
            .await
            .map_err(|err| err.to_string())?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    async fn recent(&self, role: Role, limit: i64) -> Result<Vec<AttendanceEvent>, String> {
        let sql = format!(
            r#"
            SELECT id, event_date, event_time, weekday, name, surname, email, method, event_type
            FROM {}
            ORDER BY event_date DESC, event_time DESC, id DESC
            LIMIT $1
            "#,
            ledger_table(role)
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(limit)
            .fetch_all(&self.db)
            .await
            .map_err(|err| err.to_string())?;

        rows.into_iter().map(EventRow::into_event).collect()
    }
}

// Connectivity probe used by the diagnostics endpoint.
pub async fn ping(db: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(db).await.map(|_| ())
}
