use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::Value;
use std::time::Duration;

use crate::domain::calendar::LabCalendar;
use crate::domain::entities::{AttendanceEvent, Person};
use crate::domain::errors::ScanError;
use crate::domain::ports::{AttendanceLedger, Clock, PersonDirectory};
use crate::use_cases::admission::{AdmissionDecision, AdmissionPolicy, OccupancyReading};
use crate::use_cases::occupancy::OccupancyUseCase;
use crate::use_cases::record_attendance::RecordAttendanceUseCase;
use crate::use_cases::resolve_identity::ResolveIdentityUseCase;
use crate::use_cases::validate_payload::validate_payload;

// Result of a scan that produced an attendance record.
#[derive(Debug)]
pub struct ScanOutcome {
    pub person: Person,
    pub event: AttendanceEvent,
    pub decision: AdmissionDecision,
    pub processed_at: DateTime<Tz>,
}

// Full pipeline: validate, resolve, record, read occupancy, then decide on the door.
pub struct ProcessScanUseCase<C, D, L> {
    clock: C,
    calendar: LabCalendar,
    resolver: ResolveIdentityUseCase<D>,
    recorder: RecordAttendanceUseCase<L>,
    occupancy: OccupancyUseCase<L>,
    policy: AdmissionPolicy,
}

impl<C, D, L> ProcessScanUseCase<C, D, L>
where
    C: Clock,
    D: PersonDirectory,
    L: AttendanceLedger + Clone,
{
    pub fn new(
        clock: C,
        directory: D,
        ledger: L,
        calendar: LabCalendar,
        policy: AdmissionPolicy,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            clock,
            calendar,
            resolver: ResolveIdentityUseCase {
                directory,
                storage_timeout,
            },
            recorder: RecordAttendanceUseCase {
                ledger: ledger.clone(),
                storage_timeout,
            },
            occupancy: OccupancyUseCase {
                ledger,
                calendar,
                storage_timeout,
            },
            policy,
        }
    }

    pub async fn execute(&self, raw: &Value) -> Result<ScanOutcome, ScanError> {
        let now = self.clock.now();
        let payload = validate_payload(raw, now)?;

        let person = self
            .resolver
            .execute(&payload.email, payload.role)
            .await?;

        // The allow-list role selects the ledger; the claimed role only shapes rejections.
        let event = self
            .recorder
            .execute(person.role, &person.email, &person.name, &person.surname)
            .await?;

        // Read after the append so the scanning assistant's own event is included.
        let reading = match self.occupancy.currently_present(now).await {
            Ok(snapshot) => OccupancyReading::Present(snapshot.count()),
            Err(err) => {
                tracing::error!(error = %err, email = %person.email, "occupancy unavailable");
                OccupancyReading::Unavailable
            }
        };
        let decision = self.policy.decide(person.role, event.event_type, reading);

        Ok(ScanOutcome {
            person,
            event,
            decision,
            processed_at: self.calendar.local(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EventType, Role};
    use crate::domain::errors::ValidationError;
    use crate::use_cases::occupancy::fold_present;
    use crate::use_cases::admission::SpecialCase;
    use crate::use_cases::test_support::{
        FixedClock, InMemoryDirectory, InMemoryLedger, LedgerFailures, lab_calendar, noon, person,
    };
    use proptest::prelude::*;
    use serde_json::json;

    const ASSISTANT: &str = "ana@uai.cl";
    const STUDENT: &str = "bea@alumnos.uai.cl";

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_person(person(1, ASSISTANT, Role::Assistant, true))
            .with_person(person(2, STUDENT, Role::Student, true))
    }

    fn use_case(
        directory: InMemoryDirectory,
        ledger: InMemoryLedger,
        min_assistants_present: usize,
    ) -> ProcessScanUseCase<FixedClock, InMemoryDirectory, InMemoryLedger> {
        ProcessScanUseCase::new(
            FixedClock(noon()),
            directory,
            ledger,
            lab_calendar(),
            AdmissionPolicy {
                min_assistants_present,
            },
            Duration::from_secs(1),
        )
    }

    fn scan(email: &str, role: &str) -> Value {
        json!({
            "name": "Scan",
            "surname": "Tester",
            "email": email,
            "tipoUsuario": role,
            "timestamp": noon().timestamp_millis(),
        })
    }

    #[tokio::test]
    async fn when_assistant_scans_first_time_today_then_entrance_opens_door() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 1);

        let outcome = use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("expected outcome");

        assert_eq!(outcome.event.event_type, EventType::Entrance);
        assert!(outcome.decision.authorized);
        assert_eq!(outcome.person.role, Role::Assistant);
        // The allow-list name is recorded, not the one in the payload.
        assert_eq!(outcome.event.name, "Name1");
    }

    #[tokio::test]
    async fn when_assistant_scans_again_then_exit_never_opens_door() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 1);
        use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("first scan");

        let outcome = use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("second scan");

        assert_eq!(outcome.event.event_type, EventType::Exit);
        assert!(!outcome.decision.authorized);
        assert!(outcome.decision.reason.starts_with("Salida"));
    }

    #[tokio::test]
    async fn when_student_scans_with_no_assistant_inside_then_lab_closed_but_recorded() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 1);

        let outcome = use_case
            .execute(&scan(STUDENT, "ESTUDIANTE"))
            .await
            .expect("student scan is still a success");

        assert_eq!(outcome.event.event_type, EventType::Entrance);
        assert!(!outcome.decision.authorized);
        assert_eq!(outcome.decision.special_case, Some(SpecialCase::LabClosed));
        assert_eq!(ledger.events(Role::Student).len(), 1);
    }

    #[tokio::test]
    async fn when_student_scans_with_assistant_inside_then_door_opens() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 1);
        use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("assistant entrance");

        let outcome = use_case
            .execute(&scan(STUDENT, "ESTUDIANTE"))
            .await
            .expect("student entrance");

        assert!(outcome.decision.authorized);
        assert!(outcome.decision.assistants_present);
    }

    #[tokio::test]
    async fn when_threshold_is_two_then_one_assistant_is_not_enough() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 2);
        use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("assistant entrance");

        let outcome = use_case
            .execute(&scan(STUDENT, "ESTUDIANTE"))
            .await
            .expect("student entrance");

        assert!(!outcome.decision.authorized);
        assert_eq!(outcome.decision.special_case, Some(SpecialCase::LabClosed));
    }

    #[tokio::test]
    async fn when_email_is_unknown_then_not_found_and_nothing_is_written() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 1);

        let result = use_case.execute(&scan("ghost@uai.cl", "ESTUDIANTE")).await;

        assert_eq!(
            result.expect_err("expected rejection"),
            ScanError::NotFound {
                email: "ghost@uai.cl".to_string(),
                claimed_role: Role::Student,
            }
        );
        assert_eq!(ledger.total_events(), 0);
    }

    #[tokio::test]
    async fn when_payload_is_invalid_then_storage_is_never_touched() {
        let ledger = InMemoryLedger::new().with_failures(LedgerFailures {
            append: true,
            events_on: true,
        });
        let use_case = use_case(InMemoryDirectory::new().failing(), ledger.clone(), 1);
        let mut stale = scan(ASSISTANT, "AYUDANTE");
        stale["timestamp"] = json!(noon().timestamp_millis() - 60_000);

        let result = use_case.execute(&stale).await;

        assert_eq!(
            result.expect_err("expected rejection"),
            ScanError::Invalid(ValidationError::Expired)
        );
        assert_eq!(ledger.total_events(), 0);
    }

    #[tokio::test]
    async fn when_occupancy_read_fails_then_student_is_recorded_and_denied() {
        let ledger = InMemoryLedger::new().with_failures(LedgerFailures {
            events_on: true,
            ..LedgerFailures::default()
        });
        let use_case = use_case(directory(), ledger.clone(), 1);

        let outcome = use_case
            .execute(&scan(STUDENT, "ESTUDIANTE"))
            .await
            .expect("event recorded before occupancy read");

        assert!(!outcome.decision.authorized);
        assert_eq!(ledger.events(Role::Student).len(), 1);
    }

    #[tokio::test]
    async fn when_append_fails_then_no_decision_is_made() {
        let ledger = InMemoryLedger::new().with_failures(LedgerFailures {
            append: true,
            ..LedgerFailures::default()
        });
        let use_case = use_case(directory(), ledger, 1);

        let result = use_case.execute(&scan(ASSISTANT, "AYUDANTE")).await;

        assert!(matches!(result, Err(ScanError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn when_later_captured_scan_is_stored_first_then_time_order_still_starts_with_entrance() {
        let first_read = noon();
        let second_read = noon() + chrono::Duration::milliseconds(300);
        // The ledger stamps rows when it takes the lock, not when the scan was read.
        let ledger = InMemoryLedger::new()
            .at(noon())
            .ticking(chrono::Duration::milliseconds(50));
        let policy = AdmissionPolicy {
            min_assistants_present: 1,
        };
        let read_late = ProcessScanUseCase::new(
            FixedClock(second_read),
            directory(),
            ledger.clone(),
            lab_calendar(),
            policy,
            Duration::from_secs(1),
        );
        let read_early = ProcessScanUseCase::new(
            FixedClock(first_read),
            directory(),
            ledger.clone(),
            lab_calendar(),
            policy,
            Duration::from_secs(1),
        );

        let entrance = read_late
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("first stored scan");
        let exit = read_early
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("second stored scan");

        assert_eq!(entrance.event.event_type, EventType::Entrance);
        assert_eq!(exit.event.event_type, EventType::Exit);
        assert!(entrance.event.time < exit.event.time);

        let mut by_time = ledger.events(Role::Assistant);
        by_time.sort_by_key(|event| (event.time, event.id));
        assert_eq!(by_time[0].event_type, EventType::Entrance);
        assert_eq!(fold_present(by_time).count(), 0);
    }

    #[tokio::test]
    async fn when_assistant_exits_while_colleague_is_inside_then_assistants_are_still_present() {
        let ledger = InMemoryLedger::new();
        let directory =
            directory().with_person(person(3, "carla@uai.cl", Role::Assistant, true));
        let use_case = use_case(directory, ledger.clone(), 1);
        use_case
            .execute(&scan("carla@uai.cl", "AYUDANTE"))
            .await
            .expect("colleague entrance");
        use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("entrance");

        let outcome = use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("exit");

        assert_eq!(outcome.event.event_type, EventType::Exit);
        assert!(!outcome.decision.authorized);
        assert!(outcome.decision.assistants_present);
    }

    #[tokio::test]
    async fn when_last_assistant_exits_then_no_assistants_are_present() {
        let ledger = InMemoryLedger::new();
        let use_case = use_case(directory(), ledger.clone(), 1);
        use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("entrance");

        let outcome = use_case
            .execute(&scan(ASSISTANT, "AYUDANTE"))
            .await
            .expect("exit");

        assert!(!outcome.decision.assistants_present);
    }

    #[tokio::test]
    async fn when_same_person_scans_concurrently_then_events_still_alternate() {
        let ledger = InMemoryLedger::new();
        let use_case = std::sync::Arc::new(use_case(directory(), ledger.clone(), 1));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let use_case = use_case.clone();
            handles.push(tokio::spawn(async move {
                use_case.execute(&scan(ASSISTANT, "AYUDANTE")).await
            }));
        }
        for handle in handles {
            handle.await.expect("task").expect("scan");
        }

        let events = ledger.events(Role::Assistant);
        assert_eq!(events.len(), 16);
        for (index, event) in events.iter().enumerate() {
            assert_eq!(event.event_type, EventType::from_prior_count(index as i64));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        // Any interleaving of scans keeps every person's daily sequence alternating.
        #[test]
        fn prop_each_person_alternates_starting_with_entrance(
            scans in proptest::collection::vec((0usize..4, any::<bool>()), 0..40)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime");
            let ledger = InMemoryLedger::new();
            let mut directory = InMemoryDirectory::new();
            for index in 0..4 {
                directory = directory
                    .with_person(person(index as i64, &format!("a{index}@uai.cl"), Role::Assistant, true))
                    .with_person(person(10 + index as i64, &format!("s{index}@uai.cl"), Role::Student, true));
            }
            let use_case = use_case(directory, ledger.clone(), 1);

            runtime.block_on(async {
                for (index, is_student) in &scans {
                    let (email, role) = if *is_student {
                        (format!("s{index}@uai.cl"), "ESTUDIANTE")
                    } else {
                        (format!("a{index}@uai.cl"), "AYUDANTE")
                    };
                    use_case.execute(&scan(&email, role)).await.expect("scan");
                }
            });

            prop_assert_eq!(ledger.total_events(), scans.len());
            for role in [Role::Assistant, Role::Student] {
                let mut seen: std::collections::HashMap<String, i64> = std::collections::HashMap::new();
                for event in ledger.events(role) {
                    let count = seen.entry(event.email.clone()).or_insert(0);
                    prop_assert_eq!(event.event_type, EventType::from_prior_count(*count));
                    *count += 1;
                }
            }
        }
    }
}
