use std::time::Duration;

use crate::domain::entities::{Person, Role};
use crate::domain::errors::ScanError;
use crate::domain::ports::PersonDirectory;
use crate::use_cases::storage::with_timeout;

// Allow-lists are searched in this order; the first active match wins.
const LOOKUP_ORDER: [Role; 2] = [Role::Assistant, Role::Student];

// Maps an email to an allow-listed person.
pub struct ResolveIdentityUseCase<D> {
    pub directory: D,
    pub storage_timeout: Duration,
}

impl<D> ResolveIdentityUseCase<D>
where
    D: PersonDirectory,
{
    pub async fn execute(&self, email: &str, claimed_role: Role) -> Result<Person, ScanError> {
        for role in LOOKUP_ORDER {
            let found = with_timeout(
                self.storage_timeout,
                "allow-list lookup",
                self.directory.find_active(role, email),
            )
            .await
            .map_err(ScanError::StorageFailure)?;

            // Inactive rows are filtered by the adapter; guard anyway so a soft-deleted
            // person can never be admitted.
            if let Some(person) = found.filter(|person| person.active) {
                return Ok(Person { role, ..person });
            }
        }

        Err(ScanError::NotFound {
            email: email.to_string(),
            claimed_role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{InMemoryDirectory, person};

    fn use_case(directory: InMemoryDirectory) -> ResolveIdentityUseCase<InMemoryDirectory> {
        ResolveIdentityUseCase {
            directory,
            storage_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn when_email_is_in_assistant_list_then_resolves_as_assistant() {
        let directory = InMemoryDirectory::new()
            .with_person(person(1, "ana@uai.cl", Role::Assistant, true));

        let resolved = use_case(directory)
            .execute("ana@uai.cl", Role::Assistant)
            .await
            .expect("expected assistant");

        assert_eq!(resolved.id, 1);
        assert_eq!(resolved.role, Role::Assistant);
    }

    #[tokio::test]
    async fn when_email_is_active_in_both_lists_then_assistant_record_wins() {
        let directory = InMemoryDirectory::new()
            .with_person(person(7, "dual@uai.cl", Role::Student, true))
            .with_person(person(3, "dual@uai.cl", Role::Assistant, true));

        let resolved = use_case(directory)
            .execute("dual@uai.cl", Role::Student)
            .await
            .expect("expected a match");

        assert_eq!(resolved.id, 3);
        assert_eq!(resolved.role, Role::Assistant);
    }

    #[tokio::test]
    async fn when_only_student_list_matches_then_resolves_as_student() {
        let directory = InMemoryDirectory::new()
            .with_person(person(9, "bea@alumnos.uai.cl", Role::Student, true));

        let resolved = use_case(directory)
            .execute("bea@alumnos.uai.cl", Role::Assistant)
            .await
            .expect("expected student");

        assert_eq!(resolved.role, Role::Student);
    }

    #[tokio::test]
    async fn when_person_is_inactive_then_returns_not_found_with_claimed_role() {
        let directory = InMemoryDirectory::new()
            .with_person(person(4, "old@uai.cl", Role::Assistant, false));

        let result = use_case(directory)
            .execute("old@uai.cl", Role::Student)
            .await;

        assert_eq!(
            result,
            Err(ScanError::NotFound {
                email: "old@uai.cl".to_string(),
                claimed_role: Role::Student,
            })
        );
    }

    #[tokio::test]
    async fn when_email_differs_in_case_then_no_match_is_made() {
        let directory = InMemoryDirectory::new()
            .with_person(person(1, "ana@uai.cl", Role::Assistant, true));

        let result = use_case(directory)
            .execute("Ana@uai.cl", Role::Assistant)
            .await;

        assert!(matches!(result, Err(ScanError::NotFound { .. })));
    }

    #[tokio::test]
    async fn when_directory_fails_then_returns_storage_failure() {
        let directory = InMemoryDirectory::new().failing();

        let result = use_case(directory)
            .execute("ana@uai.cl", Role::Assistant)
            .await;

        assert!(matches!(result, Err(ScanError::StorageFailure(_))));
    }
}
