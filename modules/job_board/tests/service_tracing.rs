//! Service layer against in-memory mock ports, with tracing captured.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing_test::traced_test;

use job_board::domain::accounts::AccountService;
use job_board::domain::error::DomainError;
use job_board::domain::jobs::JobService;
use job_board::domain::password::PasswordHasher;
use job_board::domain::repo::{InsertUserError, JobsRepository, UsersRepository};
use job_board::model::{Credentials, Job, NewJob, NewUser, User};

// Mock credential store
#[derive(Default)]
struct MockUsersRepository {
    users: Mutex<Vec<User>>,
    /// Simulates a concurrent registration winning the race on this email.
    steal_email: Option<String>,
}

#[async_trait]
impl UsersRepository for MockUsersRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<(), InsertUserError> {
        if self.steal_email.as_deref() == Some(user.email.as_str()) {
            return Err(InsertUserError::EmailTaken);
        }
        self.users.lock().push(user);
        Ok(())
    }
}

// Reversible "hash" so tests can inspect what reached the store
struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        Ok(format!("hashed:{plaintext}"))
    }

    async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        hash == format!("hashed:{plaintext}")
    }
}

struct FailingHasher;

#[async_trait]
impl PasswordHasher for FailingHasher {
    async fn hash(&self, _plaintext: &str) -> Result<String, DomainError> {
        Err(DomainError::password_hash("out of memory"))
    }

    async fn verify(&self, _plaintext: &str, _hash: &str) -> bool {
        false
    }
}

#[derive(Default)]
struct MockJobsRepository {
    jobs: Mutex<Vec<Job>>,
}

#[async_trait]
impl JobsRepository for MockJobsRepository {
    async fn insert(&self, job: Job) -> Result<()> {
        self.jobs.lock().push(job);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Job>> {
        Ok(self
            .jobs
            .lock()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

fn accounts(repo: Arc<MockUsersRepository>) -> AccountService {
    AccountService::new(repo, Arc::new(PlainHasher))
}

fn new_user(username: &str, email: &str, password: &str) -> NewUser {
    NewUser {
        username: username.into(),
        email: email.into(),
        password: password.into(),
    }
}

#[traced_test]
#[tokio::test]
async fn register_stores_normalized_email_and_hash() {
    let repo = Arc::new(MockUsersRepository::default());
    let service = accounts(repo.clone());

    let user = service
        .register(new_user(" ana ", " Ana@Example.COM ", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.username, "ana");
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.password_hash, "hashed:secret1");
    assert_eq!(repo.users.lock().len(), 1);
}

#[traced_test]
#[tokio::test]
async fn register_checks_run_in_order() {
    let repo = Arc::new(MockUsersRepository::default());
    let service = accounts(repo.clone());

    // Presence before shape before length.
    let err = service
        .register(new_user("", "bad", "1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "All fields are required!");

    let err = service
        .register(new_user("ana", "bad", "1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid email address");

    let err = service
        .register(new_user("ana", "ana@example.com", "1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Password must be at least 6 characters");

    assert!(repo.users.lock().is_empty());
}

#[traced_test]
#[tokio::test]
async fn email_conflict_wins_over_username_conflict() {
    let repo = Arc::new(MockUsersRepository::default());
    let service = accounts(repo.clone());
    service
        .register(new_user("ana", "ana@example.com", "secret1"))
        .await
        .unwrap();

    let err = service
        .register(new_user("ana", "ana@example.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailTaken { .. }));

    let err = service
        .register(new_user("ana", "second@example.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UsernameTaken { .. }));
    assert_eq!(repo.users.lock().len(), 1);
}

#[traced_test]
#[tokio::test]
async fn store_level_conflict_is_reported_as_conflict() {
    let repo = Arc::new(MockUsersRepository {
        steal_email: Some("ana@example.com".into()),
        ..Default::default()
    });
    let service = accounts(repo);

    let err = service
        .register(new_user("ana", "ana@example.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailTaken { .. }));
    assert!(!err.is_internal());
}

#[traced_test]
#[tokio::test]
async fn hashing_failure_is_internal() {
    let repo = Arc::new(MockUsersRepository::default());
    let service = AccountService::new(repo.clone(), Arc::new(FailingHasher));

    let err = service
        .register(new_user("ana", "ana@example.com", "secret1"))
        .await
        .unwrap_err();
    assert!(err.is_internal());
    assert!(repo.users.lock().is_empty());
}

#[traced_test]
#[tokio::test]
async fn authenticate_is_generic_on_failure() {
    let repo = Arc::new(MockUsersRepository::default());
    let service = accounts(repo);
    service
        .register(new_user("ana", "ana@example.com", "secret1"))
        .await
        .unwrap();

    let ok = service
        .authenticate(Credentials {
            email: "ANA@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    assert_eq!(ok.username, "ana");

    let wrong = service
        .authenticate(Credentials {
            email: "ana@example.com".into(),
            password: "secret2".into(),
        })
        .await
        .unwrap_err();
    let unknown = service
        .authenticate(Credentials {
            email: "bob@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(matches!(wrong, DomainError::InvalidCredentials));
}

#[traced_test]
#[tokio::test]
async fn create_job_validates_and_lists_newest_first() {
    let repo = Arc::new(MockJobsRepository::default());
    let service = JobService::new(repo.clone());

    let err = service
        .create_job(NewJob {
            title: "   ".into(),
            description: "d".into(),
            company: "c".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    assert!(repo.jobs.lock().is_empty());

    for title in ["a", "b"] {
        service
            .create_job(NewJob {
                title: title.into(),
                description: "d".into(),
                company: "c".into(),
                location: Some("  ".into()),
                salary: None,
            })
            .await
            .unwrap();
    }

    let recent = service.recent_jobs(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].title, "b");
    assert_eq!(recent[0].location, None);
}
