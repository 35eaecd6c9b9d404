//! Moderation flow integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test moderation_flow -- --ignored`
//!
//! Each test creates a unique database, runs migrations, and drops the
//! database afterwards, so tests can run in parallel.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{Database, DatabaseConnection};
use wave_common::AppError;
use wave_core::{
    AccountService, DeletionService, RegisterAccountInput, ReportService, RetentionService,
    ReviewDecision, SubmitReportInput, UnbanRequestService, VerificationService,
};
use wave_db::{
    entities::{
        report::{ContentSnapshot, ReportAction, ReportTargetType},
        user_account::AccountStatus,
    },
    repositories::{
        AccountRepository, ActivityLogRepository, DeletedAccountRepository, ReportRepository,
        UnbanRequestRepository, VerificationRepository,
    },
    test_utils::TestDatabase,
};

struct Services {
    accounts: AccountService,
    reports: ReportService,
    unban_requests: UnbanRequestService,
    verifications: VerificationService,
    deletions: DeletionService,
    retention: RetentionService,
}

fn build_services(conn: DatabaseConnection) -> Services {
    let db = Arc::new(conn);
    let account_repo = AccountRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let unban_repo = UnbanRequestRepository::new(Arc::clone(&db));
    let verification_repo = VerificationRepository::new(Arc::clone(&db));
    let deleted_repo = DeletedAccountRepository::new(Arc::clone(&db));
    let activity_repo = ActivityLogRepository::new(Arc::clone(&db));

    let accounts = AccountService::new(
        Arc::clone(&db),
        account_repo.clone(),
        activity_repo.clone(),
        5,
        None,
    );
    let reports = ReportService::new(
        Arc::clone(&db),
        report_repo.clone(),
        accounts.clone(),
        activity_repo.clone(),
    );
    let unban_requests = UnbanRequestService::new(
        Arc::clone(&db),
        unban_repo,
        accounts.clone(),
        activity_repo.clone(),
    );
    let verifications = VerificationService::new(
        Arc::clone(&db),
        verification_repo,
        deleted_repo.clone(),
        accounts.clone(),
        activity_repo.clone(),
        365,
    );
    let deletions = DeletionService::new(
        Arc::clone(&db),
        account_repo,
        report_repo.clone(),
        deleted_repo.clone(),
        activity_repo.clone(),
    );
    let retention = RetentionService::new(
        Arc::clone(&db),
        deleted_repo,
        report_repo,
        activity_repo,
        365,
        100,
    );

    Services {
        accounts,
        reports,
        unban_requests,
        verifications,
        deletions,
        retention,
    }
}

async fn setup() -> (TestDatabase, Services) {
    let db = TestDatabase::create_unique().await.expect("create test db");
    wave_db::migrate(db.connection()).await.expect("migrate");
    // `DatabaseConnection` is not `Clone` while the `mock` feature is active
    // (enabled crate-wide by the unit tests), so open a dedicated connection to
    // the same unique test database for the services.
    let conn = Database::connect(db.config.database_url())
        .await
        .expect("connect services");
    let services = build_services(conn);
    (db, services)
}

async fn register(services: &Services, email: &str, nickname: &str) -> String {
    services
        .accounts
        .register(RegisterAccountInput {
            email: email.to_string(),
            nickname: nickname.to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1999, 5, 5).unwrap(),
        })
        .await
        .expect("register")
        .id
}

fn report_input(target_user_id: &str) -> SubmitReportInput {
    SubmitReportInput {
        target_type: ReportTargetType::Post,
        target_id: "post1".to_string(),
        target_user_id: target_user_id.to_string(),
        reason: "spam".to_string(),
        content_snapshot: ContentSnapshot {
            title: Some("offending post".to_string()),
            body: Some("buy cheap things".to_string()),
            mood: Some("neutral".to_string()),
            author_ip: Some("203.0.113.9".to_string()),
            authored_at: Some(Utc::now().into()),
            deleted: false,
            deleted_reason: None,
        },
        reporter_ip: Some("198.51.100.7".to_string()),
    }
}

/// Scenario A: a warning disposition increments the counter by exactly one
/// and leaves the trust state untouched.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_warning_disposition_increments_counter_only() {
    let (db, services) = setup().await;

    let reporter = register(&services, "u@example.com", "reporter").await;
    let target = register(&services, "v@example.com", "target").await;

    let report = services
        .reports
        .submit(&reporter, report_input(&target))
        .await
        .unwrap();

    let disposed = services
        .reports
        .dispose(&report.id, "admin", ReportAction::Warning, None)
        .await
        .unwrap();
    assert_eq!(disposed.action, Some(ReportAction::Warning));

    let account = services.accounts.get(&target).await.unwrap();
    assert_eq!(account.warning_count, 1);
    assert_eq!(account.status, AccountStatus::Active);
    assert!(account.suspended_at.is_none());
    assert!(account.banned_at.is_none());

    db.drop_database().await.unwrap();
}

/// A suspend disposition always leaves the target suspended with a reason.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_suspend_disposition_suspends_target() {
    let (db, services) = setup().await;

    let reporter = register(&services, "u@example.com", "reporter").await;
    let target = register(&services, "v@example.com", "target").await;

    let report = services
        .reports
        .submit(&reporter, report_input(&target))
        .await
        .unwrap();
    services
        .reports
        .dispose(&report.id, "admin", ReportAction::Suspend, None)
        .await
        .unwrap();

    let account = services.accounts.get(&target).await.unwrap();
    assert_eq!(account.status, AccountStatus::Suspended);
    assert!(account.suspended_at.is_some());
    assert!(account.suspend_reason.is_some());

    db.drop_database().await.unwrap();
}

/// Scenario D / idempotence: a second disposition of the same report fails
/// and does not double-apply the account effect.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_disposition_conflicts_and_does_not_double_apply() {
    let (db, services) = setup().await;

    let reporter = register(&services, "u@example.com", "reporter").await;
    let target = register(&services, "v@example.com", "target").await;

    let report = services
        .reports
        .submit(&reporter, report_input(&target))
        .await
        .unwrap();
    services
        .reports
        .dispose(&report.id, "admin-a", ReportAction::Warning, None)
        .await
        .unwrap();

    let err = services
        .reports
        .dispose(&report.id, "admin-b", ReportAction::Warning, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::InvalidTransition(_) | AppError::Conflict(_)),
        "unexpected error: {err:?}"
    );

    let account = services.accounts.get(&target).await.unwrap();
    assert_eq!(account.warning_count, 1, "warning must not double-apply");

    db.drop_database().await.unwrap();
}

/// Scenario B: a suspended user appeals, the admin approves, and the account
/// returns to active with the suspension fields cleared.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_approved_appeal_reinstates_account() {
    let (db, services) = setup().await;

    let user = register(&services, "v@example.com", "appealer").await;
    services
        .accounts
        .suspend(&user, "terms violation", "admin", None)
        .await
        .unwrap();

    let request = services
        .unban_requests
        .request(&user, "it was a misunderstanding", None)
        .await
        .unwrap();
    assert_eq!(request.current_status, AccountStatus::Suspended);

    services
        .unban_requests
        .dispose(&request.id, "admin", ReviewDecision::Approve, None)
        .await
        .unwrap();

    let account = services.accounts.get(&user).await.unwrap();
    assert_eq!(account.status, AccountStatus::Active);
    assert!(account.suspended_at.is_none());
    assert!(account.suspend_reason.is_none());

    db.drop_database().await.unwrap();
}

/// An active account cannot open an appeal, and a second pending appeal is
/// rejected.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_appeal_guards() {
    let (db, services) = setup().await;

    let user = register(&services, "v@example.com", "appealer").await;

    let err = services
        .unban_requests
        .request(&user, "let me back in", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    services
        .accounts
        .suspend(&user, "terms violation", "admin", None)
        .await
        .unwrap();
    services
        .unban_requests
        .request(&user, "first appeal", None)
        .await
        .unwrap();

    let err = services
        .unban_requests
        .request(&user, "second appeal", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateRequest(_)));

    db.drop_database().await.unwrap();
}

/// Scenario C: a deleted account with report history re-registers; a
/// verification request is auto-created, and rejection bans the new account.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_rejected_verification_bans_re_registration() {
    let (db, services) = setup().await;

    let reporter = register(&services, "u@example.com", "reporter").await;
    let offender = register(&services, "again@example.com", "offender").await;

    // Build up violation history, then self-delete.
    let report = services
        .reports
        .submit(&reporter, report_input(&offender))
        .await
        .unwrap();
    services
        .reports
        .dispose(&report.id, "admin", ReportAction::Warning, None)
        .await
        .unwrap();
    services
        .deletions
        .delete_account(&offender, "leaving", None)
        .await
        .unwrap();

    // Re-register with the same email.
    services
        .verifications
        .ensure_can_register("again@example.com")
        .await
        .unwrap();
    let new_account = services
        .accounts
        .register(RegisterAccountInput {
            email: "again@example.com".to_string(),
            nickname: "offender2".to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1999, 5, 5).unwrap(),
        })
        .await
        .unwrap();
    let request = services
        .verifications
        .screen(&new_account, None)
        .await
        .unwrap()
        .expect("gate must open a verification request");

    let held = services.accounts.get(&new_account.id).await.unwrap();
    assert!(held.held_for_verification);

    // A second registration attempt for the same email is rejected outright.
    let err = services
        .verifications
        .ensure_can_register("again@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateRequest(_)));

    services
        .verifications
        .dispose(&request.id, "admin", ReviewDecision::Reject, None)
        .await
        .unwrap();

    let banned = services.accounts.get(&new_account.id).await.unwrap();
    assert_eq!(banned.status, AccountStatus::Banned);
    assert!(banned.banned_at.is_some());
    assert!(!banned.held_for_verification);

    db.drop_database().await.unwrap();
}

/// After the retention window the sweep scrubs the archive entry, tombstones
/// report snapshots and deletes the user's activity log rows. Running it
/// again is a no-op.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_retention_sweep_scrubs_and_is_idempotent() {
    let (db, services) = setup().await;

    let reporter = register(&services, "u@example.com", "reporter").await;
    let target = register(&services, "v@example.com", "target").await;

    let report = services
        .reports
        .submit(&reporter, report_input(&target))
        .await
        .unwrap();
    services
        .reports
        .dispose(&report.id, "admin", ReportAction::Warning, None)
        .await
        .unwrap();
    services
        .deletions
        .delete_account(&target, "leaving", None)
        .await
        .unwrap();

    // Not yet eligible.
    let outcome = services.retention.sweep(Utc::now()).await.unwrap();
    assert_eq!(outcome.entries_scrubbed, 0);

    // One day past the window.
    let future = Utc::now() + Duration::days(366);
    let outcome = services.retention.sweep(future).await.unwrap();
    assert_eq!(outcome.entries_scrubbed, 1);

    let swept = services.reports.get(&report.id).await.unwrap();
    assert!(swept.content_snapshot.is_tombstone());
    assert!(swept.content_snapshot.author_ip.is_none());

    // Second run with the same clock is a no-op.
    let outcome = services.retention.sweep(future).await.unwrap();
    assert_eq!(outcome.entries_scrubbed, 0);

    db.drop_database().await.unwrap();
}
