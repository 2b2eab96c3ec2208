use std::sync::Arc;

use snowmow::application::ports::JobRepository;
use snowmow::application::services::{JobLifecycleService, LifecycleError};
use snowmow::domain::{
    Job, JobId, JobStatus, NewJob, PaymentConfirmation, PaymentReturn, PaymentStatus, Price,
    ServiceCategory, TransitionError, User, UserId, UserRole,
};
use snowmow::infrastructure::payments::InMemoryPaymentGateway;
use snowmow::infrastructure::persistence::InMemoryJobRepository;

struct Fixture {
    service: Arc<JobLifecycleService>,
    jobs: Arc<InMemoryJobRepository>,
    payments: Arc<InMemoryPaymentGateway>,
    client: User,
    provider: User,
}

fn user(name: &str, role: UserRole) -> User {
    User::new(UserId::new(), name, format!("{name}@example.com"), role)
}

fn fixture() -> Fixture {
    let jobs = Arc::new(InMemoryJobRepository::new());
    let payments = Arc::new(InMemoryPaymentGateway::new());
    Fixture {
        service: Arc::new(JobLifecycleService::new(jobs.clone(), payments.clone())),
        jobs,
        payments,
        client: user("client", UserRole::Client),
        provider: user("provider", UserRole::Provider),
    }
}

fn new_job(client: &User, address: &str) -> NewJob {
    NewJob {
        client_id: client.id,
        category: ServiceCategory::Lawn,
        service_type: "Standard Mow".to_string(),
        price: Price::from_cents(5000).unwrap(),
        address: address.to_string(),
        description: None,
        scheduled_date: None,
    }
}

async fn completed(f: &Fixture) -> Job {
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();
    f.service.accept(&f.provider, job.id).await.unwrap();
    f.service.start(&f.provider, job.id).await.unwrap();
    f.service.complete(&f.provider, job.id).await.unwrap()
}

#[tokio::test]
async fn given_client_when_creating_for_someone_else_then_forbidden() {
    let f = fixture();
    let other = user("other", UserRole::Client);

    let result = f.service.create(&f.client, new_job(&other, "4 Lake Rd")).await;

    assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
}

#[tokio::test]
async fn given_open_job_when_two_providers_race_then_exactly_one_wins() {
    let f = fixture();
    let rival = user("rival", UserRole::Provider);
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();

    let (a, b) = tokio::join!(
        f.service.accept(&f.provider, job.id),
        f.service.accept(&rival, job.id)
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(LifecycleError::JobUnavailable(id)) if id == job.id));

    let stored = f.jobs.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Assigned);
    assert!(stored.provider_id == Some(f.provider.id) || stored.provider_id == Some(rival.id));
}

#[tokio::test]
async fn given_client_when_accepting_then_wrong_role() {
    let f = fixture();
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();

    let result = f.service.accept(&f.client, job.id).await;

    assert!(matches!(
        result,
        Err(LifecycleError::WrongRole {
            required: UserRole::Provider,
            actual: UserRole::Client
        })
    ));
}

#[tokio::test]
async fn given_missing_job_when_accepting_then_not_found() {
    let f = fixture();

    let result = f.service.accept(&f.provider, JobId::new()).await;

    assert!(matches!(result, Err(LifecycleError::NotFound(_))));
}

#[tokio::test]
async fn given_assigned_job_when_owner_cancels_then_cancelled_and_provider_kept() {
    let f = fixture();
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();
    f.service.accept(&f.provider, job.id).await.unwrap();

    let cancelled = f.service.cancel(&f.client, job.id).await.unwrap();

    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert_eq!(cancelled.provider_id, Some(f.provider.id));
}

#[tokio::test]
async fn given_stranger_when_cancelling_then_forbidden_but_admin_may() {
    let f = fixture();
    let stranger = user("stranger", UserRole::Client);
    let admin = user("admin", UserRole::Admin);
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();

    assert!(matches!(
        f.service.cancel(&stranger, job.id).await,
        Err(LifecycleError::Forbidden(_))
    ));
    assert_eq!(
        f.service.cancel(&admin, job.id).await.unwrap().status,
        JobStatus::Cancelled
    );
}

#[tokio::test]
async fn given_cancelled_job_when_accepting_then_unavailable() {
    let f = fixture();
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();
    f.service.cancel(&f.client, job.id).await.unwrap();

    let result = f.service.accept(&f.provider, job.id).await;

    assert!(matches!(result, Err(LifecycleError::JobUnavailable(_))));
}

#[tokio::test]
async fn given_assigned_job_when_completing_without_start_then_invalid_transition() {
    let f = fixture();
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();
    f.service.accept(&f.provider, job.id).await.unwrap();

    let result = f.service.complete(&f.provider, job.id).await;

    assert!(matches!(
        result,
        Err(LifecycleError::Transition(TransitionError::InvalidTransition {
            from: JobStatus::Assigned,
            to: JobStatus::Completed
        }))
    ));
}

#[tokio::test]
async fn given_in_progress_job_when_payment_initiated_then_not_allowed() {
    let f = fixture();
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();
    f.service.accept(&f.provider, job.id).await.unwrap();
    f.service.start(&f.provider, job.id).await.unwrap();

    let result = f
        .service
        .initiate_payment(&f.client, job.id, "https://app.test/", "https://app.test/")
        .await;

    assert!(matches!(result, Err(LifecycleError::PaymentNotAllowed(_))));
}

#[tokio::test]
async fn given_gateway_down_when_payment_initiated_then_job_unchanged() {
    let f = fixture();
    let job = completed(&f).await;
    f.payments.set_unavailable(true);

    let result = f
        .service
        .initiate_payment(&f.client, job.id, "https://app.test/", "https://app.test/")
        .await;

    assert!(matches!(result, Err(LifecycleError::Gateway(_))));
    let stored = f.jobs.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.checkout_session_id, None);
    assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn given_other_client_when_payment_initiated_then_forbidden() {
    let f = fixture();
    let job = completed(&f).await;
    let other = user("other", UserRole::Client);

    let result = f
        .service
        .initiate_payment(&other, job.id, "https://app.test/", "https://app.test/")
        .await;

    assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
}

#[tokio::test]
async fn given_paid_session_when_reconciling_return_then_marks_paid() {
    let f = fixture();
    let job = completed(&f).await;
    let session = f
        .service
        .initiate_payment(&f.client, job.id, "https://app.test/", "https://app.test/")
        .await
        .unwrap();
    f.payments.mark_session_paid(&session.id);

    let paid = f
        .service
        .reconcile_payment_return(&f.client, PaymentReturn { job_id: job.id })
        .await
        .unwrap();

    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.status, JobStatus::Completed);
}

#[tokio::test]
async fn given_unpaid_session_when_reconciling_return_then_fails_closed() {
    let f = fixture();
    let job = completed(&f).await;
    f.service
        .initiate_payment(&f.client, job.id, "https://app.test/", "https://app.test/")
        .await
        .unwrap();

    let result = f
        .service
        .reconcile_payment_return(&f.client, PaymentReturn { job_id: job.id })
        .await;

    assert!(matches!(result, Err(LifecycleError::PaymentUnverified(_))));
    let stored = f.jobs.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn given_confirmation_when_replayed_then_idempotent() {
    let f = fixture();
    let job = completed(&f).await;
    let confirmation = PaymentConfirmation {
        job_id: job.id,
        checkout_session_id: "cs_test_replay".to_string(),
        amount_cents: Some(5000),
    };

    let first = f.service.confirm_payment(&confirmation).await.unwrap();
    let second = f.service.confirm_payment(&confirmation).await.unwrap();

    assert_eq!(first.payment_status, PaymentStatus::Paid);
    assert_eq!(second.payment_status, PaymentStatus::Paid);
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn given_wrong_amount_when_confirming_then_unverified() {
    let f = fixture();
    let job = completed(&f).await;

    let result = f
        .service
        .confirm_payment(&PaymentConfirmation {
            job_id: job.id,
            checkout_session_id: "cs_test_short".to_string(),
            amount_cents: Some(100),
        })
        .await;

    assert!(matches!(result, Err(LifecycleError::PaymentUnverified(_))));
}

#[tokio::test]
async fn given_open_job_when_confirming_payment_then_requires_completion() {
    let f = fixture();
    let job = f.service.create(&f.client, new_job(&f.client, "4 Lake Rd")).await.unwrap();

    let result = f
        .service
        .confirm_payment(&PaymentConfirmation {
            job_id: job.id,
            checkout_session_id: "cs_test_early".to_string(),
            amount_cents: None,
        })
        .await;

    assert!(matches!(
        result,
        Err(LifecycleError::Transition(
            TransitionError::PaymentRequiresCompletion(JobStatus::Open)
        ))
    ));
}

#[tokio::test]
async fn given_jobs_when_listing_then_views_are_scoped_and_newest_first() {
    let f = fixture();
    let first = f.service.create(&f.client, new_job(&f.client, "1 North St")).await.unwrap();
    let second = f.service.create(&f.client, new_job(&f.client, "2 South St")).await.unwrap();
    f.service.accept(&f.provider, first.id).await.unwrap();

    let mine = f.service.list_for_client(&f.client, f.client.id).await.unwrap();
    let market = f.service.list_market(&f.provider, None).await.unwrap();
    let schedule = f.service.list_schedule(&f.provider).await.unwrap();

    assert_eq!(mine.iter().map(|j| j.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    assert_eq!(market.iter().map(|j| j.id).collect::<Vec<_>>(), vec![second.id]);
    assert_eq!(schedule.iter().map(|j| j.id).collect::<Vec<_>>(), vec![first.id]);
}

#[tokio::test]
async fn given_other_client_when_listing_jobs_then_forbidden() {
    let f = fixture();
    let other = user("other", UserRole::Client);

    let result = f.service.list_for_client(&other, f.client.id).await;

    assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
}

#[tokio::test]
async fn given_client_when_viewing_market_then_wrong_role() {
    let f = fixture();

    let result = f.service.list_market(&f.client, None).await;

    assert!(matches!(result, Err(LifecycleError::WrongRole { .. })));
}
