use std::sync::Arc;

use snowmow::application::ports::JobRepository;
use snowmow::domain::{JobStatus, NewJob, PaymentStatus, Price, ServiceCategory, UserId};

use crate::test_postgres::TestPostgres;

fn new_job(client_id: UserId, address: &str) -> NewJob {
    NewJob {
        client_id,
        category: ServiceCategory::Snow,
        service_type: "Driveway + Walkway".to_string(),
        price: Price::from_cents(6000).unwrap(),
        address: address.to_string(),
        description: Some("Gate code 1234".to_string()),
        scheduled_date: None,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_new_job_when_inserting_and_retrieving_then_job_is_open_and_unpaid() {
    let test_pg = TestPostgres::new().await;
    let client = UserId::new();

    let job = test_pg
        .job_repository
        .insert(&new_job(client, "5 Pine Rd, Toronto"))
        .await
        .expect("Failed to insert job");

    let retrieved = test_pg
        .job_repository
        .get_by_id(job.id)
        .await
        .expect("Failed to retrieve job")
        .expect("Job not found");

    assert_eq!(retrieved, job);
    assert_eq!(retrieved.status, JobStatus::Open);
    assert_eq!(retrieved.payment_status, PaymentStatus::Unpaid);
    assert_eq!(retrieved.provider_id, None);
    assert_eq!(retrieved.price.cents(), 6000);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_concurrent_accepts_when_assigning_then_exactly_one_row_updates() {
    let test_pg = TestPostgres::new().await;
    let repo = Arc::new(test_pg.job_repository);
    let job = repo
        .insert(&new_job(UserId::new(), "5 Pine Rd"))
        .await
        .expect("Failed to insert job");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.assign_if_open(job.id, UserId::new()).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_some() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
    let stored = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Assigned);
    assert!(stored.provider_id.is_some());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_assigned_job_when_transitioning_then_status_and_provider_are_guarded() {
    let test_pg = TestPostgres::new().await;
    let repo = &test_pg.job_repository;
    let provider = UserId::new();
    let job = repo.insert(&new_job(UserId::new(), "5 Pine Rd")).await.unwrap();
    repo.assign_if_open(job.id, provider).await.unwrap();

    let by_stranger = repo
        .transition_status(job.id, JobStatus::Assigned, JobStatus::InProgress, Some(UserId::new()))
        .await
        .unwrap();
    let skipping = repo
        .transition_status(job.id, JobStatus::Assigned, JobStatus::Completed, Some(provider))
        .await
        .unwrap();
    let started = repo
        .transition_status(job.id, JobStatus::Assigned, JobStatus::InProgress, Some(provider))
        .await
        .unwrap();

    assert!(by_stranger.is_none());
    assert!(skipping.is_none());
    let started = started.expect("Start should apply");
    assert_eq!(started.status, JobStatus::InProgress);
    assert!(started.updated_at >= job.updated_at);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_completed_job_when_marking_paid_twice_then_flag_sticks() {
    let test_pg = TestPostgres::new().await;
    let repo = &test_pg.job_repository;
    let provider = UserId::new();
    let job = repo.insert(&new_job(UserId::new(), "5 Pine Rd")).await.unwrap();

    assert!(repo.mark_paid(job.id).await.unwrap().is_none());

    repo.assign_if_open(job.id, provider).await.unwrap();
    repo.transition_status(job.id, JobStatus::Assigned, JobStatus::InProgress, Some(provider))
        .await
        .unwrap();
    repo.transition_status(job.id, JobStatus::InProgress, JobStatus::Completed, Some(provider))
        .await
        .unwrap();
    let attached = repo
        .attach_checkout_session(job.id, "cs_test_pg")
        .await
        .unwrap()
        .expect("Session should attach");

    let first = repo.mark_paid(job.id).await.unwrap().expect("First payment");
    let second = repo.mark_paid(job.id).await.unwrap().expect("Replay");

    assert_eq!(attached.checkout_session_id.as_deref(), Some("cs_test_pg"));
    assert_eq!(first.payment_status, PaymentStatus::Paid);
    assert_eq!(second.payment_status, PaymentStatus::Paid);
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_mixed_jobs_when_listing_then_views_match_their_predicates() {
    let test_pg = TestPostgres::new().await;
    let repo = &test_pg.job_repository;
    let client = UserId::new();
    let provider = UserId::new();

    let toronto = repo.insert(&new_job(client, "12 King St, Toronto")).await.unwrap();
    let ottawa = repo.insert(&new_job(client, "9 Oak Ave, Ottawa")).await.unwrap();
    let taken = repo.insert(&new_job(client, "1 Bay St, Toronto")).await.unwrap();
    repo.assign_if_open(taken.id, provider).await.unwrap();

    let open_toronto = repo.list_open(Some("toronto")).await.unwrap();
    let literal = repo.list_open(Some("%")).await.unwrap();
    let mine = repo.list_for_client(client).await.unwrap();
    let schedule = repo.list_for_provider(provider).await.unwrap();

    assert_eq!(open_toronto.iter().map(|j| j.id).collect::<Vec<_>>(), vec![toronto.id]);
    assert!(literal.is_empty());
    assert_eq!(
        mine.iter().map(|j| j.id).collect::<Vec<_>>(),
        vec![taken.id, ottawa.id, toronto.id]
    );
    assert_eq!(schedule.iter().map(|j| j.id).collect::<Vec<_>>(), vec![taken.id]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_open_job_when_forcing_paid_flag_then_constraint_rejects() {
    let test_pg = TestPostgres::new().await;
    let job = test_pg
        .job_repository
        .insert(&new_job(UserId::new(), "5 Pine Rd"))
        .await
        .unwrap();

    let result = sqlx::query("UPDATE jobs SET payment_status = 'PAID' WHERE id = $1")
        .bind(job.id.as_uuid())
        .execute(&test_pg.pool)
        .await;

    assert!(result.is_err());
}
