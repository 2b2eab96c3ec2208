use std::sync::Arc;

use snowmow::application::ports::JobRepository;
use snowmow::application::ports::JobChangeFeed;
use snowmow::domain::{ChangeKind, JobStatus, NewJob, Price, ServiceCategory, UserId};
use snowmow::infrastructure::persistence::InMemoryJobRepository;
use snowmow::infrastructure::realtime::JobChangeBus;

fn new_job(client_id: UserId, address: &str) -> NewJob {
    NewJob {
        client_id,
        category: ServiceCategory::Lawn,
        service_type: "Mow & Edge".to_string(),
        price: Price::from_cents(7000).unwrap(),
        address: address.to_string(),
        description: None,
        scheduled_date: None,
    }
}

#[tokio::test]
async fn given_inserts_when_listing_then_newest_first() {
    let repo = InMemoryJobRepository::new();
    let client = UserId::new();

    let first = repo.insert(&new_job(client, "1 A St")).await.unwrap();
    let second = repo.insert(&new_job(client, "2 B St")).await.unwrap();
    let third = repo.insert(&new_job(client, "3 C St")).await.unwrap();

    let ids: Vec<_> = repo
        .list_for_client(client)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.id)
        .collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn given_assigned_job_when_assigning_again_then_no_row() {
    let repo = InMemoryJobRepository::new();
    let job = repo.insert(&new_job(UserId::new(), "1 A St")).await.unwrap();
    let winner = UserId::new();

    let first = repo.assign_if_open(job.id, winner).await.unwrap();
    let second = repo.assign_if_open(job.id, UserId::new()).await.unwrap();

    assert_eq!(first.unwrap().provider_id, Some(winner));
    assert!(second.is_none());
}

#[tokio::test]
async fn given_stale_from_status_when_transitioning_then_no_row() {
    let repo = InMemoryJobRepository::new();
    let job = repo.insert(&new_job(UserId::new(), "1 A St")).await.unwrap();
    let provider = UserId::new();
    repo.assign_if_open(job.id, provider).await.unwrap();

    let stale = repo
        .transition_status(job.id, JobStatus::Open, JobStatus::Cancelled, None)
        .await
        .unwrap();
    let wrong_provider = repo
        .transition_status(job.id, JobStatus::Assigned, JobStatus::InProgress, Some(UserId::new()))
        .await
        .unwrap();
    let moved = repo
        .transition_status(job.id, JobStatus::Assigned, JobStatus::InProgress, Some(provider))
        .await
        .unwrap();

    assert!(stale.is_none());
    assert!(wrong_provider.is_none());
    assert_eq!(moved.unwrap().status, JobStatus::InProgress);
}

#[tokio::test]
async fn given_unfinished_job_when_marking_paid_then_refused() {
    let repo = InMemoryJobRepository::new();
    let job = repo.insert(&new_job(UserId::new(), "1 A St")).await.unwrap();

    assert!(repo.mark_paid(job.id).await.unwrap().is_none());
    assert!(repo.attach_checkout_session(job.id, "cs_1").await.unwrap().is_none());
}

#[tokio::test]
async fn given_filter_when_listing_open_then_case_insensitive_substring() {
    let repo = InMemoryJobRepository::new();
    let client = UserId::new();
    repo.insert(&new_job(client, "12 King St, Toronto")).await.unwrap();
    repo.insert(&new_job(client, "9 Oak Ave, Ottawa")).await.unwrap();

    let toronto = repo.list_open(Some("TORONTO")).await.unwrap();
    let all = repo.list_open(None).await.unwrap();

    assert_eq!(toronto.len(), 1);
    assert_eq!(toronto[0].address, "12 King St, Toronto");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn given_change_bus_when_writing_then_changes_are_published() {
    let bus = Arc::new(JobChangeBus::new());
    let mut changes = bus.subscribe();
    let repo = InMemoryJobRepository::with_change_bus(bus.clone());

    let job = repo.insert(&new_job(UserId::new(), "1 A St")).await.unwrap();
    repo.assign_if_open(job.id, UserId::new()).await.unwrap();

    let inserted = changes.recv().await.unwrap();
    let updated = changes.recv().await.unwrap();
    assert_eq!(inserted.kind, ChangeKind::Insert);
    assert!(inserted.is_new_open_job());
    assert_eq!(updated.kind, ChangeKind::Update);
    assert_eq!(updated.record.unwrap().status, JobStatus::Assigned);
}
