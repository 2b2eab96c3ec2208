use snowmow::application::ports::JobChangeFeed;
use snowmow::domain::{ChangeKind, Job, JobChange, JobId, NewJob, Price, ServiceCategory, UserId};
use snowmow::infrastructure::realtime::JobChangeBus;
use tokio::sync::broadcast::error::RecvError;

fn job() -> Job {
    Job::open(
        JobId::new(),
        NewJob {
            client_id: UserId::new(),
            category: ServiceCategory::Snow,
            service_type: "Salting Add-on".to_string(),
            price: Price::from_cents(2500).unwrap(),
            address: "3 Birch Ln".to_string(),
            description: None,
            scheduled_date: None,
        },
        chrono::Utc::now(),
    )
}

#[tokio::test]
async fn given_two_subscribers_when_publishing_then_both_receive() {
    let bus = JobChangeBus::new();
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();
    let job = job();

    bus.publish(JobChange::inserted(&job));

    assert_eq!(first.recv().await.unwrap().job_id, job.id);
    assert_eq!(second.recv().await.unwrap().kind, ChangeKind::Insert);
}

#[test]
fn given_no_subscribers_when_publishing_then_nothing_fails() {
    let bus = JobChangeBus::new();

    bus.publish(JobChange::inserted(&job()));
}

#[tokio::test]
async fn given_slow_subscriber_when_buffer_overflows_then_lagged() {
    let bus = JobChangeBus::with_capacity(2);
    let mut slow = bus.subscribe();
    let job = job();

    for _ in 0..4 {
        bus.publish(JobChange::updated(&job));
    }

    assert!(matches!(slow.recv().await, Err(RecvError::Lagged(2))));
}
