use snowmow::domain::{JobStatus, PaymentStatus, UserRole};

#[test]
fn given_canonical_names_when_parsing_then_round_trips_through_as_str() {
    for status in [
        JobStatus::Open,
        JobStatus::Assigned,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ] {
        assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
    }
}

#[test]
fn given_retired_status_names_when_parsing_then_rejects() {
    assert!("PENDING".parse::<JobStatus>().is_err());
    assert!("ACCEPTED".parse::<JobStatus>().is_err());
    assert!("open".parse::<JobStatus>().is_err());
}

#[test]
fn given_lifecycle_when_checking_transitions_then_only_forward_edges_allowed() {
    assert!(JobStatus::Open.can_transition_to(JobStatus::Assigned));
    assert!(JobStatus::Assigned.can_transition_to(JobStatus::InProgress));
    assert!(JobStatus::InProgress.can_transition_to(JobStatus::Completed));
    assert!(JobStatus::Open.can_transition_to(JobStatus::Cancelled));
    assert!(JobStatus::Assigned.can_transition_to(JobStatus::Cancelled));

    assert!(!JobStatus::Open.can_transition_to(JobStatus::Completed));
    assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Cancelled));
    assert!(!JobStatus::Completed.can_transition_to(JobStatus::Open));
    assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Open));
}

#[test]
fn given_terminal_statuses_when_checked_then_completed_and_cancelled_are_terminal() {
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Cancelled.is_terminal());
    assert!(!JobStatus::InProgress.is_terminal());
}

#[test]
fn given_defaults_when_created_then_unpaid_and_client() {
    assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    assert_eq!(UserRole::default(), UserRole::Client);
}
