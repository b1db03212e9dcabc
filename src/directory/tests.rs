#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use super::{failure_message, StudentDirectoryClient};
use crate::notifications::{NotificationLevel, Notifier};
use crate::test_support::{address, FakePorts, Fault, ADMIN, STRANGER};
use crate::types::{
    ConnectionState, OperationKind, SearchOutcome, Settlement, StudentId, WriteStage,
};
use crate::RegistryError;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

fn given_admin_connection() -> ConnectionState {
    let mut state = ConnectionState::disconnected();
    state.connect(address(ADMIN));
    state.set_admin(true);
    state
}

fn given_client(ports: FakePorts) -> (StudentDirectoryClient<FakePorts>, Arc<FakePorts>) {
    let ports = Arc::new(ports);
    (StudentDirectoryClient::new(Arc::clone(&ports)), ports)
}

#[tokio::test]
async fn when_adding_with_empty_name_then_validation_error_without_network_call() {
    let (client, ports) = given_client(FakePorts::new());

    for input in ["", "   "] {
        let result = client.add_student(&given_admin_connection(), input).await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));
    }

    assert!(ports.calls().await.is_empty());
    let active = ports.notifications.active();
    assert_eq!(active[0].level(), NotificationLevel::Warning);
    assert_eq!(active[0].message(), "Please enter a student name");
}

#[tokio::test]
async fn when_searching_or_removing_with_bad_id_then_no_network_call() {
    let (client, ports) = given_client(FakePorts::new());
    let connection = given_admin_connection();

    for input in ["", "abc", "-3", "4.2"] {
        assert!(matches!(
            client.search(input).await,
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            client.remove_student(&connection, input).await,
            Err(RegistryError::Validation(_))
        ));
    }

    assert!(ports.calls().await.is_empty());
}

#[tokio::test]
async fn when_add_confirms_then_pending_notification_is_replaced_by_success() {
    let (client, ports) = given_client(FakePorts::new());

    let operation = client
        .add_student(&given_admin_connection(), "Ada Lovelace")
        .await
        .expect("add succeeds");

    assert_eq!(operation.stage(), WriteStage::Settled(Settlement::Success));
    assert!(operation.tx_hash().is_some());
    assert_eq!(
        ports.calls().await,
        vec![
            "add_student:Ada Lovelace".to_string(),
            format!("wait:{}", operation.tx_hash().unwrap())
        ]
    );

    let keyed = ports.notifications.find("addStudent").expect("keyed notification");
    assert_eq!(keyed.level(), NotificationLevel::Success);
    assert_eq!(keyed.message(), "Student added successfully!");
    assert_eq!(ports.notifications.active().len(), 1);

    let history = ports.notifications.history();
    assert_eq!(history[0].message(), "Adding student...");
    assert!(history[0].is_sticky());
    assert_eq!(client.stage(OperationKind::Add), WriteStage::Settled(Settlement::Success));
    assert!(client.pending(OperationKind::Add).is_none());
}

#[tokio::test]
async fn when_two_adds_race_then_second_is_rejected_by_in_flight_guard() {
    let (ports, gate) = FakePorts::new().with_submit_gate();
    let (client, ports) = given_client(ports);
    let connection = given_admin_connection();

    let (first, second) = tokio::join!(client.add_student(&connection, "Ada"), async {
        ports.submit_started.notified().await;
        assert_eq!(client.stage(OperationKind::Add), WriteStage::Submitting);
        let pending = client.pending(OperationKind::Add).expect("pending add");
        assert!(!pending.correlation_id().is_empty());

        let second = client.add_student(&connection, "Grace").await;
        gate.notify_one();
        second
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(RegistryError::Busy(_))));
    assert_eq!(ports.calls_matching("add_student").await, 1);
}

#[tokio::test]
async fn when_many_adds_arrive_together_then_exactly_one_reaches_the_contract() {
    let (ports, gate) = FakePorts::new().with_submit_gate();
    let (client, ports) = given_client(ports);
    let connection = given_admin_connection();
    let names: Vec<String> = (0..5).map(|i| format!("Student {i}")).collect();

    let attempts = join_all(names.iter().map(|name| client.add_student(&connection, name)));
    let (results, ()) = tokio::join!(attempts, async {
        ports.submit_started.notified().await;
        gate.notify_one();
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(RegistryError::Busy(_))))
            .count(),
        4
    );
    assert_eq!(ports.calls_matching("add_student").await, 1);
}

#[tokio::test]
async fn when_add_and_remove_overlap_then_kinds_do_not_block_each_other() {
    let (ports, gate) = FakePorts::new().with_submit_gate();
    let (client, ports) = given_client(ports);
    let connection = given_admin_connection();

    let (added, removed) = tokio::join!(client.add_student(&connection, "Ada"), async {
        ports.submit_started.notified().await;
        let (removed, ()) = tokio::join!(client.remove_student(&connection, "7"), async {
            ports.submit_started.notified().await;
            gate.notify_waiters();
        });
        removed
    });

    assert!(added.is_ok());
    assert!(removed.is_ok());
    assert_eq!(ports.calls_matching("add_student:Ada").await, 1);
    assert_eq!(ports.calls_matching("remove_student:7").await, 1);
}

#[tokio::test]
async fn when_add_fails_then_guard_is_released_and_retry_is_possible() {
    let (client, ports) = given_client(
        FakePorts::new().with_submit_fault(Fault::Network("insufficient funds".to_string())),
    );
    let connection = given_admin_connection();

    let failed = client.add_student(&connection, "Ada").await;
    assert!(matches!(failed, Err(RegistryError::NetworkFault(_))));
    assert_eq!(client.stage(OperationKind::Add), WriteStage::Settled(Settlement::Failure));
    assert_eq!(
        ports.notifications.find("addStudent").unwrap().message(),
        "Failed to add student: insufficient funds"
    );

    ports.set_submit_fault(None).await;
    assert!(client.add_student(&connection, "Ada").await.is_ok());
    assert_eq!(ports.calls_matching("add_student").await, 2);
}

#[tokio::test]
async fn when_remove_reverts_with_not_admin_then_fixed_only_admin_text_is_shown() {
    let (client, ports) = given_client(FakePorts::new().with_submit_fault(Fault::NotAdmin));

    let result = client
        .remove_student(&given_admin_connection(), "5")
        .await;

    assert!(matches!(result, Err(RegistryError::Unauthorized)));
    let errors: Vec<_> = ports
        .notifications
        .history()
        .into_iter()
        .filter(|n| n.level() == NotificationLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "Only admin can remove students");
}

#[tokio::test]
async fn when_remove_reverts_with_person_not_found_then_it_is_an_operation_failure() {
    let (client, ports) =
        given_client(FakePorts::new().with_confirm_fault(Fault::PersonNotFound));

    let result = client
        .remove_student(&given_admin_connection(), "9")
        .await;

    assert!(matches!(result, Err(RegistryError::NotFound)));
    let keyed = ports.notifications.find("removeStudent").unwrap();
    assert_eq!(keyed.level(), NotificationLevel::Error);
    assert_eq!(keyed.message(), "Student not found");
}

#[tokio::test]
async fn when_caller_is_not_admin_then_write_is_not_submitted() {
    let (client, ports) = given_client(FakePorts::new());
    let mut connection = ConnectionState::disconnected();
    connection.connect(address(STRANGER));

    let result = client.add_student(&connection, "Ada").await;

    assert!(matches!(result, Err(RegistryError::Unauthorized)));
    assert!(ports.calls().await.is_empty());
    assert_eq!(
        ports.notifications.active()[0].message(),
        "Only admin can add students"
    );
}

#[tokio::test]
async fn when_wallet_is_not_connected_then_write_is_not_submitted() {
    let (client, ports) = given_client(FakePorts::new());

    let result = client
        .remove_student_by_id(&ConnectionState::disconnected(), StudentId::new(1))
        .await;

    assert!(matches!(result, Err(RegistryError::NotConnected)));
    assert!(ports.calls().await.is_empty());
}

#[tokio::test]
async fn when_search_finds_existing_record_then_found() {
    let (client, _ports) = given_client(FakePorts::new().with_student(5, "Ada", true));

    let outcome = client.search("5").await.expect("search");

    let record = outcome.record().expect("record");
    assert_eq!(record.name, "Ada");
    assert_eq!(record.id, StudentId::new(5));
}

#[tokio::test]
async fn when_search_returns_non_existing_record_then_not_found_not_error() {
    let (client, ports) = given_client(FakePorts::new().with_student(5, "", false));

    let outcome = client.search("5").await;

    assert!(matches!(outcome, Ok(SearchOutcome::NotFound)));
    assert_eq!(ports.notifications.active()[0].message(), "Student not found");
}

#[tokio::test]
async fn when_search_faults_with_person_not_found_then_not_found() {
    let (client, _ports) = given_client(FakePorts::new().with_lookup_fault(Fault::PersonNotFound));

    let outcome = client.search("5").await;

    assert!(matches!(outcome, Ok(SearchOutcome::NotFound)));
}

#[tokio::test]
async fn when_search_faults_otherwise_then_raw_message_is_surfaced() {
    let (client, ports) = given_client(
        FakePorts::new().with_lookup_fault(Fault::Network("connection refused".to_string())),
    );

    let outcome = client.search("5").await;

    assert!(matches!(outcome, Err(RegistryError::NetworkFault(_))));
    let active = ports.notifications.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].message(), "Failed to search student: connection refused");
}

#[tokio::test]
async fn when_pending_notification_is_dismissed_then_late_success_is_still_reported() {
    let (ports, gate) = FakePorts::new().with_confirm_gate();
    let (client, ports) = given_client(ports);
    let connection = given_admin_connection();

    let (result, ()) = tokio::join!(client.add_student(&connection, "Ada"), async {
        ports.confirm_started.notified().await;
        assert_eq!(
            client.stage(OperationKind::Add),
            WriteStage::AwaitingConfirmation
        );
        ports.dismiss("addStudent");
        assert!(ports.notifications.find("addStudent").is_none());
        gate.notify_one();
    });

    assert!(result.is_ok());
    let keyed = ports.notifications.find("addStudent").expect("late success");
    assert_eq!(keyed.level(), NotificationLevel::Success);
}

#[tokio::test]
async fn when_caller_abandons_add_after_broadcast_then_confirmation_still_settles_it() {
    let (ports, gate) = FakePorts::new().with_confirm_gate();
    let (client, ports) = given_client(ports);
    let connection = given_admin_connection();

    tokio::select! {
        _ = client.add_student(&connection, "Ada") => panic!("add settled before confirmation"),
        () = ports.confirm_started.notified() => {}
    }

    assert_eq!(
        client.stage(OperationKind::Add),
        WriteStage::AwaitingConfirmation
    );
    let duplicate = client.add_student(&connection, "Ada").await;
    assert!(matches!(duplicate, Err(RegistryError::Busy(_))));
    assert_eq!(ports.calls_matching("add_student").await, 1);

    gate.notify_one();
    tokio::time::timeout(Duration::from_secs(1), async {
        while client.stage(OperationKind::Add) != WriteStage::Settled(Settlement::Success) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("detached confirmation settles the add");
    let keyed = ports.notifications.find("addStudent").expect("settlement");
    assert_eq!(keyed.level(), NotificationLevel::Success);

    gate.notify_one();
    assert!(client.add_student(&connection, "Grace").await.is_ok());
    assert_eq!(ports.calls_matching("add_student").await, 2);
}

#[test]
fn failure_messages_map_known_faults_to_fixed_text() {
    assert_eq!(
        failure_message(OperationKind::Add, &RegistryError::Unauthorized),
        "Only admin can add students"
    );
    assert_eq!(
        failure_message(OperationKind::Remove, &RegistryError::NotFound),
        "Student not found"
    );
    assert_eq!(
        failure_message(
            OperationKind::Remove,
            &RegistryError::NetworkFault("nonce too low".to_string())
        ),
        "Failed to remove student: nonce too low"
    );
}
