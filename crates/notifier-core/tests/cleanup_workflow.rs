//! End-to-end cleanup workflow scenarios against the in-memory mock provider.

use notifier_core::mock::MockCloud;
use notifier_core::options::{CleanupOptions, SetupConfig};
use notifier_core::workflow::{FailurePolicy, StepOutcome, run_cleanup, run_setup};
use notifier_core::{CloudServices, ErrorKind};

fn demo_config() -> SetupConfig {
    SetupConfig {
        project_id: "demo".to_owned(),
        slack_webhook_url: "https://hooks.slack.com/services/T000/B000/abc123".to_owned(),
        github_user_name: "alice".to_owned(),
        name: "notifier1".to_owned(),
        region: "us-east1".to_owned(),
        notifier_image: "us-east1-docker.pkg.dev/gcb-release/cloud-build-notifiers/slack:latest"
            .to_owned(),
    }
}

fn cleanup_options() -> CleanupOptions {
    CleanupOptions {
        project_id: "demo".to_owned(),
        name: "notifier1".to_owned(),
        region: "us-east1".to_owned(),
        service_account_key: None,
    }
}

async fn provisioned() -> (MockCloud, CloudServices) {
    let mock = MockCloud::new().with_project("demo", "123456789");
    let services = mock.clone().into_services();
    let report = run_setup(&services, &demo_config(), FailurePolicy::Strict).await;
    assert!(report.is_success());
    (mock, services)
}

#[tokio::test]
async fn cleanup_removes_everything_setup_created() {
    let (mock, services) = provisioned().await;

    let report = run_cleanup(&services, &cleanup_options(), FailurePolicy::BestEffort).await;
    assert!(report.is_success(), "report: {report:?}");
    assert_eq!(report.steps().len(), 6);

    let state = mock.state();
    assert!(state.services.is_empty());
    assert!(state.subscriptions.is_empty());
    assert!(state.topics.get("demo").unwrap().is_empty());
    assert!(state.service_accounts.get("demo").unwrap().is_empty());
    assert!(state.buckets.is_empty());
    assert!(state.secrets.is_empty());
}

#[tokio::test]
async fn cleanup_refuses_foreign_service() {
    let (mock, services) = provisioned().await;

    // Replace the ownership label with another creator.
    let service_name = "projects/demo/locations/us-east1/services/notifier1";
    mock.state()
        .services
        .get_mut(service_name)
        .unwrap()
        .labels
        .insert("creator".to_owned(), "someone-else".to_owned());
    // Any delete attempt on the service would fail loudly.
    mock.deny("delete_service");

    let report = run_cleanup(&services, &cleanup_options(), FailurePolicy::BestEffort).await;
    assert!(!report.is_success());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "remove-notifier");
    assert_eq!(failures[0].1.kind, ErrorKind::Refused);

    // The service is untouched; everything else was still cleaned up.
    let state = mock.state();
    assert!(state.services.contains_key(service_name));
    assert!(state.buckets.is_empty());
    assert!(state.secrets.is_empty());
}

#[tokio::test]
async fn cleanup_treats_missing_service_as_success() {
    let (mock, services) = provisioned().await;
    let service_name = "projects/demo/locations/us-east1/services/notifier1";
    mock.state().services.remove(service_name);

    let report = run_cleanup(&services, &cleanup_options(), FailurePolicy::BestEffort).await;
    assert!(report.is_success());
}

#[tokio::test]
async fn cleanup_surfaces_missing_topic_and_subscription() {
    // Nothing was provisioned: messaging deletes are hard errors, the other
    // adapters swallow absence.
    let mock = MockCloud::new().with_project("demo", "123456789");
    let services = mock.clone().into_services();

    let report = run_cleanup(&services, &cleanup_options(), FailurePolicy::BestEffort).await;
    assert!(!report.is_success());

    let failed: Vec<&str> = report.failures().map(|(step, _)| step).collect();
    assert_eq!(failed, vec!["remove-subscription", "remove-topic"]);
    for (_, error) in report.failures() {
        assert_eq!(error.kind, ErrorKind::NotFound);
    }

    // Remaining deletions still completed.
    assert!(
        report
            .steps()
            .iter()
            .filter(|s| s.step == "remove-bucket" || s.step == "remove-secret")
            .all(|s| matches!(s.outcome, StepOutcome::Completed))
    );
}

#[tokio::test]
async fn strict_cleanup_stops_at_first_failure() {
    let mock = MockCloud::new().with_project("demo", "123456789");
    let services = mock.clone().into_services();

    let report = run_cleanup(&services, &cleanup_options(), FailurePolicy::Strict).await;
    assert!(!report.is_success());
    // remove-notifier succeeds (absent service), remove-subscription fails.
    assert_eq!(report.steps().len(), 2);
}
