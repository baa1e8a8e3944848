//! End-to-end setup workflow scenarios against the in-memory mock provider.

use notifier_core::mock::MockCloud;
use notifier_core::options::SetupConfig;
use notifier_core::workflow::{FailurePolicy, StepOutcome, run_setup};
use notifier_core::{CloudServices, names};

const WEBHOOK_URL: &str = "https://hooks.slack.com/services/T000/B000/abc123";

fn demo_config() -> SetupConfig {
    SetupConfig {
        project_id: "demo".to_owned(),
        slack_webhook_url: WEBHOOK_URL.to_owned(),
        github_user_name: "alice".to_owned(),
        name: "notifier1".to_owned(),
        region: "us-east1".to_owned(),
        notifier_image: "us-east1-docker.pkg.dev/gcb-release/cloud-build-notifiers/slack:latest"
            .to_owned(),
    }
}

fn demo_services() -> (MockCloud, CloudServices) {
    let mock = MockCloud::new().with_project("demo", "123456789");
    let services = mock.clone().into_services();
    (mock, services)
}

#[tokio::test]
async fn setup_provisions_all_resources() {
    let (mock, services) = demo_services();
    let config = demo_config();

    let report = run_setup(&services, &config, FailurePolicy::Strict).await;
    assert!(report.is_success(), "report: {report:?}");
    assert_eq!(report.steps().len(), 7);
    assert!(
        report
            .steps()
            .iter()
            .all(|s| matches!(s.outcome, StepOutcome::Completed))
    );

    let state = mock.state();

    // Required APIs enabled.
    let enabled = state.enabled_services.get("demo").unwrap();
    for service in names::REQUIRED_SERVICES {
        assert!(enabled.contains(service), "{service} not enabled");
    }

    // Secret with one version holding the webhook URL, accessor set to the
    // compute default service account.
    let secret = state
        .secrets
        .get("projects/demo/secrets/notifier1-slack-webhook")
        .expect("secret created");
    assert_eq!(secret.versions, vec![WEBHOOK_URL.as_bytes().to_vec()]);
    assert_eq!(
        secret.accessors,
        vec!["serviceAccount:123456789-compute@developer.gserviceaccount.com".to_owned()]
    );

    // Bucket with both rendered artifacts.
    let bucket = state
        .buckets
        .get("demo-notifier1-config")
        .expect("bucket created");
    assert_eq!(bucket.objects.len(), 2);
    let template = bucket.objects.get("notifier1-template.json").unwrap();
    assert_eq!(template.content_type, "application/json");
    let rendered = String::from_utf8(template.content.clone()).unwrap();
    assert!(rendered.contains("https://github.com/alice/"));
    serde_json::from_str::<serde_json::Value>(&rendered).expect("template is valid JSON");

    let config_object = bucket.objects.get("notifier1-config.yaml").unwrap();
    assert_eq!(config_object.content_type, "application/x-yaml");
    let rendered = String::from_utf8(config_object.content.clone()).unwrap();
    serde_yaml::from_str::<serde_yaml::Value>(&rendered).expect("config is valid YAML");
    assert!(rendered.contains("secretRef: notifier1-slack-webhook"));
    assert!(rendered.contains("gs://demo-notifier1-config/notifier1-template.json"));

    // Deployed service with config path and project id env vars.
    let service_name = "projects/demo/locations/us-east1/services/notifier1";
    let service = state.services.get(service_name).expect("service deployed");
    assert_eq!(service.label("creator"), Some("cloud-build-notifier"));

    let container = state.containers.get(service_name).unwrap();
    let env: Vec<(&str, &str)> = container
        .env
        .iter()
        .map(|e| (e.name.as_str(), e.value.as_str()))
        .collect();
    assert!(env.contains(&(
        "CONFIG_PATH",
        "gs://demo-notifier1-config/notifier1-config.yaml"
    )));
    assert!(env.contains(&("PROJECT_ID", "demo")));

    // Topic and push subscription pointed at the deployed endpoint.
    assert!(state.topics.get("demo").unwrap().contains("cloud-builds"));
    let subscription = state
        .subscriptions
        .get("demo/notifier1-subscription")
        .expect("subscription created");
    assert_eq!(subscription.topic_id, "cloud-builds");
    assert_eq!(subscription.push.push_endpoint, service.uri);
    assert_eq!(
        subscription.push.oidc_service_account,
        "cloud-run-pubsub-invoker@demo.iam.gserviceaccount.com"
    );

    // IAM: token creator for the Pub/Sub agent, invoker account and binding.
    let bindings = state.project_bindings.get("demo").unwrap();
    assert!(bindings.iter().any(|b| {
        b.role == "roles/iam.serviceAccountTokenCreator"
            && b.members.contains(
                &"serviceAccount:service-123456789@gcp-sa-pubsub.iam.gserviceaccount.com"
                    .to_owned(),
            )
    }));
    assert!(
        state
            .service_accounts
            .get("demo")
            .unwrap()
            .contains("cloud-run-pubsub-invoker")
    );
    assert!(
        state.invokers.get(service_name).unwrap().contains(
            &"serviceAccount:cloud-run-pubsub-invoker@demo.iam.gserviceaccount.com".to_owned()
        )
    );
}

#[tokio::test]
async fn setup_is_idempotent() {
    let (mock, services) = demo_services();
    let config = demo_config();

    let first = run_setup(&services, &config, FailurePolicy::Strict).await;
    assert!(first.is_success());
    let second = run_setup(&services, &config, FailurePolicy::Strict).await;
    assert!(second.is_success());

    let state = mock.state();
    assert_eq!(state.buckets.len(), 1);
    assert_eq!(state.services.len(), 1);
    assert_eq!(state.secrets.len(), 1);
    assert_eq!(state.subscriptions.len(), 1);
}

#[tokio::test]
async fn strict_setup_short_circuits_on_failure() {
    let (mock, services) = demo_services();
    mock.deny("ensure_bucket");

    let report = run_setup(&services, &demo_config(), FailurePolicy::Strict).await;
    assert!(!report.is_success());
    // resolve, enable, secret, then the failed upload step; nothing after.
    assert_eq!(report.steps().len(), 4);
    assert!(matches!(
        report.steps().last().unwrap().outcome,
        StepOutcome::Failed(_)
    ));

    let state = mock.state();
    assert!(state.services.is_empty(), "deploy must not have run");
    assert!(state.subscriptions.is_empty());
}

#[tokio::test]
async fn best_effort_setup_records_and_continues() {
    let (mock, services) = demo_services();
    mock.deny("ensure_bucket");

    let report = run_setup(&services, &demo_config(), FailurePolicy::BestEffort).await;
    assert!(!report.is_success());
    assert_eq!(report.steps().len(), 7);

    // Steps depending on the config artifact are skipped, not failed.
    let outcomes: Vec<&StepOutcome> = report.steps().iter().map(|s| &s.outcome).collect();
    assert!(matches!(outcomes[3], StepOutcome::Failed(_)));
    assert!(matches!(outcomes[4], StepOutcome::Skipped(_)));
    assert!(matches!(outcomes[5], StepOutcome::Skipped(_)));
    assert!(matches!(outcomes[6], StepOutcome::Skipped(_)));

    let state = mock.state();
    assert!(state.services.is_empty());
}

#[tokio::test]
async fn setup_skips_enable_when_all_apis_enabled() {
    let (mock, services) = demo_services();
    mock.state()
        .enabled_services
        .entry("demo".to_owned())
        .or_default()
        .extend(names::REQUIRED_SERVICES.iter().map(|s| (*s).to_owned()));
    mock.deny("batch_enable");

    let report = run_setup(&services, &demo_config(), FailurePolicy::Strict).await;
    assert!(report.is_success(), "batch enable must not be called");
}
