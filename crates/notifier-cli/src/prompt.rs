//! Interactive prompts for options not supplied as flags.

use anyhow::Context;
use dialoguer::{Confirm, Input, Select};
use notifier_core::options::{SetupConfig, SetupOptions, is_slack_webhook_url};
use notifier_core::provider::CloudServices;

/// Fills the missing required setup options interactively and asks for a
/// final confirmation.
///
/// Defaulted options (name, region, image) are prompted with their current
/// value prefilled; accepting the prompt keeps it.
///
/// Returns `None` when the user declines the confirmation.
pub async fn complete_setup(
    services: &CloudServices,
    mut options: SetupOptions,
) -> anyhow::Result<Option<SetupConfig>> {
    if options.project_id.as_deref().is_none_or(str::is_empty) {
        options.project_id = Some(select_project(services).await?);
    }

    options.name = Input::new()
        .with_prompt("Notifier name")
        .default(options.name)
        .interact_text()?;
    options.region = Input::new()
        .with_prompt("Deployment region")
        .default(options.region)
        .interact_text()?;
    options.notifier_image = Input::new()
        .with_prompt("Notifier container image")
        .default(options.notifier_image)
        .interact_text()?;

    let webhook_valid = options
        .slack_webhook_url
        .as_deref()
        .is_some_and(is_slack_webhook_url);
    if !webhook_valid {
        let url = Input::<String>::new()
            .with_prompt("Slack Incoming Webhook url")
            .validate_with(|input: &String| {
                if is_slack_webhook_url(input) {
                    Ok(())
                } else {
                    Err("Slack webhook url is invalid")
                }
            })
            .interact_text()?;
        options.slack_webhook_url = Some(url);
    }

    if options.github_user_name.as_deref().is_none_or(str::is_empty) {
        let user = Input::<String>::new()
            .with_prompt("GitHub user or organization owning the built repositories")
            .validate_with(|input: &String| {
                if input.trim().is_empty() {
                    Err("a name is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        options.github_user_name = Some(user);
    }

    let config = options
        .validate()
        .map_err(|errors| anyhow::anyhow!("invalid options: {errors:?}"))?;

    let confirmed = Confirm::new()
        .with_prompt(confirm_summary(&config))
        .default(false)
        .interact()?;

    Ok(confirmed.then_some(config))
}

/// Lets the user pick a project from the active projects visible to the
/// authenticated account.
async fn select_project(services: &CloudServices) -> anyhow::Result<String> {
    let projects = services
        .projects
        .list_active_projects()
        .await
        .context("failed to list projects")?;
    anyhow::ensure!(
        !projects.is_empty(),
        "no active projects are visible to this service account"
    );

    let items: Vec<String> = projects
        .iter()
        .map(|project| format!("{} ({})", project.display_name, project.project_id))
        .collect();
    let index = Select::new()
        .with_prompt("Select the project to deploy the notifier to")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(projects[index].project_id.clone())
}

/// Final confirmation line, echoing every collected choice back.
fn confirm_summary(config: &SetupConfig) -> String {
    format!(
        "Deploy notifier \"{}\" ({}) to project \"{}\" in {}?",
        config.name, config.notifier_image, config.project_id, config.region
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_echoes_every_choice() {
        let config = SetupConfig {
            project_id: "demo".to_owned(),
            slack_webhook_url: "https://hooks.slack.com/services/T000/B000/abc123".to_owned(),
            github_user_name: "alice".to_owned(),
            name: "notifier1".to_owned(),
            region: "us-east1".to_owned(),
            notifier_image: "gcr.io/example/slack:latest".to_owned(),
        };

        let summary = confirm_summary(&config);
        assert!(summary.contains("notifier1"));
        assert!(summary.contains("demo"));
        assert!(summary.contains("us-east1"));
        assert!(summary.contains("gcr.io/example/slack:latest"));
    }
}
