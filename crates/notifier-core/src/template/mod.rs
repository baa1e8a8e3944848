//! Rendering of the two notifier config artifacts.
//!
//! Rendering is a pure string-to-string substitution with HTML/JSON-safe
//! escaping enabled; template sources mark provider-side placeholders and
//! generated URIs with the `safe` filter where escaping must stay off.

mod config;
mod message;

pub use config::CONFIG_TEMPLATE;
pub use message::MESSAGE_TEMPLATE;
use tera::{Context, Tera};

use crate::{Error, Result};

/// Renders a template string with the given context, escaping enabled.
///
/// # Errors
///
/// Returns a serialization error when the template or context is invalid.
pub fn render(template: &str, context: &Context) -> Result<String> {
    Tera::one_off(template, context, true)
        .map_err(|e| Error::from_source(crate::ErrorKind::Serialization, e)
            .with_message("template rendering failed"))
}

/// Renders the Slack message layout for the given GitHub user.
pub fn render_message(github_user_name: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("github_user_name", github_user_name);
    render(MESSAGE_TEMPLATE, &context)
}

/// Renders the notifier pipeline config.
///
/// `template_uri` is the object-store locator of the rendered message
/// layout; `secret_name` is the secret id referenced by the delivery block.
pub fn render_config(
    name: &str,
    secret_name: &str,
    project_id: &str,
    template_uri: &str,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("name", name);
    context.insert("secret_name", secret_name);
    context.insert("project_id", project_id);
    context.insert("template_uri", template_uri);
    render(CONFIG_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_renders_as_json() {
        let rendered = render_message("alice").unwrap();
        let blocks: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(blocks.is_array());
        assert_eq!(blocks.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_message_embeds_github_user() {
        let rendered = render_message("alice").unwrap();
        assert!(rendered.contains("https://github.com/alice/"));
    }

    #[test]
    fn test_message_keeps_build_placeholders() {
        let rendered = render_message("alice").unwrap();
        assert!(rendered.contains("{{.Build.Status}}"));
        assert!(rendered.contains("{{.Build.LogUrl}}"));
        // No unrendered template expressions besides the Go placeholders.
        assert!(!rendered.contains("github_user_name"));
    }

    #[test]
    fn test_config_references_secret_and_template() {
        let rendered = render_config(
            "notifier1",
            "notifier1-slack-webhook",
            "demo",
            "gs://demo-notifier1-config/notifier1-template.json",
        )
        .unwrap();

        assert!(rendered.contains("name: notifier1"));
        assert!(rendered.contains("secretRef: notifier1-slack-webhook"));
        assert!(rendered.contains("uri: gs://demo-notifier1-config/notifier1-template.json"));
        assert!(
            rendered.contains("projects/demo/secrets/notifier1-slack-webhook/versions/latest")
        );
    }
}
