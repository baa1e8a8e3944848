//! Notifier pipeline configuration document.

/// Source of the `{name}-config.yaml` artifact.
pub const CONFIG_TEMPLATE: &str = r"apiVersion: cloud-build-notifiers/v1
kind: SlackNotifier
metadata:
  name: {{ name }}
spec:
  notification:
    filter: build.status in [Build.Status.SUCCESS, Build.Status.FAILURE, Build.Status.TIMEOUT]
    delivery:
      webhookUrl:
        secretRef: {{ secret_name }}
    template:
      type: golang
      uri: {{ template_uri | safe }}
  secrets:
    - name: {{ secret_name }}
      value: projects/{{ project_id }}/secrets/{{ secret_name }}/versions/latest
";
