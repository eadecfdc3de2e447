use tera::{Context, Tera};
use thiserror::Error;

use crate::db::entities::server;

const DOWN_ALERT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <body style="font-family: sans-serif; color: #1f2933;">
    <h2 style="color: #c53030;">Your server is down</h2>
    <p>We could not reach <a href="{{ url }}">{{ url }}</a> for {{ consecutive_failures }} consecutive checks.</p>
    <table cellpadding="4">
      <tr><td><strong>Status</strong></td><td>{{ status }}</td></tr>
      <tr><td><strong>Last check</strong></td><td>{{ last_check }}</td></tr>
      <tr><td><strong>Response time</strong></td><td>{{ response_time }} ms</td></tr>
      <tr><td><strong>Error</strong></td><td>{{ error_message }}</td></tr>
    </table>
    <p>You will not receive another alert for this server until it is back online.</p>
  </body>
</html>
"#;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Templating error: {0}")]
    Render(#[from] tera::Error),
}

pub fn down_alert_subject(server: &server::Model) -> String {
    format!("Server down: {}", server.url)
}

/// Renders the HTML body of a down alert. Values are HTML-escaped.
pub fn render_down_alert(
    server: &server::Model,
    error_message: Option<&str>,
) -> Result<String, TemplateError> {
    let mut context = Context::new();
    context.insert("url", &server.url);
    context.insert("status", &server.status.to_string());
    context.insert("consecutive_failures", &server.consecutive_failures);
    context.insert("response_time", &server.response_time);
    context.insert(
        "last_check",
        &server
            .last_check
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string()),
    );
    context.insert("error_message", error_message.unwrap_or("Unknown error"));

    Ok(Tera::one_off(DOWN_ALERT_TEMPLATE, &context, true)?)
}
