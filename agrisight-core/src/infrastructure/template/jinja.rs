// agrisight-core/src/infrastructure/template/jinja.rs

// Renders the HTML dashboard. Every template is treated as HTML, so text
// coming from survey files (region names, agent ids) is escaped.

use minijinja::{AutoEscape, Environment, Value};

use crate::application::ports::TemplateEngine;
use crate::domain::kpi::{display_rate, display_usd};
use crate::error::AgrisightError;
use crate::infrastructure::error::InfrastructureError;

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        // Formatter output is markup-safe ("n/a" must not become "n&#x2f;a").
        env.add_filter("usd", |amount: Option<f64>| {
            Value::from_safe_string(amount.map(display_usd).unwrap_or_else(|| "n/a".into()))
        });
        env.add_filter("pct", |rate: Option<f64>| Value::from_safe_string(display_rate(rate)));
        env.add_filter("thousands", |n: u64| {
            let grouped = display_usd(n as f64);
            Value::from_safe_string(
                grouped
                    .trim_start_matches('$')
                    .trim_end_matches(".00")
                    .to_string(),
            )
        });

        Self { env }
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, AgrisightError> {
        self.env
            .render_str(template, context)
            .map_err(|e| AgrisightError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
