use crate::error::AgrisightError;

pub trait TemplateEngine {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, AgrisightError>;
}
