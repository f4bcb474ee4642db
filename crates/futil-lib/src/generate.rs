//! Generation engine: parse a template, render it against a context.

use tracing::{debug, trace};

use crate::Result;
use crate::context::GenerationContext;
use crate::helpers::Helpers;
use crate::template::Template;

/// Render `template` against `context` with the standard helpers.
pub fn generate(context: &GenerationContext, template: &str) -> Result<Vec<u8>> {
    Generator::new().generate(context, template)
}

/// Generation with a custom helper table.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    helpers: Helpers,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn helpers(mut self, helpers: Helpers) -> Self {
        self.helpers = helpers;
        self
    }

    pub fn generate(&self, context: &GenerationContext, template: &str) -> Result<Vec<u8>> {
        let template = Template::parse(template)?;
        debug!(nodes = template.nodes().len(), "parsed template");
        self.render(context, &template)
    }

    /// Execute an already parsed template.
    pub fn render(&self, context: &GenerationContext, template: &Template) -> Result<Vec<u8>> {
        trace!(
            package = context.package_name(),
            types = context.types().len(),
            imports = context.import_paths().len(),
            "rendering"
        );
        let output = template.execute(&context.to_value(), &self.helpers)?;
        debug!(bytes = output.len(), "rendered template");
        Ok(output.into_bytes())
    }
}
