use std::sync::Arc;

use anyhow::Context;
use mailform_templates_contracts::{
    RenderedTemplate, Template, TemplateService, BASE_TEMPLATE, TEMPLATES,
};
use tera::Tera;

#[derive(Debug, Clone)]
pub struct TemplateServiceImpl {
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl TemplateServiceImpl {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_template("base", BASE_TEMPLATE)
            .context("Failed to load base template")?;

        for &(name, text, html) in TEMPLATES {
            tera.add_raw_template(&text_name(name), text)
                .with_context(|| format!("Failed to load text template {name}"))?;
            tera.add_raw_template(&html_name(name), html)
                .with_context(|| format!("Failed to load html template {name}"))?;
        }

        Ok(Self {
            state: State(tera.into()),
        })
    }
}

// No `.html` suffix, so tera does not escape a second time.
fn text_name(name: &str) -> String {
    format!("{name}:text")
}

fn html_name(name: &str) -> String {
    format!("{name}:html")
}

impl TemplateService for TemplateServiceImpl {
    #[tracing::instrument(skip_all, fields(template = T::NAME))]
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<RenderedTemplate> {
        let context = tera::Context::from_serialize(template)?;
        let text = self.state.0.render(&text_name(T::NAME), &context)?;
        let html = self.state.0.render(&html_name(T::NAME), &context)?;
        Ok(RenderedTemplate { text, html })
    }
}
