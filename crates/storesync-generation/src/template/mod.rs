//! Campaign templates, rendered with Handlebars.
//!
//! Supported syntax is plain Handlebars: `{{ name }}`,
//! `{{#if name}}…{{else}}…{{/if}}`, `{{#unless name}}…{{/unless}}` and
//! `{{! comment }}`, plus a `default` helper for fallbacks:
//! `{{default tagline "Fresh deals"}}`. Output is never HTML-escaped.
//!
//! One template, two rendering policies: [`RenderMode::Strict`] fails on the
//! first unresolved variable it renders, [`RenderMode::Lenient`] renders it
//! empty. Conditions on undefined variables are false.

use std::collections::BTreeSet;

use handlebars::template::{HelperTemplate, Parameter, Template as Compiled, TemplateElement};
use handlebars::{
    no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
    RenderErrorReason,
};
use serde_json::Value;

use storesync_core::errors::TemplateError;
use storesync_core::models::{CampaignTemplate, ContextMap, TemplateValidation};

const TEMPLATE_NAME: &str = "campaign";

/// How unresolved variables are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Strict,
    Lenient,
}

impl RenderMode {
    fn engine(self) -> Handlebars<'static> {
        let mut hb = Handlebars::new();
        hb.set_strict_mode(self == Self::Strict);
        hb.register_escape_fn(no_escape);
        hb.register_helper("default", Box::new(default_helper));
        hb
    }
}

/// A compiled template.
#[derive(Debug, Clone)]
pub struct Template {
    compiled: Compiled,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let compiled = Compiled::compile(source).map_err(|e| TemplateError::Syntax {
            message: e.to_string(),
        })?;
        Ok(Self { compiled })
    }

    /// Render against `context`. Output is trimmed.
    pub fn render(&self, context: &ContextMap, mode: RenderMode) -> Result<String, TemplateError> {
        let mut engine = mode.engine();
        engine.register_template(TEMPLATE_NAME, self.compiled.clone());
        let rendered = engine
            .render(TEMPLATE_NAME, context)
            .map_err(render_error)?;
        Ok(rendered.trim().to_string())
    }

    /// Every variable referenced by the template, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_elements(&self.compiled.elements, &mut names);
        names
    }
}

fn render_error(e: RenderError) -> TemplateError {
    match e.reason() {
        RenderErrorReason::MissingVariable(path) => TemplateError::UndefinedVariable {
            name: path.clone().unwrap_or_default(),
        },
        _ => TemplateError::Syntax {
            message: e.to_string(),
        },
    }
}

/// `{{default value "fallback"}}`: `value` unless it is undefined or null.
fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let chosen = h
        .param(0)
        .filter(|p| !p.is_value_missing() && !p.value().is_null())
        .or_else(|| h.param(1));
    if let Some(param) = chosen {
        out.write(&scalar_text(param.value()))?;
    }
    Ok(())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn collect_elements(elements: &[TemplateElement], names: &mut BTreeSet<String>) {
    for element in elements {
        match element {
            TemplateElement::Expression(ht)
            | TemplateElement::HtmlExpression(ht)
            | TemplateElement::HelperBlock(ht) => collect_helper(ht, names),
            _ => {}
        }
    }
}

fn collect_helper(ht: &HelperTemplate, names: &mut BTreeSet<String>) {
    // A bare `{{ name }}` is a lookup; otherwise `name` is the helper.
    if ht.params.is_empty() && !ht.block {
        insert_name(&ht.name, names);
    }
    for param in &ht.params {
        insert_name(param, names);
    }
    for branch in [&ht.template, &ht.inverse].into_iter().flatten() {
        collect_elements(&branch.elements, names);
    }
}

fn insert_name(param: &Parameter, names: &mut BTreeSet<String>) {
    if let Parameter::Name(_) | Parameter::Path(_) = param {
        if let Some(name) = param.as_name() {
            names.insert(name.to_string());
        }
    }
}

/// Parse and render in one step.
pub fn render(source: &str, context: &ContextMap, mode: RenderMode) -> Result<String, TemplateError> {
    Template::parse(source)?.render(context, mode)
}

/// Variables referenced by `source`, sorted.
pub fn extract_variables(source: &str) -> Result<Vec<String>, TemplateError> {
    Ok(Template::parse(source)?.variables().into_iter().collect())
}

/// Syntax check plus referenced variables. Never fails.
pub fn validate(source: &str) -> TemplateValidation {
    match Template::parse(source) {
        Ok(template) => TemplateValidation {
            valid: true,
            variables: template.variables().into_iter().collect(),
            error: None,
        },
        Err(e) => TemplateValidation {
            valid: false,
            variables: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

/// Declared required variables of `template` that `context` does not provide.
pub fn missing_required_variables(template: &CampaignTemplate, context: &ContextMap) -> Vec<String> {
    template
        .required_variables
        .iter()
        .filter(|name| !context.contains_key(name.as_str()))
        .cloned()
        .collect()
}
