use anyhow::{Context, Result};
use handlebars::Handlebars;
use log::{debug, warn};
use serde_json::Value;

use crate::json::read_params;
use crate::output::Sink;
use crate::paths::{output_targets, template_set, OutputTarget};
use crate::{Source, TemplateContext};

pub fn registry(strict: bool) -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(strict);
    handlebars
}

/// Loads the data once, then renders every template to the output target.
pub fn run(ctx: &TemplateContext) -> Result<()> {
    let params = read_params(&ctx.data)?;
    let templates = template_set(&ctx.template_path, &ctx.template_token)?;
    if templates.is_empty() {
        warn!(
            "There are no template file(s) matching '{}' in '{}'",
            ctx.template_token, ctx.template_path
        );
    }
    debug!("templates: {:?}", templates);

    let jobs = output_targets(&ctx.output_path, templates, &ctx.template_token)?;
    debug!("outputs: {:?}", jobs);

    let mut handlebars = registry(ctx.strict);
    let mut sink = Sink::new();
    render(&mut handlebars, &jobs, &params, |template, target, rendered| {
        sink.write(template, target, rendered)
    })?;
    sink.finish()
}

/// Renders each template in order and hands the trimmed result to `out`.
///
/// Template bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn render<F: FnMut(&Source, &OutputTarget, &str) -> Result<()>>(
    handlebars: &mut Handlebars<'static>,
    jobs: &[(Source, OutputTarget)],
    params: &Value,
    mut out: F,
) -> Result<()> {
    for (template, target) in jobs {
        debug!("rendering template: {}", template);
        let bytes = template
            .read()
            .with_context(|| format!("Error reading template {}", template))?;
        let text = String::from_utf8_lossy(&bytes);
        let rendered = render_template(handlebars, &template.to_string(), &text, params)?;
        out(template, target, rendered.trim())?;
    }
    Ok(())
}

fn render_template(
    handlebars: &mut Handlebars<'static>,
    name: &str,
    text: &str,
    params: &Value,
) -> Result<String> {
    handlebars
        .register_template_string(name, text)
        .with_context(|| format!("Failed to parse template: {}", name))?;
    handlebars
        .render(name, params)
        .with_context(|| format!("Failed to render template: {}", name))
}
