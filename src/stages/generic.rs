//! Renderer for stages that only report `key: value` parameters and outputs.

use serde::Serialize;

use crate::document::StageReport;
use crate::errors::Error;
use crate::render::RenderContext;
use crate::templates::TemplateKind;
use crate::utils::display::nice_params;
use crate::utils::display::DisplayEntry;

#[derive(Serialize)]
struct GenericContext<'a> {
    name: &'a str,
    anchor: &'a str,
    parameters: Vec<DisplayEntry>,
    output: Vec<DisplayEntry>,
}

/// Renders the parameters and outputs of `report` with `template`.
pub fn render(
    template: TemplateKind,
    report: &StageReport,
    anchor: &str,
    context: &RenderContext,
) -> Result<String, Error> {
    let generic = GenericContext {
        name: &report.name,
        anchor,
        parameters: nice_params(&report.parameters),
        output: nice_params(&report.output),
    };

    context.templates().render(template, &generic)
}
