//! Assembly of a whole report document into a single HTML page.

pub mod command;

use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::document::Document;
use crate::errors::Error;
use crate::plot::ChartSettings;
use crate::plot::Rasterizer;
use crate::templates::TemplateKind;
use crate::templates::Templates;
use crate::utils::display::nice_params;
use crate::utils::display::DisplayEntry;

/// Default location of the d3 library referenced by the page.
pub const DEFAULT_D3_URL: &str = "https://d3js.org/d3.v7.min.js";

/// Default location of the plotly.js library referenced by the page.
pub const DEFAULT_PLOTLY_URL: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// Client-side libraries the page links to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSettings {
    /// URL of the d3 script.
    pub d3_url: String,

    /// URL of the plotly.js script.
    pub plotly_url: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            d3_url: String::from(DEFAULT_D3_URL),
            plotly_url: String::from(DEFAULT_PLOTLY_URL),
        }
    }
}

/// Everything the renderers need, set up once and shared read-only by every
/// render call.
pub struct RenderContext {
    templates: Templates,
    chart_settings: ChartSettings,
    rasterizer: Rasterizer,
    page: PageSettings,
}

impl RenderContext {
    /// Creates a new [`RenderContext`].
    pub fn new(templates: Templates, chart_settings: ChartSettings, page: PageSettings) -> Self {
        Self {
            templates,
            chart_settings,
            rasterizer: Rasterizer::new(),
            page,
        }
    }

    /// A context with the built-in templates and default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Ok(Self::new(
            Templates::embedded()?,
            ChartSettings::default(),
            PageSettings::default(),
        ))
    }

    /// The loaded templates.
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// The size of the static chart images.
    pub fn chart_settings(&self) -> ChartSettings {
        self.chart_settings
    }

    /// The SVG rasterizer for static chart images.
    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// The client-side library locations.
    pub fn page(&self) -> &PageSettings {
        &self.page
    }
}

/// One rendered stage of the page.
#[derive(Debug, Serialize)]
pub struct RenderedStage {
    /// The stage-type tag.
    pub kind: String,

    /// The display name of the stage.
    pub name: String,

    /// The element id of the fragment.
    pub anchor: String,

    /// The HTML fragment.
    pub fragment: String,
}

#[derive(Serialize)]
struct MetadataContext {
    metadata: Vec<DisplayEntry>,
}

#[derive(Serialize)]
struct RootContext<'a> {
    metadata_div: String,
    reports: Vec<RenderedStage>,
    report_names: Vec<&'a str>,
    d3: &'a str,
    plotly: &'a str,
}

/// Renders every stage of `document`, in order.
///
/// Stops at the first stage that fails; the error names that stage.
pub fn render_stages(
    document: &Document,
    context: &RenderContext,
) -> Result<Vec<RenderedStage>, Error> {
    document
        .stages
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let anchor = format!("stage-{}", i + 1);
            debug!("  [*] Rendering {} \"{}\".", report.kind, report.name);

            let fragment = report
                .kind
                .render(report, &anchor, context)
                .map_err(|e| e.in_stage(report.kind.tag(), &report.name))?;

            Ok(RenderedStage {
                kind: report.kind.tag().to_string(),
                name: report.name.clone(),
                anchor,
                fragment,
            })
        })
        .collect()
}

/// Renders `document` into a complete HTML page.
pub fn render_document(document: &Document, context: &RenderContext) -> Result<String, Error> {
    let metadata_div = context.templates().render(
        TemplateKind::Metadata,
        &MetadataContext {
            metadata: nice_params(&document.metadata),
        },
    )?;

    let reports = render_stages(document, context)?;
    info!("  [*] Rendered {} stage(s).", reports.len());

    let report_names = document.stages.iter().map(|s| s.name.as_str()).collect();

    context.templates().render(
        TemplateKind::Root,
        &RootContext {
            metadata_div,
            reports,
            report_names,
            d3: &context.page().d3_url,
            plotly: &context.page().plotly_url,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StageReport;
    use crate::stages::StageKind;

    fn quality_section(name: &str) -> String {
        let positions = (0..10)
            .map(|_| "        - {20: 5, 30: 5}")
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "- PerBaseQuality:\n    name: {}\n    parameters: {{}}\n    output:\n      r1_phred_scores:\n{}\n      r2_phred_scores: []\n",
            name, positions
        )
    }

    fn document() -> Document {
        let text = format!(
            "- QCPP:\n    version: 0.2.1\n    pipeline_step: gbsqc\n{}- AdaptorTrimPE:\n    name: trim or merge reads\n    parameters: {{min_overlap: 10}}\n    output: {{num_reads_merged: 3}}\n{}- WindowedQualTrim:\n    name: QC\n    parameters: {{min_quality: 28}}\n    output: {{num_reads_trimmed: 7}}\n",
            quality_section("before qc"),
            quality_section("after qc"),
        );

        Document::from_yaml_str(&text).unwrap()
    }

    #[test]
    fn test_stage_order_is_preserved() {
        let context = RenderContext::with_defaults().unwrap();
        let stages = render_stages(&document(), &context).unwrap();

        assert_eq!(
            stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            ["before qc", "trim or merge reads", "after qc", "QC"]
        );
        assert_eq!(
            stages.iter().map(|s| s.anchor.as_str()).collect::<Vec<_>>(),
            ["stage-1", "stage-2", "stage-3", "stage-4"]
        );
    }

    #[test]
    fn test_render_document() {
        let context = RenderContext::with_defaults().unwrap();
        let html = render_document(&document(), &context).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(DEFAULT_D3_URL));
        assert!(html.contains(DEFAULT_PLOTLY_URL));
        assert!(html.contains("Pipeline Step"));
        assert_eq!(html.matches("<img").count(), 2);

        let positions = ["before qc", "trim or merge reads", "after qc", "QC</h2>"]
            .iter()
            .map(|name| html.find(&format!("<h2>{}", name)).unwrap())
            .collect::<Vec<_>>();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let metadata = html.find("id=\"metadata\"").unwrap();
        assert!(metadata < positions[0]);

        assert!(html.contains(
            "<p class=\"pipeline\">before qc &rarr; trim or merge reads &rarr; after qc &rarr; QC</p>"
        ));
    }

    #[test]
    fn test_pipeline_names_are_escaped() {
        let context = RenderContext::with_defaults().unwrap();
        let document = Document::from_yaml_str(
            "- QCPP: {}\n- WindowedQualTrim:\n    name: a<b\n    parameters: {}\n    output: {}\n- WindowedQualTrim:\n    name: c\n    parameters: {}\n    output: {}\n",
        )
        .unwrap();

        let html = render_document(&document, &context).unwrap();
        assert!(html.contains("<p class=\"pipeline\">a&lt;b &rarr; c</p>"));
    }

    #[test]
    fn test_nested_metadata_is_readable() {
        let context = RenderContext::with_defaults().unwrap();
        let document = Document::from_yaml_str(
            "- QCPP:\n    version: 0.2.1\n    config:\n      min_quality: 28\n      adaptors: [AGATCGGAAG, CTGTCTCTTA]\n",
        )
        .unwrap();

        let html = render_document(&document, &context).unwrap();
        assert!(html.contains(
            "<tr><th>Config</th><td>{min_quality: 28, adaptors: [AGATCGGAAG, CTGTCTCTTA]}</td></tr>"
        ));
        assert!(!html.contains("[object]"));
    }

    #[test]
    fn test_failing_stage_aborts_with_its_name() {
        let context = RenderContext::with_defaults().unwrap();
        let mut document = document();
        document.stages.push(StageReport {
            kind: StageKind::PerBaseQuality,
            name: String::from("broken"),
            parameters: Default::default(),
            output: Default::default(),
        });

        let err = render_document(&document, &context).unwrap_err();
        match err {
            Error::Stage { tag, name, source } => {
                assert_eq!(tag, "PerBaseQuality");
                assert_eq!(name, "broken");
                assert!(matches!(*source, Error::MissingData(_)));
            }
            e => panic!("unexpected error: {}", e),
        }
    }
}
