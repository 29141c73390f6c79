//! Renderer for the `PerBaseQuality` stage: one chart per read end.

use serde::Serialize;

use crate::document::StageReport;
use crate::errors::Error;
use crate::plot::per_base_quality::PerBaseQualityChart;
use crate::plot::RenderedChart;
use crate::quality::QualityHistogram;
use crate::render::RenderContext;
use crate::templates::TemplateKind;
use crate::utils::display::nice_params;
use crate::utils::display::CountFormat;
use crate::utils::display::DisplayEntry;

/// Output key holding the read 1 quality histogram.
pub const R1_KEY: &str = "r1_phred_scores";

/// Output key holding the read 2 quality histogram, if paired.
pub const R2_KEY: &str = "r2_phred_scores";

/// A chart together with what the template shows alongside it.
#[derive(Debug, Serialize)]
struct ReadChart {
    id: String,
    #[serde(flatten)]
    chart: RenderedChart,
    positions: usize,
    max_depth: String,
}

#[derive(Serialize)]
struct PerBaseQualityContext<'a> {
    name: &'a str,
    anchor: &'a str,
    parameters: Vec<DisplayEntry>,
    paired: bool,
    r1: &'a ReadChart,
    r2: Option<&'a ReadChart>,
    reads: Vec<&'a ReadChart>,
}

fn render_read(
    chart: &PerBaseQualityChart<'_>,
    histogram: &QualityHistogram,
    key: &str,
    name: &str,
    id: String,
) -> Result<ReadChart, Error> {
    let rendered = chart.render(histogram, name).map_err(|e| match e {
        Error::MissingData(message) => Error::MissingData(format!("`{}`: {}", key, message)),
        e => e,
    })?;

    Ok(ReadChart {
        id,
        chart: rendered,
        positions: histogram.len(),
        max_depth: CountFormat(histogram.max_depth()).to_string(),
    })
}

/// Renders the quality charts of `report`. A second chart is produced when
/// the stage output has a non-empty read 2 histogram.
pub fn render(report: &StageReport, anchor: &str, context: &RenderContext) -> Result<String, Error> {
    let r1 = report
        .histogram(R1_KEY)?
        .ok_or_else(|| Error::MissingData(format!("stage output has no `{}`", R1_KEY)))?;
    let r2 = report.histogram(R2_KEY)?;
    let paired = r2.is_some();

    let chart = PerBaseQualityChart::new(context.chart_settings(), context.rasterizer());

    let r1_name = if paired {
        format!("{} (R1)", report.name)
    } else {
        report.name.clone()
    };
    let r1 = render_read(&chart, &r1, R1_KEY, &r1_name, format!("{}-r1", anchor))?;

    let r2 = match r2 {
        Some(histogram) => {
            let r2_name = format!("{} (R2)", report.name);
            Some(render_read(
                &chart,
                &histogram,
                R2_KEY,
                &r2_name,
                format!("{}-r2", anchor),
            )?)
        }
        None => None,
    };

    let mut reads = vec![&r1];
    reads.extend(r2.as_ref());

    let quality = PerBaseQualityContext {
        name: &report.name,
        anchor,
        parameters: nice_params(&report.parameters),
        paired,
        r1: &r1,
        r2: r2.as_ref(),
        reads,
    };

    context
        .templates()
        .render(TemplateKind::PerBaseQuality, &quality)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_yaml::Value;

    use super::*;
    use crate::stages::StageKind;

    fn histogram_value(positions: usize) -> Value {
        let text = (0..positions)
            .map(|_| "- {20: 5, 30: 5}")
            .collect::<Vec<_>>()
            .join("\n");
        serde_yaml::from_str(&text).unwrap()
    }

    fn report(r2: Option<Value>) -> StageReport {
        let mut output = IndexMap::from([(String::from(R1_KEY), histogram_value(10))]);
        if let Some(r2) = r2 {
            output.insert(String::from(R2_KEY), r2);
        }

        StageReport {
            kind: StageKind::PerBaseQuality,
            name: String::from("after qc"),
            parameters: IndexMap::new(),
            output,
        }
    }

    #[test]
    fn test_single_end_has_one_chart() {
        let context = RenderContext::with_defaults().unwrap();

        for r2 in [None, Some(Value::Null), Some(Value::Sequence(vec![]))] {
            let html = render(&report(r2), "stage-1", &context).unwrap();

            assert_eq!(html.matches("<img").count(), 1);
            assert!(html.contains("Per-base PHRED Qualities: after qc"));
            assert!(!html.contains("(R1)"));
            assert!(html.contains("id=\"stage-1-r1\""));
            assert!(!html.contains("stage-1-r2"));
        }
    }

    #[test]
    fn test_paired_end_has_two_charts() {
        let context = RenderContext::with_defaults().unwrap();
        let html = render(&report(Some(histogram_value(8))), "stage-1", &context).unwrap();

        assert_eq!(html.matches("<img").count(), 2);
        assert!(html.contains("Per-base PHRED Qualities: after qc (R1)"));
        assert!(html.contains("Per-base PHRED Qualities: after qc (R2)"));
        assert!(html.contains("id=\"stage-1-r2\""));
        assert!(html.contains("Read 2"));
    }

    #[test]
    fn test_median_line_uses_strict_tie_break() {
        let context = RenderContext::with_defaults().unwrap();
        let html = render(&report(None), "stage-1", &context).unwrap();

        let start = html.find("var figure = ").unwrap() + "var figure = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        let figure: serde_json::Value = serde_json::from_str(&html[start..end]).unwrap();

        let median = figure["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|trace| trace["name"] == "median")
            .unwrap();
        assert_eq!(median["y"], serde_json::json!(vec![30; 10]));
        assert_eq!(median["x"], serde_json::json!((1..=10).collect::<Vec<u32>>()));
    }

    #[test]
    fn test_missing_r1_is_missing_data() {
        let context = RenderContext::with_defaults().unwrap();
        let mut report = report(None);
        report.output.clear();

        assert!(matches!(
            render(&report, "stage-1", &context),
            Err(Error::MissingData(_))
        ));
    }

    #[test]
    fn test_zero_count_position_names_read() {
        let context = RenderContext::with_defaults().unwrap();
        let mut report = report(None);
        report.output.insert(
            String::from(R2_KEY),
            serde_yaml::from_str("- {30: 1}\n- {30: 0}").unwrap(),
        );

        let err = render(&report, "stage-1", &context).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing data: `r2_phred_scores`: read position 2 has no observed reads"
        );
    }
}
