//! Per-base quality chart: the median quality at each read position,
//! surrounded by shaded percentile ranges.

use plotly::common::Fill;
use plotly::common::Line;
use plotly::common::Mode;
use plotly::common::TickMode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::layout::Legend;
use plotly::layout::TraceOrder;
use plotly::Layout;
use plotly::Scatter;
use plotters::prelude::*;

use crate::errors::Error;
use crate::plot::ChartSettings;
use crate::plot::Rasterizer;
use crate::plot::RenderedChart;
use crate::quality::PercentileBands;
use crate::quality::PercentileSet;
use crate::quality::QualityHistogram;

const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);

/// Fill of a shaded percentile range.
#[derive(Clone, Copy)]
struct BandStyle {
    color: RGBColor,
    alpha: f64,
}

impl BandStyle {
    fn css(&self) -> String {
        let RGBColor(r, g, b) = self.color;
        format!("rgba({}, {}, {}, {})", r, g, b, self.alpha)
    }
}

/// Styles for the percentile ranges, innermost range first. Ranges beyond
/// the last style reuse it.
const BAND_STYLES: [BandStyle; 2] = [
    BandStyle {
        color: LIGHT_GREEN,
        alpha: 0.7,
    },
    BandStyle {
        color: BLUE,
        alpha: 0.1,
    },
];

fn band_style(range: usize) -> BandStyle {
    BAND_STYLES[range.min(BAND_STYLES.len() - 1)]
}

/// Full title of a per-base quality chart.
pub fn chart_title(name: &str) -> String {
    format!("Per-base PHRED Qualities: {}", name)
}

/// Renders per-base quality charts with a fixed [`PercentileSet`].
pub struct PerBaseQualityChart<'a> {
    settings: ChartSettings,
    rasterizer: &'a Rasterizer,
    percentiles: PercentileSet,
}

impl<'a> PerBaseQualityChart<'a> {
    /// Creates a chart renderer using the standard percentiles.
    pub fn new(settings: ChartSettings, rasterizer: &'a Rasterizer) -> Self {
        Self {
            settings,
            rasterizer,
            percentiles: PercentileSet::standard(),
        }
    }

    /// Renders the chart for one read end in both encodings.
    pub fn render(&self, histogram: &QualityHistogram, name: &str) -> Result<RenderedChart, Error> {
        let bands = PercentileBands::compute(histogram, &self.percentiles)?;
        let title = chart_title(name);

        let svg = draw_svg(&bands, &title, &self.settings)?;
        let png = self.rasterizer.to_png(&svg)?;

        // Keeps a name containing `</script>` from ending the inline script.
        let figure = interactive(&bands, &title).to_json().replace("</", "<\\/");

        Ok(RenderedChart {
            title,
            image: base64::encode(png),
            interactive: figure,
        })
    }
}

/// Draws the static chart as an SVG document.
pub fn draw_svg(
    bands: &PercentileBands,
    title: &str,
    settings: &ChartSettings,
) -> Result<String, Error> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, (settings.width, settings.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(Error::chart)?;

        // A single position still needs a non-empty axis.
        let x_max = (bands.positions() as u32).max(2);
        let y_max = bands.y_upper_bound();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((1u32..x_max).with_key_points(bands.x_ticks()), 1u32..y_max)
            .map_err(Error::chart)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Read Position")
            .y_desc("PHRED score")
            .draw()
            .map_err(Error::chart)?;

        let x = bands.read_positions();
        let ranges = bands.set().ranges();

        // Outermost first, so that narrower ranges are drawn on top.
        for (i, range) in ranges.iter().enumerate().rev() {
            let style = band_style(i);
            let upper = x.iter().copied().zip(bands.values(range.upper).iter().copied());
            let lower = x.iter().copied().zip(bands.values(range.lower).iter().copied());
            let mut outline: Vec<(u32, u32)> = upper.chain(lower.rev()).collect();

            chart
                .draw_series(std::iter::once(Polygon::new(
                    outline.clone(),
                    style.color.mix(style.alpha).filled(),
                )))
                .map_err(Error::chart)?;

            outline.push(outline[0]);
            chart
                .draw_series(std::iter::once(PathElement::new(outline, BLACK.stroke_width(1))))
                .map_err(Error::chart)?;
        }

        chart
            .draw_series(LineSeries::new(
                x.iter().copied().zip(bands.median().iter().copied()),
                BLACK.stroke_width(2),
            ))
            .map_err(Error::chart)?
            .label("median")
            .legend(|(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 20, ly)], BLACK.stroke_width(2)));

        // Legend entries for the ranges, innermost first.
        for (i, range) in ranges.iter().enumerate() {
            let fill = {
                let style = band_style(i);
                style.color.mix(style.alpha).filled()
            };

            chart
                .draw_series(std::iter::empty::<Polygon<(u32, u32)>>())
                .map_err(Error::chart)?
                .label(format!("{}%-ile range", range.label))
                .legend(move |(lx, ly)| Rectangle::new([(lx, ly - 5), (lx + 20, ly + 5)], fill));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerLeft)
            .background_style(&WHITE)
            .border_style(&BLACK)
            .draw()
            .map_err(Error::chart)?;

        root.present().map_err(Error::chart)?;
    }

    Ok(svg)
}

/// Builds the interactive `plotly` figure for the chart.
pub fn interactive(bands: &PercentileBands, title: &str) -> plotly::Plot {
    let mut plot = plotly::Plot::new();
    let x = bands.read_positions();

    // Each range is a pair of traces: the lower bound, then the upper bound
    // filled down to it.
    for (i, range) in bands.set().ranges().iter().enumerate().rev() {
        let lower = Scatter::new(x.clone(), bands.values(range.lower).to_vec())
            .mode(Mode::Lines)
            .line(Line::new().color("black").width(0.5))
            .show_legend(false)
            .name(format!("{}%-ile range (lower)", range.label));

        let upper = Scatter::new(x.clone(), bands.values(range.upper).to_vec())
            .mode(Mode::Lines)
            .line(Line::new().color("black").width(0.5))
            .fill(Fill::ToNextY)
            .fill_color(band_style(i).css())
            .name(format!("{}%-ile range", range.label));

        plot.add_trace(lower);
        plot.add_trace(upper);
    }

    let median = Scatter::new(x, bands.median().to_vec())
        .mode(Mode::Lines)
        .line(Line::new().color("black").width(2.0))
        .name("median");
    plot.add_trace(median);

    let x_axis = Axis::new()
        .title(Title::new("Read Position"))
        .range(vec![1, bands.positions()])
        .tick_mode(TickMode::Array)
        .tick_values(bands.x_ticks().into_iter().map(f64::from).collect());

    let layout = Layout::new()
        .title(Title::new(title))
        .x_axis(x_axis)
        .y_axis(
            Axis::new()
                .title(Title::new("PHRED score"))
                .range(vec![1, bands.y_upper_bound()]),
        )
        .legend(
            Legend::new()
                .x(0.01)
                .y(0.01)
                .background_color("white")
                .trace_order(TraceOrder::Reversed),
        );

    plot.set_layout(layout);
    plot
}
