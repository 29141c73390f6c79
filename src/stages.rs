//! The stage types of the QC pipeline and how each is rendered.
//!
//! Every stage type is a variant of [`StageKind`]. Most stages only report
//! parameters and scalar outputs and share the [`generic`] renderer with
//! their own template; stages that need a visualization get a module of
//! their own.

pub mod generic;
pub mod per_base_quality;

use std::fmt;
use std::str::FromStr;

use crate::document::StageReport;
use crate::errors::Error;
use crate::render::RenderContext;
use crate::templates::TemplateKind;

/// The processing stages that can appear in a report document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Quality score distribution at every read position.
    PerBaseQuality,

    /// Adaptor removal and merging of read pairs.
    AdaptorTrimPe,

    /// Sliding window quality trimming.
    WindowedQualTrim,
}

impl StageKind {
    /// Every supported stage.
    pub const ALL: [StageKind; 3] = [
        StageKind::PerBaseQuality,
        StageKind::AdaptorTrimPe,
        StageKind::WindowedQualTrim,
    ];

    /// The tag of this stage within a report document.
    pub fn tag(&self) -> &'static str {
        match self {
            StageKind::PerBaseQuality => "PerBaseQuality",
            StageKind::AdaptorTrimPe => "AdaptorTrimPE",
            StageKind::WindowedQualTrim => "WindowedQualTrim",
        }
    }

    /// A short description of what is shown for this stage.
    pub fn description(&self) -> &'static str {
        match self {
            StageKind::PerBaseQuality => "Percentiles of the quality score at each read position.",
            StageKind::AdaptorTrimPe => "Parameters and counts of adaptor trimming.",
            StageKind::WindowedQualTrim => "Parameters and counts of windowed quality trimming.",
        }
    }

    /// The template this stage is rendered with.
    pub fn template(&self) -> TemplateKind {
        match self {
            StageKind::PerBaseQuality => TemplateKind::PerBaseQuality,
            StageKind::AdaptorTrimPe => TemplateKind::AdaptorTrim,
            StageKind::WindowedQualTrim => TemplateKind::WindowedQualTrim,
        }
    }

    /// Renders the report of a stage of this kind into an HTML fragment.
    /// `anchor` is the element id the fragment is linked to from the page
    /// navigation.
    pub fn render(
        &self,
        report: &StageReport,
        anchor: &str,
        context: &RenderContext,
    ) -> Result<String, Error> {
        match self {
            StageKind::PerBaseQuality => per_base_quality::render(report, anchor, context),
            StageKind::AdaptorTrimPe | StageKind::WindowedQualTrim => {
                generic::render(self.template(), report, anchor, context)
            }
        }
    }
}

impl FromStr for StageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| Error::UnknownStageType(s.to_string()))
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in StageKind::ALL {
            assert_eq!(kind.tag().parse::<StageKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let err = "perbasequality".parse::<StageKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownStageType(ref tag) if tag == "perbasequality"));
    }
}
