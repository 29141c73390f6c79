//! The HTML templates that fragments and the final page are rendered with.
//!
//! All five templates are compiled into the binary. A directory of overrides
//! can be supplied at setup time; any template found there by file name
//! replaces the built-in one. The resulting [`Templates`] are read-only and
//! are handed to the renderers explicitly.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tera::Context;
use tera::Tera;
use tracing::debug;
use tracing::info;

use crate::errors::Error;

/// The templates used by the report renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    /// Tool name, version and configuration.
    Metadata,

    /// Per-base quality charts.
    PerBaseQuality,

    /// Adaptor trimming summary.
    AdaptorTrim,

    /// Windowed quality trimming summary.
    WindowedQualTrim,

    /// The whole page.
    Root,
}

impl TemplateKind {
    /// Every template, in no particular order.
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::Metadata,
        TemplateKind::PerBaseQuality,
        TemplateKind::AdaptorTrim,
        TemplateKind::WindowedQualTrim,
        TemplateKind::Root,
    ];

    /// The file name of the template, which is also its name within Tera.
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Metadata => "metadata.html",
            TemplateKind::PerBaseQuality => "perbasequality.html",
            TemplateKind::AdaptorTrim => "adaptortrim.html",
            TemplateKind::WindowedQualTrim => "windowedqualtrim.html",
            TemplateKind::Root => "root.html",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            TemplateKind::Metadata => include_str!("templates/metadata.html"),
            TemplateKind::PerBaseQuality => include_str!("templates/perbasequality.html"),
            TemplateKind::AdaptorTrim => include_str!("templates/adaptortrim.html"),
            TemplateKind::WindowedQualTrim => include_str!("templates/windowedqualtrim.html"),
            TemplateKind::Root => include_str!("templates/root.html"),
        }
    }
}

/// A loaded set of templates.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Loads the built-in templates.
    pub fn embedded() -> Result<Self, Error> {
        let sources = TemplateKind::ALL
            .iter()
            .map(|kind| (kind.file_name(), kind.builtin().to_string()))
            .collect();

        Self::from_sources(sources)
    }

    /// Loads the built-in templates, replacing any of them that exist as a
    /// file of the same name within `directory`.
    pub fn with_overrides(directory: &Path) -> Result<Self, Error> {
        let mut sources = Vec::with_capacity(TemplateKind::ALL.len());

        for kind in TemplateKind::ALL {
            let path = directory.join(kind.file_name());
            let source = if path.is_file() {
                info!("  [*] Using template override: {}", path.display());
                fs::read_to_string(&path)?
            } else {
                debug!("  [*] No override for {}, using built-in.", kind.file_name());
                kind.builtin().to_string()
            };

            sources.push((kind.file_name(), source));
        }

        Self::from_sources(sources)
    }

    fn from_sources(sources: Vec<(&'static str, String)>) -> Result<Self, Error> {
        let mut tera = Tera::default();

        for (name, source) in sources {
            tera.add_raw_template(name, &source)
                .map_err(|source| Error::TemplateRender {
                    template: name.to_string(),
                    source,
                })?;
        }

        Ok(Self { tera })
    }

    /// Renders a template with the given context.
    pub fn render<C: Serialize>(&self, kind: TemplateKind, context: &C) -> Result<String, Error> {
        let template = kind.file_name();
        let context = Context::from_serialize(context).map_err(|source| Error::TemplateRender {
            template: template.to_string(),
            source,
        })?;

        self.tera
            .render(template, &context)
            .map_err(|source| Error::TemplateRender {
                template: template.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_builtin_templates_compile() {
        assert!(Templates::embedded().is_ok());
    }

    #[test]
    fn test_missing_variable_is_a_render_error() {
        let templates = Templates::embedded().unwrap();
        let context: HashMap<String, String> = HashMap::new();

        let err = templates
            .render(TemplateKind::AdaptorTrim, &context)
            .unwrap_err();
        assert!(matches!(err, Error::TemplateRender { ref template, .. } if template == "adaptortrim.html"));
    }

    #[test]
    fn test_overrides_replace_builtin_templates() {
        let directory = std::env::temp_dir().join(format!(
            "qcpp-report-templates-{}",
            std::process::id()
        ));
        fs::create_dir_all(&directory).unwrap();
        fs::write(directory.join("metadata.html"), "custom {{ title }}").unwrap();

        let templates = Templates::with_overrides(&directory).unwrap();
        let context = HashMap::from([("title", "metadata")]);
        let rendered = templates.render(TemplateKind::Metadata, &context).unwrap();

        fs::remove_dir_all(&directory).unwrap();
        assert_eq!(rendered, "custom metadata");
    }
}
