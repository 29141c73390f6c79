//! Functionality related to the `qcpp-report render` command itself.

use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::debug;
use tracing::info;

use crate::document::Document;
use crate::plot::ChartSettings;
use crate::plot::DEFAULT_HEIGHT;
use crate::plot::DEFAULT_WIDTH;
use crate::render::render_document;
use crate::render::PageSettings;
use crate::render::RenderContext;
use crate::render::DEFAULT_D3_URL;
use crate::render::DEFAULT_PLOTLY_URL;
use crate::stages::StageKind;
use crate::templates::Templates;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `qcpp-report render`.
#[derive(Args)]
pub struct RenderArgs {
    /// YAML report written by the QC pipeline.
    #[arg(value_name = "YAML")]
    pub src: PathBuf,

    /// File to write the HTML page to. Defaults to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory with template files that replace the built-in ones.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Width of the static chart images in pixels.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Height of the static chart images in pixels.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// URL of the d3 script the page links to.
    #[arg(long, value_name = "URL", default_value = DEFAULT_D3_URL)]
    pub d3_url: String,

    /// URL of the plotly.js script the page links to.
    #[arg(long, value_name = "URL", default_value = DEFAULT_PLOTLY_URL)]
    pub plotly_url: String,

    /// If provided, only renders the stages with this tag.
    #[arg(long = "only", value_name = "TAG")]
    pub only_stage: Option<StageKind>,
}

//==============//
// Main command //
//==============//

/// Main method for the `qcpp-report render` subcommand.
pub fn render(args: RenderArgs) -> anyhow::Result<()> {
    //========//
    // Source //
    //========//

    let mut document = Document::read(&args.src)
        .with_context(|| format!("invalid input file: {}", args.src.display()))?;
    debug!("  [*] Source: {}", args.src.display());
    debug!("  [*] Stages: {}", document.stages.len());

    if let Some(kind) = args.only_stage {
        document.retain_kind(kind);
        info!(
            "  [*] Only rendering `{}` stages ({} found).",
            kind,
            document.stages.len()
        );
    }

    //===========//
    // Templates //
    //===========//

    let templates = match args.templates {
        Some(ref dir) => Templates::with_overrides(dir)
            .with_context(|| format!("could not load templates from {}", dir.display()))?,
        None => Templates::embedded()?,
    };

    //===========//
    // Rendering //
    //===========//

    if args.width == 0 || args.height == 0 {
        anyhow::bail!(
            "chart dimensions must be non-zero, got {}x{}",
            args.width,
            args.height
        );
    }

    let context = RenderContext::new(
        templates,
        ChartSettings {
            width: args.width,
            height: args.height,
        },
        PageSettings {
            d3_url: args.d3_url,
            plotly_url: args.plotly_url,
        },
    );

    info!("Rendering {}.", args.src.display());
    let html = render_document(&document, &context)?;

    //========//
    // Output //
    //========//

    match args.output {
        Some(ref path) => {
            let mut file = File::create(path)
                .with_context(|| format!("could not create output file: {}", path.display()))?;
            file.write_all(html.as_bytes())?;
            info!("  [*] Written to {}.", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(html.as_bytes())?;
            handle.flush()?;
        }
    }

    Ok(())
}
