use anyhow::Context;
use capture::{CaptureOptions, ChromeRasterizer};
use chrono::{DateTime, Utc};
use export::ExportRequest;
use geometry::PageGeometry;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod capture;
mod error;
mod export;
mod geometry;
mod naming;
mod paginate;
mod pdf;
mod raster;

/// Saves one element of a web page as a multi-page PDF.
#[derive(Debug, clap::Parser)]
#[command(version)]
struct Options {
    /// URL or local HTML file to load
    target: String,
    /// CSS selector of the element to capture
    #[arg(long)]
    selector: String,
    /// Short description of the content, used for the file name and title
    #[arg(long)]
    description: String,
    /// Directory the PDF is written to
    #[arg(long, default_value = "output")]
    output: PathBuf,
    /// JSON file overriding the default A4 page geometry
    #[arg(long)]
    geometry: Option<PathBuf>,
    /// Browser window width in pixels
    #[arg(long, default_value_t = 1280)]
    window_width: u32,
    /// Browser window height in pixels
    #[arg(long, default_value_t = 1024)]
    window_height: u32,
    /// Seconds to wait for the selector to match
    #[arg(long, default_value_t = 10)]
    element_timeout: u64,
    /// Seconds any single browser operation may take
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Timestamp for the file name (RFC 3339), defaults to now
    #[arg(long)]
    timestamp: Option<DateTime<Utc>>,
    /// Print the page placements as JSON instead of writing a PDF
    #[arg(long)]
    plan: bool,
}

impl Options {
    fn page_geometry(&self) -> anyhow::Result<PageGeometry> {
        match &self.geometry {
            Some(path) => PageGeometry::from_json_file(path)
                .with_context(|| format!("Failed to load page geometry from {}", path.display())),
            None => Ok(PageGeometry::default()),
        }
    }

    fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            window_width: self.window_width,
            window_height: self.window_height,
            element_timeout: Duration::from_secs(self.element_timeout),
            capture_timeout: Duration::from_secs(self.timeout),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts: Options = clap::Parser::parse();
    let geometry = opts.page_geometry()?;
    let url = capture::target_url(&opts.target)?;
    let rasterizer = ChromeRasterizer::launch(url, opts.capture_options())?;

    if opts.plan {
        let placements = export::plan_element(&rasterizer, &opts.selector, &geometry)?;
        println!("{}", serde_json::to_string_pretty(&placements)?);
        return Ok(());
    }

    let request = ExportRequest {
        selector: opts.selector.clone(),
        description: opts.description.clone(),
        date: opts.timestamp.unwrap_or_else(Utc::now),
        output_dir: opts.output.clone(),
    };
    let path = export::export_element(&rasterizer, &request, &geometry)
        .with_context(|| format!("Failed to export '{}'", opts.selector))?;
    println!("{}", path.display());

    Ok(())
}
