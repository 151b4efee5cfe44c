use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::naming::pdf_file_name;
use crate::paginate::{paginate, Placement};
use crate::pdf::PdfDocument;
use crate::raster::{RasterImage, Rasterizer};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DOWNLOAD_FAILED: &str = "PDF download failed, please refresh and try again.";

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub selector: String,
    pub description: String,
    /// Timestamp that goes into the file name.
    pub date: DateTime<Utc>,
    pub output_dir: PathBuf,
}

fn capture<R: Rasterizer>(rasterizer: &R, selector: &str) -> Result<RasterImage, Error> {
    rasterizer.rasterize(selector).map_err(|e| {
        if matches!(e, Error::ElementNotFound { .. }) {
            warn!(selector, "{}", DOWNLOAD_FAILED);
        }
        e
    })
}

/// Captures the element and computes its page placements without writing
/// anything.
pub fn plan_element<R: Rasterizer>(
    rasterizer: &R,
    selector: &str,
    geometry: &PageGeometry,
) -> Result<Vec<Placement>, Error> {
    let image = capture(rasterizer, selector)?;
    paginate(image.width, image.height, geometry)
}

/// Captures the element matched by `request.selector`, tiles it over as many
/// pages as needed and saves the PDF into `request.output_dir`.
///
/// Returns the path of the written file.
pub fn export_element<R: Rasterizer>(
    rasterizer: &R,
    request: &ExportRequest,
    geometry: &PageGeometry,
) -> Result<PathBuf, Error> {
    let image = capture(rasterizer, &request.selector)?;
    let placements = paginate(image.width, image.height, geometry)?;

    let mut doc = PdfDocument::new(geometry.paper_width_mm, geometry.paper_height_mm);
    doc.set_title(&request.description);
    let handle = doc.embed_png(&image.png)?;
    for placement in &placements {
        if placement.page_index > 0 {
            doc.add_page();
        }
        doc.add_image(
            handle,
            placement.x_mm,
            placement.y_mm,
            placement.width_mm,
            placement.height_mm,
        );
    }

    fs::create_dir_all(&request.output_dir).map_err(|source| Error::Write {
        path: request.output_dir.clone(),
        source,
    })?;
    let pdf_path = request
        .output_dir
        .join(pdf_file_name(&request.description, request.date));
    doc.save(&pdf_path)?;

    info!(
        path = %pdf_path.display(),
        pages = doc.page_count(),
        "saved pdf"
    );
    Ok(pdf_path)
}
