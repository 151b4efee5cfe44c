//! Tiles one tall image over as many fixed-size pages as it needs.
//!
//! Every page draws the *whole* image at the same scale. Only the vertical
//! offset changes: from the second page on it is negative, which slides the
//! image up so that the next unseen band lines up with the top of the page.

use crate::error::Error;
use crate::geometry::PageGeometry;
use serde::Serialize;
use tracing::debug;

/// Where the image is drawn on one page, in millimetres from the top-left
/// corner of that page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub page_index: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Computes one placement per page for an image of the given pixel size.
///
/// The result always holds at least the first page. A trailing band shorter
/// than `geometry.slack_mm` is dropped instead of getting a page of its own.
pub fn paginate(
    pixel_width: u32,
    pixel_height: u32,
    geometry: &PageGeometry,
) -> Result<Vec<Placement>, Error> {
    if pixel_width == 0 {
        return Err(Error::ZeroWidthImage);
    }
    if pixel_height == 0 {
        return Err(Error::ZeroHeightImage);
    }
    geometry.validate()?;

    let width_mm = geometry.content_width_mm;
    let height_mm = (f64::from(pixel_height) * width_mm) / f64::from(pixel_width);
    let page_height_mm = geometry.page_height_mm();

    let pages = ((height_mm - geometry.slack_mm) / page_height_mm)
        .floor()
        .max(0.) as usize
        + 1;
    if pages > geometry.max_pages {
        return Err(Error::TooManyPages {
            pages,
            limit: geometry.max_pages,
        });
    }

    let mut placements = vec![Placement {
        page_index: 0,
        x_mm: geometry.first_page_left_mm,
        y_mm: geometry.first_page_top_mm,
        width_mm,
        height_mm,
    }];

    let mut remaining = height_mm - page_height_mm;
    while remaining >= geometry.slack_mm {
        if placements.len() >= geometry.max_pages {
            return Err(Error::TooManyPages {
                pages: placements.len() + 1,
                limit: geometry.max_pages,
            });
        }
        placements.push(Placement {
            page_index: placements.len(),
            x_mm: geometry.next_page_left_mm,
            y_mm: remaining - height_mm + geometry.next_page_top_mm,
            width_mm,
            height_mm,
        });
        remaining -= page_height_mm;
    }

    debug!(
        pixel_width,
        pixel_height,
        height_mm,
        pages = placements.len(),
        "paginated image"
    );

    Ok(placements)
}
