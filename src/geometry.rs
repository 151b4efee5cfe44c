use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shortest page band accepted, so each extra page consumes a real slice.
pub const MIN_PAGE_HEIGHT_MM: f64 = 1.;

/// Page layout used when tiling a captured image over PDF pages.
///
/// All lengths are in millimetres. The defaults describe an A4 portrait
/// sheet with a 200 mm wide image column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageGeometry {
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
    /// Width the image is scaled to; its height follows the aspect ratio.
    pub content_width_mm: f64,
    /// Height of one page band relative to `content_width_mm`.
    pub page_height_ratio: f64,
    pub first_page_top_mm: f64,
    pub next_page_top_mm: f64,
    pub first_page_left_mm: f64,
    pub next_page_left_mm: f64,
    /// Leftovers shorter than this do not get a page of their own.
    pub slack_mm: f64,
    /// Images needing more pages than this are rejected.
    pub max_pages: usize,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            paper_width_mm: 210.,
            paper_height_mm: 297.,
            content_width_mm: 200.,
            page_height_ratio: 1.414,
            first_page_top_mm: 10.,
            next_page_top_mm: 5.,
            first_page_left_mm: 10.,
            next_page_left_mm: 5.,
            slack_mm: 10.,
            max_pages: 500,
        }
    }
}

impl PageGeometry {
    pub fn page_height_mm(&self) -> f64 {
        self.content_width_mm * self.page_height_ratio
    }

    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("paper_width_mm", self.paper_width_mm),
            ("paper_height_mm", self.paper_height_mm),
            ("content_width_mm", self.content_width_mm),
            ("page_height_ratio", self.page_height_ratio),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0. {
                return Err(Error::InvalidGeometry(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("first_page_top_mm", self.first_page_top_mm),
            ("next_page_top_mm", self.next_page_top_mm),
            ("first_page_left_mm", self.first_page_left_mm),
            ("next_page_left_mm", self.next_page_left_mm),
            ("slack_mm", self.slack_mm),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0. {
                return Err(Error::InvalidGeometry(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        let page_height = self.page_height_mm();
        if !page_height.is_finite() || page_height < MIN_PAGE_HEIGHT_MM {
            return Err(Error::InvalidGeometry(format!(
                "page height (content_width_mm * page_height_ratio) must be at least \
                 {MIN_PAGE_HEIGHT_MM} mm, got {page_height}"
            )));
        }
        if page_height <= self.slack_mm {
            return Err(Error::InvalidGeometry(format!(
                "page height {page_height} mm must exceed slack_mm {}",
                self.slack_mm
            )));
        }
        if self.max_pages == 0 {
            return Err(Error::InvalidGeometry("max_pages must be at least 1".into()));
        }

        Ok(())
    }

    /// Reads a geometry from a JSON file. Keys left out keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<PageGeometry, Error> {
        let json = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let geometry: PageGeometry = serde_json::from_str(&json)
            .map_err(|e| Error::InvalidGeometry(format!("{}: {e}", path.display())))?;
        geometry.validate()?;
        Ok(geometry)
    }
}
