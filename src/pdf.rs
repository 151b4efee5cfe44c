//! Minimal multi-page PDF writer for full-page image placements.
//!
//! Coordinates handed to [`PdfDocument::add_image`] are millimetres from the
//! top-left corner of the page. They are flipped into PDF user space (points,
//! origin bottom-left) when the document is serialized. Images may extend
//! past the page; the media box clips them.

use crate::error::Error;
use image::{ImageFormat, ImageReader};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

const PT_PER_MM: f64 = 72. / 25.4;

fn pt(mm: f64) -> f32 {
    (mm * PT_PER_MM) as f32
}

/// Refers to an image embedded with [`PdfDocument::embed_png`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle(usize);

struct EmbeddedImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

struct Draw {
    image: ImageHandle,
    x_mm: f64,
    y_mm: f64,
    width_mm: f64,
    height_mm: f64,
}

pub struct PdfDocument {
    page_width_mm: f64,
    page_height_mm: f64,
    title: Option<String>,
    images: Vec<EmbeddedImage>,
    pages: Vec<Vec<Draw>>,
}

impl PdfDocument {
    /// Starts a document with one empty page.
    pub fn new(page_width_mm: f64, page_height_mm: f64) -> Self {
        PdfDocument {
            page_width_mm,
            page_height_mm,
            title: None,
            images: Vec::new(),
            pages: vec![Vec::new()],
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Decodes a PNG once so it can be drawn on any number of pages.
    pub fn embed_png(&mut self, png: &[u8]) -> Result<ImageHandle, Error> {
        let decoded = ImageReader::with_format(Cursor::new(png), ImageFormat::Png).decode()?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        let rgb = rgba
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect::<Vec<_>>();
        let alpha = if rgba.pixels().any(|p| p.0[3] < 255) {
            let alpha = rgba.pixels().map(|p| p.0[3]).collect::<Vec<_>>();
            Some(miniz_oxide::deflate::compress_to_vec_zlib(&alpha, 6))
        } else {
            None
        };

        self.images.push(EmbeddedImage {
            width,
            height,
            rgb: miniz_oxide::deflate::compress_to_vec_zlib(&rgb, 6),
            alpha,
        });
        Ok(ImageHandle(self.images.len() - 1))
    }

    /// Draws an embedded image on the current (last) page.
    pub fn add_image(
        &mut self,
        image: ImageHandle,
        x_mm: f64,
        y_mm: f64,
        width_mm: f64,
        height_mm: f64,
    ) {
        if let Some(page) = self.pages.last_mut() {
            page.push(Draw {
                image,
                x_mm,
                y_mm,
                width_mm,
                height_mm,
            });
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut next_id = 1;
        let mut alloc = || {
            let id = Ref::new(next_id);
            next_id += 1;
            id
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let mut pdf = Pdf::new();

        let mut image_names = Vec::with_capacity(self.images.len());
        for (i, image) in self.images.iter().enumerate() {
            let image_id = alloc();
            let mask_id = image.alpha.as_ref().map(|alpha| {
                let mask_id = alloc();
                let mut mask = pdf.image_xobject(mask_id, alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(image.width as i32);
                mask.height(image.height as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask.finish();
                mask_id
            });

            let mut xobj = pdf.image_xobject(image_id, &image.rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(image.width as i32);
            xobj.height(image.height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_id) = mask_id {
                xobj.s_mask(mask_id);
            }
            xobj.finish();

            image_names.push((format!("Im{}", i + 1), image_id));
        }

        let page_ids = self.pages.iter().map(|_| alloc()).collect::<Vec<_>>();
        let content_ids = self.pages.iter().map(|_| alloc()).collect::<Vec<_>>();

        let page_height_pt = pt(self.page_height_mm);
        for (draws, content_id) in self.pages.iter().zip(&content_ids) {
            let mut content = Content::new();
            for draw in draws {
                let (name, _) = &image_names[draw.image.0];
                content.save_state();
                content.transform([
                    pt(draw.width_mm),
                    0.,
                    0.,
                    pt(draw.height_mm),
                    pt(draw.x_mm),
                    page_height_pt - pt(draw.y_mm + draw.height_mm),
                ]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(*content_id, &compressed)
                .filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        let media_box = Rect::new(0., 0., pt(self.page_width_mm), page_height_pt);
        for (page_id, content_id) in page_ids.iter().zip(&content_ids) {
            let mut page = pdf.page(*page_id);
            page.media_box(media_box)
                .parent(pages_id)
                .contents(*content_id);
            let mut resources = page.resources();
            let mut xobjects = resources.x_objects();
            for (name, image_id) in &image_names {
                xobjects.pair(Name(name.as_bytes()), *image_id);
            }
        }

        let mut info = pdf.document_info(info_id);
        info.producer(TextStr(env!("CARGO_PKG_NAME")));
        if let Some(title) = &self.title {
            info.title(TextStr(title.as_str()));
        }
        info.finish();

        debug!(
            pages = self.pages.len(),
            images = self.images.len(),
            "serialized pdf"
        );
        pdf.finish()
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        fs::write(path, self.to_bytes()).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::testing::png;
    use image::Rgba;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn starts_with_one_page() {
        let doc = PdfDocument::new(210., 297.);
        assert_eq!(doc.page_count(), 1);
        let bytes = doc.to_bytes();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, "/Count 1"));
    }

    #[test]
    fn image_is_embedded_once_for_all_pages() {
        let mut doc = PdfDocument::new(210., 297.);
        let image = doc
            .embed_png(&png(4, 12, Rgba([200, 10, 10, 255])))
            .unwrap();
        doc.add_image(image, 10., 10., 200., 600.);
        doc.add_page();
        doc.add_image(image, 5., -277.8, 200., 600.);
        doc.add_page();
        doc.add_image(image, 5., -560.6, 200., 600.);

        let bytes = doc.to_bytes();
        assert_eq!(doc.page_count(), 3);
        assert!(contains(&bytes, "/Count 3"));
        assert!(contains(&bytes, "/Im1"));
        assert!(!contains(&bytes, "/Im2"));
        assert!(!contains(&bytes, "/SMask"));
    }

    #[test]
    fn transparent_png_gets_a_soft_mask() {
        let mut doc = PdfDocument::new(210., 297.);
        let image = doc.embed_png(&png(3, 3, Rgba([0, 0, 0, 0]))).unwrap();
        doc.add_image(image, 0., 0., 10., 10.);
        assert!(contains(&doc.to_bytes(), "/SMask"));
    }

    #[test]
    fn title_lands_in_document_info() {
        let mut doc = PdfDocument::new(210., 297.);
        doc.set_title("Quarterly Revenue");
        assert!(contains(&doc.to_bytes(), "Quarterly Revenue"));
    }

    #[test]
    fn rejects_non_png() {
        let mut doc = PdfDocument::new(210., 297.);
        assert!(matches!(doc.embed_png(b"GIF89a"), Err(Error::Decode(_))));
    }

    #[test]
    fn save_writes_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("out.pdf");
        PdfDocument::new(210., 297.).save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("missing").join("out.pdf");
        let err = PdfDocument::new(210., 297.).save(&path).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }
}
