use crate::error::Error;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// A captured element, PNG encoded.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl RasterImage {
    /// Wraps PNG bytes, reading the pixel size from the image header.
    pub fn from_png(png: Vec<u8>) -> Result<RasterImage, Error> {
        let (width, height) =
            ImageReader::with_format(Cursor::new(&png), ImageFormat::Png).into_dimensions()?;
        Ok(RasterImage { width, height, png })
    }
}

/// Turns the element matched by a CSS selector into pixels.
///
/// Implementations resolve the selector once and capture that same element.
/// A selector without a match is reported as [`Error::ElementNotFound`].
pub trait Rasterizer {
    fn rasterize(&self, selector: &str) -> Result<RasterImage, Error>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use image::{Rgba, RgbaImage};

    pub fn png(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, pixel)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    /// Serves a fixed image for one selector and nothing else.
    pub struct FixedRasterizer {
        pub selector: String,
        pub image: RasterImage,
    }

    impl Rasterizer for FixedRasterizer {
        fn rasterize(&self, selector: &str) -> Result<RasterImage, Error> {
            if selector == self.selector {
                Ok(self.image.clone())
            } else {
                Err(Error::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }
    }

    /// Fails every capture the way a crashed or stalled browser would.
    pub struct FailingRasterizer {
        pub detail: String,
    }

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, selector: &str) -> Result<RasterImage, Error> {
            Err(Error::RasterizationFailed {
                selector: selector.to_string(),
                detail: self.detail.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::png;
    use super::*;
    use image::Rgba;

    #[test]
    fn reads_dimensions_from_png() {
        let image = RasterImage::from_png(png(120, 340, Rgba([0, 0, 0, 255]))).unwrap();
        assert_eq!((image.width, image.height), (120, 340));
    }

    #[test]
    fn rejects_garbage() {
        let err = RasterImage::from_png(b"not a png".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
