use std::path::PathBuf;

/// Everything that can stop an element from ending up in a PDF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The selector matched nothing on the loaded page.
    #[error("no element matches selector '{selector}'")]
    ElementNotFound { selector: String },

    #[error("captured image has zero pixel width")]
    ZeroWidthImage,

    #[error("captured image has zero pixel height")]
    ZeroHeightImage,

    /// The browser failed or timed out while producing the image.
    #[error("failed to rasterize '{selector}': {detail}")]
    RasterizationFailed { selector: String, detail: String },

    #[error("failed to launch browser: {0}")]
    Browser(String),

    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("image needs {pages} pages, more than the limit of {limit}")]
    TooManyPages { pages: usize, limit: usize },

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("failed to decode captured image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn element_not_found_names_selector() {
        let e = Error::ElementNotFound {
            selector: "#dashboard".into(),
        };
        assert_snapshot!(e.to_string(), @"no element matches selector '#dashboard'");
    }

    #[test]
    fn rasterization_failure_keeps_detail() {
        let e = Error::RasterizationFailed {
            selector: ".chart".into(),
            detail: "timed out".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains(".chart"), "got: {msg}");
        assert!(msg.contains("timed out"), "got: {msg}");
    }
}
