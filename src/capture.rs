use crate::error::Error;
use crate::raster::{RasterImage, Rasterizer};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub window_width: u32,
    pub window_height: u32,
    /// How long to wait for the selector to appear once the page has loaded.
    pub element_timeout: Duration,
    /// Upper bound for every single browser call, screenshot included.
    pub capture_timeout: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        CaptureOptions {
            window_width: 1280,
            window_height: 1024,
            element_timeout: Duration::from_secs(10),
            capture_timeout: Duration::from_secs(60),
        }
    }
}

/// Turns a command line target into a URL. Anything that is not an
/// `http`, `https` or `file` URL is treated as a local file path.
pub fn target_url(target: &str) -> Result<Url, Error> {
    if let Ok(url) = Url::parse(target) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Ok(url);
        }
    }

    let invalid = |reason: String| Error::InvalidTarget {
        target: target.to_string(),
        reason,
    };
    let path = fs::canonicalize(Path::new(target)).map_err(|e| invalid(e.to_string()))?;
    Url::from_file_path(&path).map_err(|_| invalid("Failed to convert file path to URL".into()))
}

/// Rasterizes elements of one page with a headless Chrome.
pub struct ChromeRasterizer {
    browser: Browser,
    url: Url,
    options: CaptureOptions,
}

impl ChromeRasterizer {
    pub fn launch(url: Url, options: CaptureOptions) -> Result<Self, Error> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((options.window_width, options.window_height)))
            .idle_browser_timeout(options.capture_timeout)
            .build()
            .map_err(|e| Error::Browser(e.to_string()))?;

        let browser = Browser::new(launch_options).map_err(|e| Error::Browser(e.to_string()))?;
        info!(%url, "launched headless browser");

        Ok(ChromeRasterizer {
            browser,
            url,
            options,
        })
    }
}

impl Rasterizer for ChromeRasterizer {
    fn rasterize(&self, selector: &str) -> Result<RasterImage, Error> {
        let failed = |e: anyhow::Error| Error::RasterizationFailed {
            selector: selector.to_string(),
            detail: e.to_string(),
        };

        let tab = self.browser.new_tab().map_err(failed)?;
        tab.set_default_timeout(self.options.capture_timeout);
        tab.navigate_to(self.url.as_str()).map_err(failed)?;
        tab.wait_until_navigated().map_err(failed)?;

        // resolved once; the same handle is captured below
        let element = tab
            .wait_for_element_with_custom_timeout(selector, self.options.element_timeout)
            .map_err(|e| {
                debug!(selector, error = %e, "selector lookup failed");
                Error::ElementNotFound {
                    selector: selector.to_string(),
                }
            })?;

        let png = element
            .capture_screenshot(CaptureScreenshotFormatOption::Png)
            .map_err(failed)?;
        let image = RasterImage::from_png(png)?;
        info!(
            selector,
            width = image.width,
            height = image.height,
            "captured element"
        );

        Ok(image)
    }
}
