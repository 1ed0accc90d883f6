use serde::Deserialize;

/// Main configuration structure for Image-Audit
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub inspector: InspectorConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout for sitemap fetches (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("image-audit/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Page inspection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Upper bound on a single page navigation (seconds)
    #[serde(rename = "navigation-timeout-secs")]
    pub navigation_timeout_secs: u64,

    /// CSS selector matching one product card
    #[serde(rename = "card-selector")]
    pub card_selector: String,

    /// CSS selector for the image inside a card
    #[serde(rename = "image-selector")]
    pub image_selector: String,

    /// CSS selector for the display name inside a card
    #[serde(rename = "name-selector")]
    pub name_selector: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 60,
            card_selector: ".bpag-product-card".to_string(),
            image_selector: "img".to_string(),
            name_selector: ".my-4.text-lg.font-bold.heading-font".to_string(),
        }
    }
}

/// Sitemap index filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Substrings a sitemap-index entry must contain to be kept when filtering
    #[serde(rename = "allow-list")]
    pub allow_list: Vec<String>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            allow_list: vec![
                "page-sitemap".to_string(),
                "post-sitemap".to_string(),
                "product-sitemap".to_string(),
            ],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives `missing-images-<millis>.csv` reports
    #[serde(rename = "report-dir")]
    pub report_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: "./public".to_string(),
        }
    }
}

/// Progress channel configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Number of undelivered progress events buffered per subscriber
    #[serde(rename = "channel-capacity")]
    pub channel_capacity: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}
