use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sift
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Request pacing and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Global request rate shared by every pipeline in a batch
    #[serde(rename = "requests-per-second", default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Timeout applied to each individual attempt
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: f64,

    /// Number of attempts per URL (not the number of extra retries)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff time unit; attempt `n` is followed by `2^n` units of sleep
    #[serde(rename = "backoff-unit-ms", default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Skip TLS certificate verification
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

impl ScraperConfig {
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            backoff_unit_ms: default_backoff_unit_ms(),
            accept_invalid_certs: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the harvester
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for contact (optional)
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL[; ContactEmail])`
    pub fn header_value(&self) -> String {
        match &self.contact_email {
            Some(email) => format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, self.contact_url, email
            ),
            None => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            ),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON report; no file is written when unset
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,

    /// Print articles and statistics to stdout
    #[serde(rename = "print-summary", default = "default_true")]
    pub print_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: None,
            print_summary: true,
        }
    }
}

/// Batch input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// URLs listed inline
    #[serde(default)]
    pub urls: Vec<String>,

    /// File with one URL per line
    #[serde(rename = "urls-file", default)]
    pub urls_file: Option<String>,
}

fn default_requests_per_second() -> f64 {
    2.0
}

fn default_timeout_seconds() -> f64 {
    10.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_crawler_name() -> String {
    "SumiSift".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://github.com/sumi-sift".to_string()
}

fn default_true() -> bool {
    true
}
