use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for leadscope
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Portal credentials and standing OTP value
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Login email
    pub email: String,

    /// Login password
    pub password: String,

    /// Standing OTP value; a per-run value passed on the command line takes
    /// precedence. May be empty when the saved session profile is still valid
    /// or the account uses push approval.
    #[serde(default)]
    pub otp: Option<String>,
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run the browser headless
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pass --no-sandbox / --disable-setuid-sandbox (container environments)
    #[serde(default)]
    pub no_sandbox: bool,

    /// Profile directory that persists cookies between runs, enabling
    /// session reuse without re-entering the OTP
    #[serde(default)]
    pub user_data_dir: Option<String>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Page driver back-end
    #[serde(default)]
    pub mode: DriverMode,

    /// Upper bound on pages walked per specialist, guarding against
    /// runaway pagination
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,

    /// When true, a failed specialist is logged and the run continues with
    /// the remaining specialists; when false the whole run aborts
    #[serde(default)]
    pub continue_on_specialist_failure: bool,

    /// Accept-Language header sent by the HTTP back-end
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// User-Agent header sent by the HTTP back-end
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Which PageDriver back-end to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverMode {
    /// Direct HTTP retrieval with the session's cookies (faster)
    #[default]
    Http,
    /// Full browser-DOM evaluation (tolerates script-driven pagination)
    Dom,
}

/// Layered timeout configuration
///
/// Navigation timeouts are step-level and recoverable; the login waits bound
/// the OTP/push polling loops; the watchdog is the scheduler's hard per-job
/// limit.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Per-navigation timeout, seconds
    #[serde(default = "default_navigation_secs")]
    pub navigation_secs: u64,

    /// Max wait for OTP validation, seconds
    #[serde(default = "default_otp_wait_secs")]
    pub otp_wait_secs: u64,

    /// Max wait for out-of-band push approval, seconds
    #[serde(default = "default_push_wait_secs")]
    pub push_wait_secs: u64,

    /// Sampling interval for login polling, milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-job watchdog timeout, seconds
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,
}

impl TimeoutConfig {
    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }

    pub fn otp_wait(&self) -> Duration {
        Duration::from_secs(self.otp_wait_secs)
    }

    pub fn push_wait(&self) -> Duration {
        Duration::from_secs(self.push_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for CSV and JSON snapshot files
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

/// One configured specialist: a (broker, region, listing URL) triple
///
/// The `name` doubles as the broker label on summary and detail rows,
/// regardless of what individual listing rows display.
#[derive(Debug, Clone, Deserialize)]
pub struct Specialist {
    pub name: String,

    /// Region label ("praça" in the portal's vocabulary)
    #[serde(alias = "praca")]
    pub region: String,

    /// Entry URL of this specialist's lead listing
    pub listing_url: String,
}

/// Top-level shape of the specialists JSON document
#[derive(Debug, Clone, Deserialize)]
pub struct SpecialistsFile {
    pub specialists: Vec<Specialist>,
}

fn default_true() -> bool {
    true
}

fn default_page_cap() -> u32 {
    500
}

fn default_accept_language() -> String {
    "pt-BR,pt;q=0.9".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/125 Safari/537.36".to_string()
}

fn default_navigation_secs() -> u64 {
    120
}

fn default_otp_wait_secs() -> u64 {
    10
}

fn default_push_wait_secs() -> u64 {
    45
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_watchdog_secs() -> u64 {
    720
}

fn default_output_dir() -> String {
    "./output".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: false,
            user_data_dir: None,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            mode: DriverMode::default(),
            page_cap: default_page_cap(),
            continue_on_specialist_failure: false,
            accept_language: default_accept_language(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            navigation_secs: default_navigation_secs(),
            otp_wait_secs: default_otp_wait_secs(),
            push_wait_secs: default_push_wait_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            watchdog_secs: default_watchdog_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}
