use serde::Deserialize;

/// Main configuration structure for Catalog-Crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Identifies the query page and the element ids the source serves
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// URL of the catalog query form
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Select element holding the program-type options
    #[serde(rename = "type-selector", default = "default_type_selector")]
    pub type_selector: String,

    /// Select element holding the enrollment-year options
    #[serde(rename = "scope-selector", default = "default_scope_selector")]
    pub scope_selector: String,

    /// Submit button of the query form
    #[serde(rename = "query-button", default = "default_query_button")]
    pub query_button: String,

    /// Table id of the program-variant ("entity") listing
    #[serde(rename = "entity-table-id", default = "default_entity_table")]
    pub entity_table_id: String,

    /// Row class of data rows inside the entity table
    #[serde(rename = "entity-row-class", default = "default_entity_row_class")]
    pub entity_row_class: String,

    /// Table id of the per-entity category listing
    #[serde(rename = "category-table-id", default = "default_category_table")]
    pub category_table_id: String,

    /// Table ids of the course record table, tried in order
    #[serde(rename = "record-table-ids", default = "default_record_tables")]
    pub record_table_ids: Vec<String>,

    /// Link labels on the category page that are not categories
    /// (close buttons, objective views) and must be skipped
    #[serde(rename = "skip-labels", default = "default_skip_labels")]
    pub skip_labels: Vec<String>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Hard time limit for navigating into an entity, in seconds
    #[serde(rename = "enter-timeout-secs", default = "default_enter_timeout")]
    pub enter_timeout_secs: u64,

    /// Refresh-and-retry cycles after a transient form interaction error
    #[serde(rename = "form-retry-attempts", default = "default_form_retries")]
    pub form_retry_attempts: u32,

    /// Delay before each form retry, in milliseconds
    #[serde(rename = "form-retry-delay-ms", default = "default_form_delay")]
    pub form_retry_delay_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving ledgers, logs, and record files
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_type_selector() -> String {
    "dpJhlx".to_string()
}

fn default_scope_selector() -> String {
    "dpRxnd".to_string()
}

fn default_query_button() -> String {
    "btnQuery".to_string()
}

fn default_entity_table() -> String {
    "grdJxjh".to_string()
}

fn default_entity_row_class() -> String {
    "tbshowlist".to_string()
}

fn default_category_table() -> String {
    "Table1".to_string()
}

fn default_record_tables() -> Vec<String> {
    vec!["DataGrid1".to_string(), "DataGrid2".to_string()]
}

fn default_skip_labels() -> Vec<String> {
    // The category page carries a close button and a training-objectives
    // view alongside the real category links
    vec!["关闭".to_string(), "点击此处查看培养目标".to_string()]
}

fn default_enter_timeout() -> u64 {
    10
}

fn default_form_retries() -> u32 {
    2
}

fn default_form_delay() -> u64 {
    1500
}

fn default_user_agent() -> String {
    format!("catalog-crawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}
