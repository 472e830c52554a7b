use serde::Deserialize;

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_search_query() -> String {
    "funny dogs".to_string()
}

fn default_max_results() -> u32 {
    50u32
}

fn default_object_key() -> String {
    "index.html".to_string()
}

fn default_page_title() -> String {
    "Funny Dog Videos".to_string()
}

fn default_page_tagline() -> String {
    "Get Your Doggy Dopamine Hits !".to_string()
}

fn default_page_footer() -> String {
    "© 2025 DoggyHits - All rights reserved".to_string()
}

fn default_stylesheet_href() -> String {
    "css/style.css".to_string()
}

fn default_script_href() -> String {
    "./pkg/playback_queue.js".to_string()
}

fn default_time_zone() -> String {
    "Australia/Sydney".to_string()
}

fn default_true() -> bool {
    true
}

fn default_publish_directory() -> String {
    "./public".to_string()
}

fn default_bucket() -> String {
    "doggyhits.com".to_string()
}

fn default_secret_field() -> String {
    "DoggyHitsYoutubeAPIkey".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    #[serde(default)]
    pub(crate) run_once: bool,
    pub(crate) refresh_interval_secs: Option<u64>,
}

/// `SEARCH_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SearchConfig {
    #[serde(default = "default_search_query")]
    pub(crate) query: String,
    #[serde(default = "default_max_results")]
    pub(crate) max_results: u32,
    pub(crate) api_host: Option<String>,
}

/// `PAGE_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PageConfig {
    #[serde(default = "default_object_key")]
    pub(crate) object_key: String,
    #[serde(default = "default_page_title")]
    pub(crate) title: String,
    #[serde(default = "default_page_tagline")]
    pub(crate) tagline: String,
    #[serde(default = "default_page_footer")]
    pub(crate) footer: String,
    #[serde(default = "default_stylesheet_href")]
    pub(crate) stylesheet_href: String,
    #[serde(default = "default_script_href")]
    pub(crate) script_href: String,
    #[serde(default = "default_time_zone")]
    pub(crate) time_zone: String,
    /// Overrides `time_zone` with a fixed offset when set.
    pub(crate) utc_offset_minutes: Option<i32>,
    #[serde(default = "default_true")]
    pub(crate) autoplay: bool,
    #[serde(default = "default_true")]
    pub(crate) play_all_button: bool,
    pub(crate) analytics_tag: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PublishTarget {
    Disk,
    Http,
    Memory,
}

fn default_publish_target() -> PublishTarget {
    PublishTarget::Disk
}

/// `PUBLISH_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PublishConfig {
    #[serde(default = "default_publish_target")]
    pub(crate) target: PublishTarget,
    #[serde(default = "default_publish_directory")]
    pub(crate) directory: String,
    pub(crate) endpoint: Option<String>,
    #[serde(default = "default_bucket")]
    pub(crate) bucket: String,
    pub(crate) token: Option<String>,
}

/// `YOUTUBE_API_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SecretConfig {
    pub(crate) secret_file: Option<String>,
    pub(crate) secret_base64: Option<String>,
    pub(crate) secret: Option<String>,
    #[serde(default = "default_secret_field")]
    pub(crate) secret_field: String,
}

#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) server: ServerConfig,
    pub(crate) search: SearchConfig,
    pub(crate) page: PageConfig,
    pub(crate) publish: PublishConfig,
    pub(crate) secret: SecretConfig,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        let server = match envy::from_env::<ServerConfig>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid server configuration: {:#?}", error),
        };
        let search = match envy::prefixed("SEARCH_").from_env::<SearchConfig>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid search configuration: {:#?}", error),
        };
        let page = match envy::prefixed("PAGE_").from_env::<PageConfig>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid page configuration: {:#?}", error),
        };
        let publish = match envy::prefixed("PUBLISH_").from_env::<PublishConfig>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid publish configuration: {:#?}", error),
        };
        let secret = match envy::prefixed("YOUTUBE_API_").from_env::<SecretConfig>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid YouTube API secret configuration: {:#?}", error),
        };

        Self {
            server,
            search,
            page,
            publish,
            secret,
        }
    }
}
