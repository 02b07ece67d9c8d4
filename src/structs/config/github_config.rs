use serde::{Deserialize, Serialize};
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GithubConfig {
    #[serde(default = "ConfigHelper::default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub org: String,

    /// Name of the environment variable holding the API token.
    #[serde(default = "ConfigHelper::default_token_env")]
    pub token_env: String,

    /// Inline token; takes precedence over `token_env` when set.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: ConfigHelper::default_base_url(),
            org: String::new(),
            token_env: ConfigHelper::default_token_env(),
            token: None,
        }
    }
}
