use serde::Deserialize;

pub const DEFAULT_BASE_PATH: &str = "http://petstore.swagger.io/v2";

/// Settings an [ApiClient](crate::ApiClient) is constructed from.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiConfig {
    base_path: Option<String>,
}

impl ApiConfig {
    pub fn new_from_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH)
    }
}
