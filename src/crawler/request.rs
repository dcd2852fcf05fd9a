//! Request builder
//!
//! Derives each page's request from the immutable template: the cursor is
//! merged into a fresh copy of `variables`, and both parameter bags are
//! re-encoded as JSON into the query string.

use crate::config::validation::{build_header_map, parse_endpoint, parse_json_object};
use crate::config::RequestConfig;
use crate::state::Cursor;
use crate::ConfigError;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use url::Url;

/// Key the cursor token is stored under in `variables`
pub const CURSOR_KEY: &str = "cursor";

/// A fully qualified request for one page
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTarget {
    pub url: Url,
    pub headers: HeaderMap,
}

/// The request every page request is derived from
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    base_url: Url,
    headers: HeaderMap,
    variables: Map<String, Value>,
    features_json: String,
}

impl RequestTemplate {
    pub fn new(
        base_url: Url,
        headers: HeaderMap,
        variables: Map<String, Value>,
        features: Map<String, Value>,
    ) -> Self {
        let features_json = Value::Object(features).to_string();
        Self {
            base_url,
            headers,
            variables,
            features_json,
        }
    }

    /// Builds the template from the `[request]` configuration section
    pub fn from_config(config: &RequestConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            parse_endpoint(&config.url)?,
            build_header_map(&config.headers)?,
            parse_json_object("variables", &config.variables)?,
            parse_json_object("features", &config.features)?,
        ))
    }

    /// Builds the request for the page at `cursor`
    ///
    /// The same template and cursor always produce the same target.
    pub fn build(&self, cursor: &Cursor) -> RequestTarget {
        let mut variables = self.variables.clone();
        if let Some(token) = cursor.token() {
            variables.insert(CURSOR_KEY.to_string(), Value::String(token.to_string()));
        }

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("variables", &Value::Object(variables).to_string())
            .append_pair("features", &self.features_json);

        RequestTarget {
            url,
            headers: self.headers.clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.keys().map(|name| name.as_str())
    }
}
