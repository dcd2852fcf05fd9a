use crate::config::types::{Config, CrawlConfig, OutputConfig, RequestConfig};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_request_config(&config.request)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the request template section
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    parse_endpoint(&config.url)?;
    parse_json_object("variables", &config.variables)?;
    parse_json_object("features", &config.features)?;
    build_header_map(&config.headers)?;
    Ok(())
}

/// Validates crawl behavior settings
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if let Some(year) = config.cutoff_year {
        if !(1970..=9999).contains(&year) {
            return Err(ConfigError::Validation(format!(
                "cutoff-year must be between 1970 and 9999, got {}",
                year
            )));
        }
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file-prefix cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "file-prefix '{}' cannot contain path separators",
            config.file_prefix
        )));
    }

    Ok(())
}

/// Parses the endpoint URL, which must be http or https
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid request url '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "Request url '{}' must use http or https",
            raw
        )));
    }

    Ok(url)
}

/// Parses a parameter bag, which must be a JSON object
pub(crate) fn parse_json_object(field: &str, text: &str) -> Result<Map<String, Value>, ConfigError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ConfigError::InvalidJson {
            field: field.to_string(),
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(ConfigError::InvalidJson {
            field: field.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Converts configured headers into a header map
pub(crate) fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
            name: name.clone(),
            message: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
