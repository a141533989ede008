use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(180_000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(480_000);

const COOLDOWN_KEY: &str = "GINI_REQUEST_COOLDOWN_MS";
const TIMEOUT_KEY: &str = "GINI_REQUEST_TIMEOUT_MS";

/// Every external webhook the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Text,
    Image,
    Upload,
    WebDocument,
    Documents,
    Feedback,
    Search,
    DocumentChat,
    History,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::Text,
        Endpoint::Image,
        Endpoint::Upload,
        Endpoint::WebDocument,
        Endpoint::Documents,
        Endpoint::Feedback,
        Endpoint::Search,
        Endpoint::DocumentChat,
        Endpoint::History,
    ];

    pub fn env_key(self) -> &'static str {
        match self {
            Endpoint::Text => "GINI_TEXT_WEBHOOK_URL",
            Endpoint::Image => "GINI_IMAGE_WEBHOOK_URL",
            Endpoint::Upload => "GINI_UPLOAD_WEBHOOK_URL",
            Endpoint::WebDocument => "GINI_WEB_DOC_WEBHOOK_URL",
            Endpoint::Documents => "GINI_DOCS_REGISTRY_URL",
            Endpoint::Feedback => "GINI_FEEDBACK_WEBHOOK_URL",
            Endpoint::Search => "GINI_SEARCH_WEBHOOK_URL",
            Endpoint::DocumentChat => "GINI_DOC_CHAT_WEBHOOK_URL",
            Endpoint::History => "GINI_HISTORY_WEBHOOK_URL",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Text => "Text",
            Endpoint::Image => "Image",
            Endpoint::Upload => "Upload",
            Endpoint::WebDocument => "Web document",
            Endpoint::Documents => "Document registry",
            Endpoint::Feedback => "Feedback",
            Endpoint::Search => "Search",
            Endpoint::DocumentChat => "Document chat",
            Endpoint::History => "History",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    endpoints: HashMap<Endpoint, Url>,
    pub cooldown: Duration,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            cooldown: DEFAULT_COOLDOWN,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut endpoints = HashMap::new();
        for endpoint in Endpoint::ALL {
            let key = endpoint.env_key();
            if let Some(raw) = get(key) {
                let url = Url::parse(raw.trim()).map_err(|err| Error::InvalidConfig {
                    key,
                    reason: err.to_string(),
                })?;
                endpoints.insert(endpoint, url);
            }
        }
        let cooldown = millis(COOLDOWN_KEY, get(COOLDOWN_KEY))?.unwrap_or(DEFAULT_COOLDOWN);
        let timeout = millis(TIMEOUT_KEY, get(TIMEOUT_KEY))?.unwrap_or(DEFAULT_TIMEOUT);
        Ok(Self {
            endpoints,
            cooldown,
            timeout,
        })
    }

    /// Values baked in when the bundle was compiled.
    pub fn from_build_env() -> Result<Self> {
        Self::from_lookup(build_env)
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint, url: Url) -> Self {
        self.endpoints.insert(endpoint, url);
        self
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Result<&Url> {
        self.endpoints
            .get(&endpoint)
            .ok_or(Error::NotConfigured(endpoint))
    }

    pub fn has(&self, endpoint: Endpoint) -> bool {
        self.endpoints.contains_key(&endpoint)
    }
}

fn millis(key: &'static str, value: Option<String>) -> Result<Option<Duration>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|err| Error::InvalidConfig {
                    key,
                    reason: err.to_string(),
                })
        })
        .transpose()
}

fn build_env(key: &str) -> Option<String> {
    let value = match key {
        "GINI_TEXT_WEBHOOK_URL" => option_env!("GINI_TEXT_WEBHOOK_URL"),
        "GINI_IMAGE_WEBHOOK_URL" => option_env!("GINI_IMAGE_WEBHOOK_URL"),
        "GINI_UPLOAD_WEBHOOK_URL" => option_env!("GINI_UPLOAD_WEBHOOK_URL"),
        "GINI_WEB_DOC_WEBHOOK_URL" => option_env!("GINI_WEB_DOC_WEBHOOK_URL"),
        "GINI_DOCS_REGISTRY_URL" => option_env!("GINI_DOCS_REGISTRY_URL"),
        "GINI_FEEDBACK_WEBHOOK_URL" => option_env!("GINI_FEEDBACK_WEBHOOK_URL"),
        "GINI_SEARCH_WEBHOOK_URL" => option_env!("GINI_SEARCH_WEBHOOK_URL"),
        "GINI_DOC_CHAT_WEBHOOK_URL" => option_env!("GINI_DOC_CHAT_WEBHOOK_URL"),
        "GINI_HISTORY_WEBHOOK_URL" => option_env!("GINI_HISTORY_WEBHOOK_URL"),
        "GINI_REQUEST_COOLDOWN_MS" => option_env!("GINI_REQUEST_COOLDOWN_MS"),
        "GINI_REQUEST_TIMEOUT_MS" => option_env!("GINI_REQUEST_TIMEOUT_MS"),
        _ => None,
    };
    value.map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.cooldown, Duration::from_secs(180));
        assert_eq!(config.timeout, Duration::from_secs(8 * 60));
        assert!(!config.has(Endpoint::Text));
        assert!(matches!(
            config.endpoint(Endpoint::Text),
            Err(Error::NotConfigured(Endpoint::Text))
        ));
    }

    #[test]
    fn reads_endpoints_and_durations() {
        let config = Config::from_lookup(lookup(&[
            ("GINI_TEXT_WEBHOOK_URL", "https://hooks.example.com/text"),
            ("GINI_HISTORY_WEBHOOK_URL", " https://hooks.example.com/history "),
            ("GINI_IMAGE_WEBHOOK_URL", ""),
            ("GINI_REQUEST_COOLDOWN_MS", "5000"),
        ]))
        .unwrap();
        assert_eq!(
            config.endpoint(Endpoint::Text).unwrap().as_str(),
            "https://hooks.example.com/text"
        );
        assert!(config.has(Endpoint::History));
        assert!(!config.has(Endpoint::Image));
        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = Config::from_lookup(lookup(&[("GINI_UPLOAD_WEBHOOK_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                key: "GINI_UPLOAD_WEBHOOK_URL",
                ..
            }
        ));

        let err = Config::from_lookup(lookup(&[("GINI_REQUEST_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                key: "GINI_REQUEST_TIMEOUT_MS",
                ..
            }
        ));
    }
}
