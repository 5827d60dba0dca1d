use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;

use super::transport::HttpTransport;

pub fn default_relay_templates() -> Vec<String> {
    vec![
        "https://corsproxy.io/?{url}".to_string(),
        "https://api.allorigins.win/raw?url={url}".to_string(),
        "https://thingproxy.freeboard.io/fetch/{raw}".to_string(),
    ]
}

/// A relay endpoint. `{url}` expands to the percent-encoded target,
/// `{raw}` to the target verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTemplate(String);

impl RelayTemplate {
    pub fn parse(template: &str) -> Result<Self, AppError> {
        let template = template.trim();
        if !template.contains("{url}") && !template.contains("{raw}") {
            return Err(AppError::Config(format!(
                "relay template '{}' has no {{url}} or {{raw}} placeholder",
                template
            )));
        }
        Ok(Self(template.to_string()))
    }

    pub fn expand(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        self.0.replace("{url}", &encoded).replace("{raw}", target)
    }
}

/// Delivers a GET through an ordered list of relays, one bounded attempt
/// per relay, never racing them.
pub struct ProxyRelay {
    transport: Arc<dyn HttpTransport>,
    relays: Vec<RelayTemplate>,
    attempt_timeout: Duration,
}

impl ProxyRelay {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        relays: Vec<RelayTemplate>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            relays,
            attempt_timeout,
        }
    }

    pub fn from_templates(
        transport: Arc<dyn HttpTransport>,
        templates: &[String],
        attempt_timeout: Duration,
    ) -> Result<Self, AppError> {
        let relays = templates
            .iter()
            .map(|t| RelayTemplate::parse(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(transport, relays, attempt_timeout))
    }

    /// Returns the first successful body, or `AllRelaysExhausted` once every
    /// relay has failed.
    pub async fn deliver(&self, target: &str) -> Result<String, AppError> {
        for (idx, relay) in self.relays.iter().enumerate() {
            let url = relay.expand(target);
            match self.transport.get_text(&url, self.attempt_timeout).await {
                Ok(body) => {
                    tracing::debug!(relay = idx, target_url = target, "relay delivered");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::debug!(relay = idx, target_url = target, error = %e, "relay attempt failed");
                }
            }
        }
        Err(AppError::AllRelaysExhausted {
            attempts: self.relays.len(),
        })
    }
}
