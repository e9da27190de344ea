use serde_json::Value;
use tracing::{debug, trace};

use crate::Result;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{self, API_PATH, Command};
use crate::types::StatusSnapshot;

pub struct FancoilClientBuilder {
    ip: String,
    protocol: String,
    mock: bool,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl FancoilClientBuilder {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            protocol: "http".to_string(),
            mock: false,
            log_mode: None,
            log_path: None,
        }
    }

    pub fn protocol(mut self, proto: &str) -> Self {
        self.protocol = proto.to_string();
        self
    }

    /// Serve the canned status payload and accept every command
    /// without touching the network. For local development only.
    pub fn mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> FancoilClient {
        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => {
                Some(MessageLogger::new(mode, &path).expect("failed to open log file"))
            }
            _ => None,
        };

        FancoilClient {
            http: reqwest::Client::new(),
            base_url: format!("{}://{}", self.protocol, self.ip),
            protocol: self.protocol,
            mock: self.mock,
            logger,
        }
    }
}

/// Thin HTTP wrapper for one appliance. The only module that talks to
/// the network; timeouts are whatever `reqwest` defaults to.
pub struct FancoilClient {
    http: reqwest::Client,
    base_url: String,
    protocol: String,
    mock: bool,
    logger: Option<MessageLogger>,
}

impl FancoilClient {
    pub fn builder(ip: impl Into<String>) -> FancoilClientBuilder {
        FancoilClientBuilder::new(ip)
    }

    /// Retarget the client after an address-changed signal.
    pub fn set_ip(&mut self, ip: &str) {
        self.base_url = format!("{}://{}", self.protocol, ip);
    }

    pub async fn status(&mut self) -> Result<StatusSnapshot> {
        if self.mock {
            trace!("mock mode, serving canned status");
            return Ok(protocol::mock_snapshot());
        }

        let result = self.fetch_status().await;
        if let Err(err) = &result
            && let Some(logger) = self.logger.as_mut()
        {
            logger.log_fetch_error(&err.to_string());
        }
        result
    }

    async fn fetch_status(&mut self) -> Result<StatusSnapshot> {
        let url = format!("{}/{}/status", self.base_url, API_PATH);
        debug!(url = %url, "fetching status");

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let body = resp.text().await?;

        if let Some(ref mut logger) = self.logger {
            let body_json = serde_json::from_str(&body).unwrap_or(Value::Null);
            logger.log_status(&body_json);
        }

        protocol::parse_status_response(&body)
    }

    pub async fn send(&mut self, command: &Command) -> Result<()> {
        let route = command.route();
        let body = command.body();

        if let Some(ref mut logger) = self.logger {
            logger.log_command(&route, body.as_ref());
        }

        if self.mock {
            trace!(route = %route, "mock mode, accepting command");
            return Ok(());
        }

        let url = format!("{}/{}/{}", self.base_url, API_PATH, route);
        debug!(url = %url, "sending command");

        let mut request = self.http.post(&url);
        if let Some(ref b) = body {
            request = request.json(b);
        }
        let resp = request.send().await?.error_for_status()?;
        let text = resp.text().await?;

        protocol::parse_command_reply(&text, &route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_client_serves_canned_status() {
        let mut client = FancoilClient::builder("192.0.2.1").mock(true).build();
        let snapshot = client.status().await.unwrap();
        assert_eq!(snapshot.raw.sp, 220);
        assert_eq!(snapshot.raw.ps, 1);
    }

    #[tokio::test]
    async fn mock_client_accepts_commands() {
        let mut client = FancoilClient::builder("192.0.2.1").mock(true).build();
        client.send(&Command::Power(true)).await.unwrap();
    }

    #[test]
    fn set_ip_retargets_base_url() {
        let mut client = FancoilClient::builder("192.0.2.1").build();
        assert_eq!(client.base_url, "http://192.0.2.1");
        client.set_ip("192.0.2.9");
        assert_eq!(client.base_url, "http://192.0.2.9");
    }
}
