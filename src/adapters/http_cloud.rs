//! Cloud adapter over plain HTTP GET (ESP-IDF HTTP client).
//!
//! ```text
//!   push:  GET {endpoint}/batch/update?token={token}&temp_0=21.5&lux=310&…
//!   pull:  GET {endpoint}/get?token={token}&{key}        ──▶ body
//! ```
//!
//! One connection is pooled between calls.  It is dropped by
//! [`CloudPort::reclaim`], after a transport error, and when a response
//! body is too long to drain.  Transport failures are classified into
//! [`CloudError`] variants so the retry policy can tell a dead link from
//! a heap that is too fragmented for the TLS buffers.

use core::time::Duration;

use embedded_svc::http::Status;
use embedded_svc::http::client::Client;
use embedded_svc::io::Read;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::io::EspIOError;
use esp_idf_svc::sys::{
    ESP_ERR_HTTP_CONNECT, ESP_ERR_HTTP_EAGAIN, ESP_ERR_NO_MEM, ESP_ERR_TIMEOUT, esp_err_t,
};
use heapless::String;
use log::{debug, warn};

use crate::adapters::http_body::{Body, DRAIN_LIMIT, read_capped};
use crate::app::ports::CloudPort;
use crate::config::{CloudConfig, NetworkConfig};
use crate::error::CloudError;
use crate::telemetry::TelemetryPayload;

/// Longest body accepted from a pull.
const MAX_BODY: usize = 64;

pub struct HttpCloud {
    endpoint: String<128>,
    token: String<64>,
    timeout: Duration,
    client: Option<Client<EspHttpConnection>>,
}

fn classify(e: EspIOError) -> CloudError {
    let code = e.0.code();
    match code {
        c if c == ESP_ERR_HTTP_CONNECT as esp_err_t => CloudError::HostUnreachable,
        c if c == ESP_ERR_NO_MEM as esp_err_t => CloudError::OutOfMemory,
        c if c == ESP_ERR_TIMEOUT as esp_err_t || c == ESP_ERR_HTTP_EAGAIN as esp_err_t => {
            CloudError::Timeout
        }
        _ => {
            debug!("HTTP error rc={}", code);
            CloudError::Other
        }
    }
}

impl HttpCloud {
    pub fn new(cloud: &CloudConfig, network: &NetworkConfig) -> Self {
        if cloud.token.is_empty() {
            warn!("Cloud token is empty, the endpoint will reject every request");
        }
        Self {
            endpoint: cloud.endpoint.clone(),
            token: cloud.token.clone(),
            timeout: Duration::from_secs(u64::from(network.request_timeout_secs)),
            client: None,
        }
    }

    fn client(&mut self) -> Result<&mut Client<EspHttpConnection>, CloudError> {
        if self.client.is_none() {
            let conf = Configuration {
                timeout: Some(self.timeout),
                ..Default::default()
            };
            let conn = EspHttpConnection::new(&conf).map_err(|e| classify(e.into()))?;
            self.client = Some(Client::wrap(conn));
        }
        self.client.as_mut().ok_or(CloudError::Other)
    }

    /// Send the request and read the status and the body into `buf`.
    fn exchange(&mut self, url: &str, buf: &mut [u8]) -> Result<(u16, Body), CloudError> {
        let client = self.client()?;
        let request = client.get(url).map_err(classify)?;
        let mut response = request.submit().map_err(classify)?;
        let status = response.status();
        let body = read_capped(buf, |b| response.read(b)).map_err(classify)?;
        Ok((status, body))
    }

    /// GET `url` and return up to [`MAX_BODY`] bytes of the body.  The
    /// pooled connection is dropped unless the body was read to its end.
    fn get(&mut self, url: &str) -> Result<std::string::String, CloudError> {
        let mut buf = [0u8; MAX_BODY];
        let (status, body) = match self.exchange(url, &mut buf) {
            Ok(r) => r,
            Err(e) => {
                self.client = None;
                return Err(e);
            }
        };
        if !body.complete {
            warn!("HTTP body exceeds {} bytes, dropping the connection", MAX_BODY + DRAIN_LIMIT);
            self.client = None;
        }

        if !(200..300).contains(&status) {
            return Err(CloudError::Rejected(status));
        }
        Ok(std::string::String::from_utf8_lossy(&buf[..body.len]).into_owned())
    }
}

impl CloudPort for HttpCloud {
    fn push(&mut self, payload: &TelemetryPayload) -> Result<(), CloudError> {
        let url = format!(
            "{}/batch/update?token={}&{}",
            self.endpoint,
            self.token,
            payload.to_query()
        );
        self.get(&url).map(|_| ())
    }

    fn pull(&mut self, key: &str) -> Result<std::string::String, CloudError> {
        let url = format!("{}/get?token={}&{}", self.endpoint, self.token, key);
        self.get(&url)
    }

    fn reclaim(&mut self) {
        if self.client.take().is_some() {
            debug!("HTTP client dropped");
        }
    }
}
