use std::collections::HashMap;
use std::io::Read;

use tracing::debug;

use crate::certs::Certificate;
use crate::config::ClientConfig;
use crate::decode::{decode_der, decode_pem, DER_SEQUENCE_TAG};
use crate::error::{ChainError, Result};
use crate::utils::leading_bytes_hex;

/// Plain `GET url -> bytes`. Used for issuer URLs and for the root bundle.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url)
    }
}

/// Blocking HTTP(S) transport.
pub struct HttpTransport {
    agent: ureq::Agent,
    max_response_bytes: u64,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();
        HttpTransport {
            agent,
            max_response_bytes: config.max_response_bytes,
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.agent.get(url).call().map_err(|e| fetch_error(url, e))?;

        let max = self.max_response_bytes;
        let mut body = Vec::new();
        response
            .into_reader()
            .take(max.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| fetch_error(url, e))?;
        if body.len() as u64 > max {
            return Err(fetch_error(url, format!("response exceeds {max} bytes")));
        }
        Ok(body)
    }
}

fn fetch_error(url: &str, cause: impl std::fmt::Display) -> ChainError {
    ChainError::Fetch(format!("Failed to fetch certificates from {url}: {cause}"))
}

/// Resolves issuer URLs to certificates, memoized per URL.
///
/// One fetcher lives for exactly one resolution; it is never shared.
pub struct IssuerFetcher<T: Transport> {
    transport: T,
    cache: HashMap<String, Vec<Certificate>>,
}

impl<T: Transport> IssuerFetcher<T> {
    pub fn new(transport: T) -> Self {
        IssuerFetcher {
            transport,
            cache: HashMap::new(),
        }
    }

    /// Fetch and decode `url`. Failures are returned, not cached.
    pub fn fetch(&mut self, url: &str) -> Result<Vec<Certificate>> {
        if let Some(certs) = self.cache.get(url) {
            debug!(url, "issuer cache hit");
            return Ok(certs.clone());
        }

        debug!(url, "fetching issuer certificates");
        let data = self.transport.get(url)?;
        let certs = if data.starts_with(b"-----BEGIN ") {
            decode_pem(&data)?
        } else if data.first() == Some(&DER_SEQUENCE_TAG) {
            decode_der(&data)?
        } else {
            return Err(ChainError::UnknownFormat(format!(
                "Unknown certificate format - found leading bytes: {}",
                leading_bytes_hex(&data)
            )));
        };

        self.cache.insert(url.to_string(), certs.clone());
        Ok(certs)
    }

    pub fn cached_urls(&self) -> usize {
        self.cache.len()
    }
}
