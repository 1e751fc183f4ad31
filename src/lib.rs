//! Resolve the missing intermediates of a leaf X.509 certificate.
//!
//! The leaf's Authority Information Access "CA Issuers" pointers are followed
//! breadth-first to collect candidate intermediates, the candidates are
//! verified against a pinned root bundle with OpenSSL, and the resulting chain
//! is emitted as concatenated PEM.
//!
//! ```no_run
//! use mkchain::{ChainResolver, ResolutionOptions};
//!
//! let leaf = std::fs::read("leaf.pem").unwrap();
//! let resolver = ChainResolver::new(ResolutionOptions::default());
//! print!("{}", resolver.chain(&leaf).unwrap());
//! ```

mod aia;
mod assemble;
mod bundle;
mod certs;
mod discover;
mod verifier;

pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

pub use aia::extract_issuer_uri;
pub use assemble::assemble;
pub use bundle::{bundle_url, load_trust_store, TrustStore};
pub use certs::{Certificate, CertificateIdentity, ResolvedChain, UntrustedSet};
pub use config::{CacertDate, ClientConfig, ResolutionOptions};
pub use discover::discover;
pub use error::{ChainError, Result};
pub use fetch::{HttpTransport, IssuerFetcher, Transport};
pub use verifier::Verifier;

use tracing::debug;

use crate::decode::decode;
use crate::utils::is_blank;

/// The resolution engine. Holds the HTTP collaborator and the options for
/// every chain it resolves; each call gets its own fetch cache.
pub struct ChainResolver<T: Transport = HttpTransport> {
    transport: T,
    options: ResolutionOptions,
    config: ClientConfig,
}

impl ChainResolver<HttpTransport> {
    pub fn new(options: ResolutionOptions) -> Self {
        Self::with_config(options, ClientConfig::default())
    }

    pub fn with_config(options: ResolutionOptions, config: ClientConfig) -> Self {
        let transport = HttpTransport::new(&config);
        ChainResolver {
            transport,
            options,
            config,
        }
    }
}

impl<T: Transport> ChainResolver<T> {
    /// Use a custom transport for issuer and root bundle downloads.
    pub fn with_transport(transport: T, options: ResolutionOptions, config: ClientConfig) -> Self {
        ChainResolver {
            transport,
            options,
            config,
        }
    }

    pub fn options(&self) -> &ResolutionOptions {
        &self.options
    }

    /// Resolve and verify the full chain for a PEM or DER leaf certificate.
    ///
    /// Returns:
    /// - Ok: the chain from leaf to root, untrimmed
    /// - Error: InvalidInput before any network access for blank input,
    ///   UnknownFormat, NoChainFound, Bundle or Verification otherwise
    pub fn resolve(&self, input: impl AsRef<[u8]>) -> Result<ResolvedChain> {
        let input = input.as_ref();
        if is_blank(input) {
            return Err(ChainError::InvalidInput(
                "Certificate string cannot be nil or empty".to_string(),
            ));
        }

        let leaf = decode(input)?.into_iter().next().ok_or_else(|| {
            ChainError::InvalidInput("Input contains no certificate".to_string())
        })?;
        debug!(subject = leaf.subject(), issuer = leaf.issuer(), "resolving chain");

        let mut fetcher = IssuerFetcher::new(&self.transport);
        let untrusted = discover(&leaf, &mut fetcher)?;
        debug!(
            candidates = untrusted.len(),
            urls = fetcher.cached_urls(),
            "discovery finished"
        );

        let trust_store = load_trust_store(
            &self.transport,
            &self.config.bundle_base_url,
            self.options.cacert_date.as_ref(),
        )?;

        Verifier::new(&trust_store, &leaf, &untrusted).verify()
    }

    /// Resolve the chain and render it as PEM, trimmed per the options.
    pub fn chain(&self, input: impl AsRef<[u8]>) -> Result<String> {
        let chain = self.resolve(input)?;
        assemble(chain, &self.options)
    }
}
