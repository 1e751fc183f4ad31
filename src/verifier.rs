use openssl::stack::Stack;
use openssl::x509::{X509StoreContext, X509};
use tracing::info;

use crate::bundle::TrustStore;
use crate::certs::{Certificate, ResolvedChain, UntrustedSet};
use crate::error::{ChainError, Result};

/// Standard X.509 path validation of a leaf against a trust store, with the
/// discovered intermediates offered as untrusted candidates.
pub struct Verifier<'a> {
    trust_store: &'a TrustStore,
    leaf: &'a Certificate,
    untrusted: &'a UntrustedSet,
}

impl<'a> Verifier<'a> {
    pub fn new(
        trust_store: &'a TrustStore,
        leaf: &'a Certificate,
        untrusted: &'a UntrustedSet,
    ) -> Self {
        Verifier {
            trust_store,
            leaf,
            untrusted,
        }
    }

    /// Returns the chain OpenSSL built, leaf first and root last.
    pub fn verify(&self) -> Result<ResolvedChain> {
        let mut candidates = Stack::new()?;
        for cert in self.untrusted.iter() {
            candidates.push(cert.x509().to_owned())?;
        }

        let mut ctx = X509StoreContext::new()?;
        let outcome = ctx.init(
            self.trust_store.store(),
            self.leaf.x509(),
            &candidates,
            |c| {
                if c.verify_cert()? {
                    let chain: Vec<X509> = c
                        .chain()
                        .map(|stack| stack.iter().map(|x509| x509.to_owned()).collect())
                        .unwrap_or_default();
                    return Ok(Ok(chain));
                }
                let depth = c.error_depth();
                let at = c
                    .current_cert()
                    .and_then(|cert| Certificate::from_x509(cert.to_owned()).ok())
                    .map(|cert| cert.subject().to_string())
                    .unwrap_or_else(|| "<unknown certificate>".to_string());
                Ok(Err(format!(
                    "{} (depth {} on {})",
                    c.error().error_string(),
                    depth,
                    at
                )))
            },
        )?;

        let chain = outcome.map_err(ChainError::Verification)?;
        let chain = ResolvedChain::new(
            chain
                .into_iter()
                .map(Certificate::from_x509)
                .collect::<Result<Vec<_>>>()?,
        )?;

        info!(
            length = chain.len(),
            revision = self.trust_store.revision(),
            root = chain.root().subject(),
            "verified chain"
        );
        Ok(chain)
    }
}
