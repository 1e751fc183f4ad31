use std::collections::HashSet;

use openssl::x509::{X509, X509Ref};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::error::{ChainError, Result};

/// Deduplication key for candidate issuers. Two certificates with the same
/// subject, issuer and serial are the same candidate, whatever their encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateIdentity {
    pub subject: String,
    pub issuer: String,
    /// Big-endian hex of the serial number.
    pub serial: String,
}

/// A decoded X.509 certificate together with the fields the resolver reads.
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
    der: Vec<u8>,
    identity: CertificateIdentity,
}

impl Certificate {
    pub fn from_x509(x509: X509) -> Result<Self> {
        let der = x509.to_der()?;
        let identity = {
            let (_, parsed) = X509Certificate::from_der(&der)?;
            CertificateIdentity {
                subject: parsed.subject().to_string(),
                issuer: parsed.issuer().to_string(),
                serial: hex::encode(parsed.raw_serial()),
            }
        };
        Ok(Certificate { x509, der, identity })
    }

    pub fn x509(&self) -> &X509Ref {
        &self.x509
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn identity(&self) -> &CertificateIdentity {
        &self.identity
    }

    pub fn subject(&self) -> &str {
        &self.identity.subject
    }

    pub fn issuer(&self) -> &str {
        &self.identity.issuer
    }

    pub fn serial(&self) -> &str {
        &self.identity.serial
    }

    /// Only a root can sign itself, so these are never useful intermediates.
    pub fn is_self_signed(&self) -> bool {
        self.identity.subject == self.identity.issuer
    }

    pub fn to_pem(&self) -> Result<String> {
        let pem = self.x509.to_pem()?;
        String::from_utf8(pem).map_err(|e| ChainError::SSL(format!("{e}")))
    }
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.identity.subject)
            .field("issuer", &self.identity.issuer)
            .field("serial", &self.identity.serial)
            .finish()
    }
}

/// Candidate intermediates in discovery order, unique by identity.
#[derive(Debug, Default)]
pub struct UntrustedSet {
    certificates: Vec<Certificate>,
    seen: HashSet<CertificateIdentity>,
}

impl UntrustedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, leaving the set untouched, when the identity is already present.
    pub fn insert(&mut self, cert: Certificate) -> bool {
        if !self.seen.insert(cert.identity().clone()) {
            return false;
        }
        self.certificates.push(cert);
        true
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }
}

/// Ordered chain from leaf to root, as read back from a successful verification.
#[derive(Debug)]
pub struct ResolvedChain {
    certificates: Vec<Certificate>,
}

impl ResolvedChain {
    pub fn new(certificates: Vec<Certificate>) -> Result<Self> {
        if certificates.is_empty() {
            return Err(ChainError::NoChainFound(
                "No valid certificate chain found".to_string(),
            ));
        }
        Ok(ResolvedChain { certificates })
    }

    pub fn leaf(&self) -> &Certificate {
        &self.certificates[0]
    }

    pub fn root(&self) -> &Certificate {
        &self.certificates[self.certificates.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }
}
