#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use mkchain::{ChainError, Result, Transport};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509Builder, X509Extension, X509NameBuilder, X509Ref, X509};

pub const INTERMEDIATE_URL: &str = "http://pki.example.test/intermediate.der";
pub const ROOT_URL: &str = "http://pki.example.test/root.der";
pub const LATEST_BUNDLE_URL: &str = "https://curl.se/ca/cacert.pem";

pub struct Issued {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl Issued {
    pub fn pem(&self) -> String {
        String::from_utf8(self.cert.to_pem().unwrap()).unwrap()
    }

    pub fn der(&self) -> Vec<u8> {
        self.cert.to_der().unwrap()
    }
}

/// Root -> intermediate -> leaf, with the leaf's AIA pointing at
/// `INTERMEDIATE_URL` and the intermediate's at `ROOT_URL`.
pub struct Pki {
    pub root: Issued,
    pub intermediate: Issued,
    pub leaf: Issued,
}

impl Pki {
    pub fn new() -> Self {
        let root = issue("Test Root CA", 1, None, true, None);
        let intermediate = issue("Test Intermediate CA", 2, Some(&root), true, Some(ROOT_URL));
        let leaf = issue("example.com", 3, Some(&intermediate), false, Some(INTERMEDIATE_URL));
        Pki {
            root,
            intermediate,
            leaf,
        }
    }

    /// Serves the intermediate as DER, the root at its AIA URL, and the root
    /// as the latest bundle.
    pub fn transport(&self) -> MapTransport {
        MapTransport::new()
            .with(INTERMEDIATE_URL, self.intermediate.der())
            .with(ROOT_URL, self.root.der())
            .with(LATEST_BUNDLE_URL, self.root.pem().into_bytes())
    }
}

pub fn key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

/// Issue a certificate signed by `issuer`, or self-signed when `issuer` is None.
pub fn issue(
    common_name: &str,
    serial: u32,
    issuer: Option<&Issued>,
    ca: bool,
    ca_issuers_uri: Option<&str>,
) -> Issued {
    let key = key();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some(issuer) => builder.set_issuer_name(issuer.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(&key).unwrap();

    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
    builder
        .set_not_before(&Asn1Time::from_unix(now - 3600).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(now + 86400).unwrap())
        .unwrap();

    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        builder
            .append_extension(
                KeyUsage::new()
                    .critical()
                    .key_cert_sign()
                    .crl_sign()
                    .build()
                    .unwrap(),
            )
            .unwrap();
    }

    if let Some(uri) = ca_issuers_uri {
        let issuer_cert: Option<&X509Ref> = issuer.map(|i| &*i.cert);
        #[allow(deprecated)]
        let ext = {
            let ctx = builder.x509v3_context(issuer_cert, None);
            X509Extension::new_nid(
                None,
                Some(&ctx),
                Nid::INFO_ACCESS,
                &format!("caIssuers;URI:{uri}"),
            )
            .unwrap()
        };
        builder.append_extension(ext).unwrap();
    }

    let signer = issuer.map(|i| &i.key).unwrap_or(&key);
    builder.sign(signer, MessageDigest::sha256()).unwrap();

    Issued {
        cert: builder.build(),
        key,
    }
}

/// In-memory transport that counts requests per URL.
#[derive(Default)]
pub struct MapTransport {
    responses: HashMap<String, Vec<u8>>,
    calls: RefCell<HashMap<String, usize>>,
}

impl MapTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), body.into());
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.borrow().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }
}

impl Transport for MapTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        *self.calls.borrow_mut().entry(url.to_string()).or_default() += 1;
        self.responses.get(url).cloned().ok_or_else(|| {
            ChainError::Fetch(format!(
                "Failed to fetch certificates from {url}: status code 404"
            ))
        })
    }
}
