use std::io::Write;
use std::path::Path;

use openssl::ssl::SslFiletype;
use openssl::x509::store::{X509Lookup, X509Store, X509StoreBuilder};
use tracing::info;

use crate::config::CacertDate;
use crate::error::{ChainError, Result};
use crate::fetch::Transport;

const REVISIONS_HINT: &str =
    "For a subset of available revisions, visit https://curl.se/docs/caextract.html";

/// Trusted roots from one pinned bundle revision.
pub struct TrustStore {
    store: X509Store,
    revision: String,
}

impl TrustStore {
    pub fn store(&self) -> &X509Store {
        &self.store
    }

    /// `latest` or the bundle date.
    pub fn revision(&self) -> &str {
        &self.revision
    }
}

pub fn revision_name(date: Option<&CacertDate>) -> String {
    date.map_or_else(|| "latest".to_string(), |d| d.to_string())
}

pub fn bundle_url(base_url: &str, date: Option<&CacertDate>) -> String {
    let base_url = base_url.trim_end_matches('/');
    match date {
        Some(date) => format!("{base_url}/cacert-{date}.pem"),
        None => format!("{base_url}/cacert.pem"),
    }
}

/// Download the bundle for `date` and load it into an OpenSSL store.
///
/// The bundle is staged in a temporary file for OpenSSL's file lookup; the
/// file is removed when this function returns, on every path.
pub fn load_trust_store<T: Transport>(
    transport: &T,
    base_url: &str,
    date: Option<&CacertDate>,
) -> Result<TrustStore> {
    let revision = revision_name(date);
    let url = bundle_url(base_url, date);

    let pem = transport.get(&url).map_err(|e| {
        ChainError::Bundle(format!(
            "No CA bundle found for revision {revision}: {e}. {REVISIONS_HINT}"
        ))
    })?;

    let store = stage_and_load(&pem, &revision).map_err(|e| {
        ChainError::Bundle(format!(
            "Failed to load CA bundle ({revision}): {e}. {REVISIONS_HINT}"
        ))
    })?;

    info!(revision = %revision, url = %url, "loaded root bundle");
    Ok(TrustStore { store, revision })
}

fn stage_and_load(pem: &[u8], revision: &str) -> Result<X509Store> {
    stage_and_load_in(&std::env::temp_dir(), pem, revision)
}

fn stage_and_load_in(dir: &Path, pem: &[u8], revision: &str) -> Result<X509Store> {
    let mut staged = tempfile::Builder::new()
        .prefix(&format!("cacert-{revision}-"))
        .suffix(".pem")
        .tempfile_in(dir)?;
    staged.write_all(pem)?;
    staged.flush()?;

    let mut builder = X509StoreBuilder::new()?;
    builder
        .add_lookup(X509Lookup::file())?
        .load_cert_file(staged.path(), SslFiletype::PEM)?;
    Ok(builder.build())
}
