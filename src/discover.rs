use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::aia::extract_issuer_uri;
use crate::certs::{Certificate, UntrustedSet};
use crate::error::{ChainError, Result};
use crate::fetch::{IssuerFetcher, Transport};

/// Walk CA Issuers pointers breadth-first from `leaf`, collecting every
/// non-self-signed certificate reachable that way.
///
/// A certificate is enqueued only the first time its identity is seen, which
/// is also what stops cycles. A failed fetch or decode prunes that branch.
pub fn discover<T: Transport>(
    leaf: &Certificate,
    fetcher: &mut IssuerFetcher<T>,
) -> Result<UntrustedSet> {
    let mut untrusted = UntrustedSet::new();
    let mut queue = VecDeque::from([leaf.clone()]);

    while let Some(current) = queue.pop_front() {
        let Some(url) = extract_issuer_uri(&current) else {
            debug!(subject = current.subject(), "no CA issuers URI");
            continue;
        };

        let candidates = match fetcher.fetch(&url) {
            Ok(certs) => certs,
            Err(e) => {
                warn!(
                    url = %url,
                    subject = current.subject(),
                    error = %e,
                    "pruning unreachable issuer"
                );
                continue;
            }
        };

        for candidate in candidates {
            if candidate.is_self_signed() {
                debug!(subject = candidate.subject(), "skipping self-signed certificate");
                continue;
            }
            if untrusted.insert(candidate.clone()) {
                debug!(subject = candidate.subject(), url = %url, "found intermediate");
                queue.push_back(candidate);
            } else {
                debug!(subject = candidate.subject(), "skipping duplicate intermediate");
            }
        }
    }

    if untrusted.is_empty() {
        return Err(ChainError::NoChainFound(
            "No intermediate certificates found".to_string(),
        ));
    }
    Ok(untrusted)
}
