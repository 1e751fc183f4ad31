use asn1_rs::{oid, Oid};
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::certs::Certificate;

/// id-ad-caIssuers
const CA_ISSUERS: Oid<'static> = oid!(1.3.6.1.5.5.7.48.2);

/// First http(s) "CA Issuers" URI in the certificate's Authority Information
/// Access extension. A missing extension or entry is not an error.
pub fn extract_issuer_uri(cert: &Certificate) -> Option<String> {
    let (_, parsed) = X509Certificate::from_der(cert.der()).ok()?;

    parsed.extensions().iter().find_map(|ext| {
        let ParsedExtension::AuthorityInfoAccess(aia) = ext.parsed_extension() else {
            return None;
        };
        aia.accessdescs.iter().find_map(|desc| match &desc.access_location {
            GeneralName::URI(uri) if desc.access_method == CA_ISSUERS && is_http(uri) => {
                Some(uri.to_string())
            }
            _ => None,
        })
    })
}

fn is_http(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
