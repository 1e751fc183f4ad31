use crate::certs::ResolvedChain;
use crate::config::ResolutionOptions;
use crate::error::Result;

/// Concatenated PEM of the chain, leaf and root trimmed unless requested.
///
/// Each end is trimmed independently, so a one-certificate chain with both
/// flags off yields an empty string.
pub fn assemble(chain: ResolvedChain, options: &ResolutionOptions) -> Result<String> {
    let mut certs = chain.certificates();
    if !options.include_root {
        certs = certs.split_last().map_or(certs, |(_, rest)| rest);
    }
    if !options.include_leaf {
        certs = certs.split_first().map_or(certs, |(_, rest)| rest);
    }

    let mut pem = String::new();
    for cert in certs {
        pem.push_str(&cert.to_pem()?);
    }
    Ok(pem)
}
