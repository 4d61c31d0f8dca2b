use std::collections::BTreeSet;

use anyhow::{Result, anyhow};

/// Canonical form used for every domain comparison: trimmed, A-label (punycode),
/// lowercase, no trailing dot. A leading `*.` wildcard label is kept as is.
pub fn canonical_domain(input: &str) -> Result<String> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(anyhow!("domain name is required"));
    }
    let (wildcard, name) = match trimmed.strip_prefix("*.") {
        Some(rest) => ("*.", rest),
        None => ("", trimmed),
    };
    let ascii =
        idna::domain_to_ascii(name).map_err(|err| anyhow!("invalid domain name {trimmed}: {err}"))?;
    Ok(format!("{wildcard}{}", ascii.to_lowercase()))
}

/// Lenient variant for names reported by the certificate service. Names that fail
/// IDNA conversion are only trimmed and lowercased.
pub fn normalize_domain(input: &str) -> String {
    canonical_domain(input)
        .unwrap_or_else(|_| input.trim().trim_end_matches('.').to_lowercase())
}

/// Normalizes SAN entries into a set that never contains the primary domain.
pub fn normalize_sans<I, S>(primary: &str, names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let primary = normalize_domain(primary);
    names
        .into_iter()
        .map(|name| normalize_domain(name.as_ref()))
        .filter(|name| !name.is_empty() && *name != primary)
        .collect()
}

/// Route 53 accepts bare zone ids; CloudFormation often hands out `/hostedzone/Z123`.
pub fn normalize_zone_id(zone_id: &str) -> String {
    zone_id.trim().replace("/hostedzone/", "")
}
