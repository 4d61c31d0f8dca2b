use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::domain::canonical_domain;
use crate::error::{RequestorError, RequestorResult};
use crate::issuance::authority::TransparencyPreference;

/// What the stack asked for, rebuilt fresh on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredCertificateSpec {
    pub domain: String,
    /// Never contains `domain`.
    pub sans: BTreeSet<String>,
    pub hosted_zone_id: String,
    pub region: String,
    pub transparency: Option<TransparencyPreference>,
}

/// Extracts the desired certificate from `ResourceProperties`.
pub fn parse_desired_state(
    properties: Option<&Map<String, Value>>,
    default_region: &str,
) -> RequestorResult<DesiredCertificateSpec> {
    let empty = Map::new();
    let properties = properties.unwrap_or(&empty);

    let raw_domain = required_string(properties, "DomainName")?;
    if raw_domain.trim_end_matches('.').is_empty() {
        return Err(RequestorError::MissingField("DomainName"));
    }
    let domain = domain_property("DomainName", &raw_domain)?;
    let hosted_zone_id = required_string(properties, "HostedZoneId")?;

    let sans = match properties.get("SubjectAlternativeNames") {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(items)) => {
            let mut names = BTreeSet::new();
            for item in items {
                let name = item.as_str().ok_or_else(|| RequestorError::InvalidProperty {
                    name: "SubjectAlternativeNames",
                    value: item.to_string(),
                })?;
                if name.trim().trim_end_matches('.').is_empty() {
                    continue;
                }
                let name = domain_property("SubjectAlternativeNames", name)?;
                if name != domain {
                    names.insert(name);
                }
            }
            names
        }
        Some(other) => {
            return Err(RequestorError::InvalidProperty {
                name: "SubjectAlternativeNames",
                value: other.to_string(),
            });
        }
    };

    let region = optional_string(properties, "Region")
        .unwrap_or_else(|| default_region.to_string());

    let transparency = match optional_string(properties, "CertificateTransparencyLoggingPreference") {
        None => None,
        Some(raw) => Some(TransparencyPreference::parse(&raw).ok_or(
            RequestorError::InvalidProperty {
                name: "CertificateTransparencyLoggingPreference",
                value: raw,
            },
        )?),
    };

    Ok(DesiredCertificateSpec {
        domain,
        sans,
        hosted_zone_id,
        region,
        transparency,
    })
}

fn domain_property(name: &'static str, raw: &str) -> RequestorResult<String> {
    canonical_domain(raw).map_err(|err| RequestorError::InvalidProperty {
        name,
        value: err.to_string(),
    })
}

fn required_string(properties: &Map<String, Value>, key: &'static str) -> RequestorResult<String> {
    optional_string(properties, key).ok_or(RequestorError::MissingField(key))
}

fn optional_string(properties: &Map<String, Value>, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
