use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a certificate as reported by the PKI service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertificateStatus {
    PendingValidation,
    Issued,
    Inactive,
    Expired,
    ValidationTimedOut,
    Revoked,
    Failed,
    Other(String),
}

impl CertificateStatus {
    /// Statuses the locator considers reusable.
    pub const REUSABLE: [CertificateStatus; 3] = [
        CertificateStatus::Issued,
        CertificateStatus::PendingValidation,
        CertificateStatus::Inactive,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingValidation => "PENDING_VALIDATION",
            Self::Issued => "ISSUED",
            Self::Inactive => "INACTIVE",
            Self::Expired => "EXPIRED",
            Self::ValidationTimedOut => "VALIDATION_TIMED_OUT",
            Self::Revoked => "REVOKED",
            Self::Failed => "FAILED",
            Self::Other(raw) => raw,
        }
    }

    /// Terminal statuses that will never turn into `Issued`.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::Failed | Self::ValidationTimedOut | Self::Revoked
        )
    }
}

impl From<&str> for CertificateStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "PENDING_VALIDATION" => Self::PendingValidation,
            "ISSUED" => Self::Issued,
            "INACTIVE" => Self::Inactive,
            "EXPIRED" => Self::Expired,
            "VALIDATION_TIMED_OUT" => Self::ValidationTimedOut,
            "REVOKED" => Self::Revoked,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    PendingValidation,
    Success,
    Failed,
}

/// A DNS record the PKI service requires before it will issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsValidationChallenge {
    pub record_name: String,
    pub record_type: String,
    pub record_value: String,
    pub status: ChallengeStatus,
}

impl DnsValidationChallenge {
    /// Challenges worth publishing: still pending, or already satisfied and must stay in place.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self.status,
            ChallengeStatus::PendingValidation | ChallengeStatus::Success
        )
    }
}

/// Read-through snapshot of a certificate owned by the PKI service.
#[derive(Debug, Clone)]
pub struct CertificateRecord {
    pub arn: String,
    pub domain: String,
    /// Additional names only; never includes `domain`.
    pub sans: BTreeSet<String>,
    pub status: CertificateStatus,
    pub validation_challenges: Vec<DnsValidationChallenge>,
    pub created_at: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl CertificateRecord {
    /// Exact match: same primary domain and the same SAN set, nothing more or less.
    pub fn matches(&self, domain: &str, sans: &BTreeSet<String>) -> bool {
        self.domain == domain && self.sans == *sans
    }
}

/// Inventory entry returned by a certificate listing.
#[derive(Debug, Clone)]
pub struct CertificateSummary {
    pub arn: String,
    pub domain: String,
    pub status: Option<CertificateStatus>,
}
