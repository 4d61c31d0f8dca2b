use crate::error::ServiceError;

mod route53;

pub use route53::Route53ZoneWriter;

/// A record set to create or replace in a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpsert {
    pub name: String,
    pub record_type: String,
    pub value: String,
    pub ttl: i64,
}

/// DNS zone operations needed to publish validation records.
pub trait DnsZoneWriter: Send + Sync {
    /// Applies every upsert in a single change batch.
    fn upsert_records(
        &self,
        zone_id: &str,
        comment: &str,
        records: &[RecordUpsert],
    ) -> Result<(), ServiceError>;
}
