use std::sync::Arc;

use aws_sdk_route53::Client;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use log::{debug, info};
use tokio::runtime::Runtime;

use crate::error::ServiceError;

use super::{DnsZoneWriter, RecordUpsert};

const SERVICE: &str = "Route53";
const OPERATION: &str = "ChangeResourceRecordSets";

pub struct Route53ZoneWriter {
    client: Client,
    runtime: Arc<Runtime>,
}

impl Route53ZoneWriter {
    pub fn new(client: Client, runtime: Arc<Runtime>) -> Self {
        Self { client, runtime }
    }

    fn build_change(record: &RecordUpsert) -> Result<Change, ServiceError> {
        let record_set = ResourceRecordSet::builder()
            .name(&record.name)
            .set_type(Some(RrType::from(record.record_type.as_str())))
            .ttl(record.ttl)
            .set_resource_records(Some(vec![
                ResourceRecord::builder()
                    .value(&record.value)
                    .build()
                    .map_err(|e| {
                        ServiceError::call(
                            SERVICE,
                            OPERATION,
                            format!("Failed to build ResourceRecord: {e}"),
                        )
                    })?,
            ]))
            .build()
            .map_err(|e| {
                ServiceError::call(
                    SERVICE,
                    OPERATION,
                    format!("Failed to build ResourceRecordSet: {e}"),
                )
            })?;

        Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()
            .map_err(|e| ServiceError::call(SERVICE, OPERATION, format!("Failed to build Change: {e}")))
    }
}

impl DnsZoneWriter for Route53ZoneWriter {
    fn upsert_records(
        &self,
        zone_id: &str,
        comment: &str,
        records: &[RecordUpsert],
    ) -> Result<(), ServiceError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut changes = Vec::with_capacity(records.len());
        for record in records {
            info!(
                "[route53] UPSERT hosted zone {}: {} {} {}",
                zone_id, record.name, record.record_type, record.value
            );
            changes.push(Self::build_change(record)?);
        }

        let change_batch = ChangeBatch::builder()
            .comment(comment)
            .set_changes(Some(changes))
            .build()
            .map_err(|e| {
                ServiceError::call(SERVICE, OPERATION, format!("Failed to build ChangeBatch: {e}"))
            })?;

        self.runtime
            .block_on(
                self.client
                    .change_resource_record_sets()
                    .hosted_zone_id(zone_id)
                    .change_batch(change_batch)
                    .send(),
            )
            .map_err(|err| {
                ServiceError::call(SERVICE, OPERATION, DisplayErrorContext(&err).to_string())
            })?;

        debug!(
            "[route53] submitted {} change(s) to hosted zone {}",
            records.len(),
            zone_id
        );
        Ok(())
    }
}
