use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Serialize;

use crate::store::ObjectStore;
use crate::transformer::RecordTransformer;

const COMPLETION_MESSAGE: &str = "Processing complete";

/// Status record returned to the invoker once every record is written.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Response {
    status_code: u16,
    body: String,
}

impl Response {
    fn complete() -> Result<Self, Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(COMPLETION_MESSAGE)?,
        })
    }
}

pub(crate) async fn function_handler<S: ObjectStore>(
    event: LambdaEvent<S3Event>,
    transformer: &RecordTransformer<S>,
) -> Result<Response, Error> {
    let payload = event.payload;
    let raw_event = serde_json::to_string(&payload)?;
    tracing::info!(event = %raw_event, "Event received");
    if payload.records.is_empty() {
        tracing::warn!("No records found in S3 event");
        return Response::complete();
    }

    let outcomes = transformer.process_event(&payload).await?;
    let removed: usize = outcomes.iter().map(|o| o.removed_columns.len()).sum();
    tracing::info!(
        records = outcomes.len(),
        removed_columns = removed,
        "Processing complete"
    );
    Response::complete()
}
