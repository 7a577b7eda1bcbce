//! Per-item dispatch of Nylas operations.

use crate::client::HttpCaller;
use crate::error::NylasError;
use crate::output::{api_error, normalize, OutputRecord};
use crate::params::{ParamReader, ParamSource};
use crate::request::build;
use crate::resource::{resolve, Operation};
use crate::validate::{read_grant_id, read_params, validate};
use serde_json::Value;
use std::fmt;

/// What happens to the batch when an item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailPolicy {
    /// The first failure aborts the batch.
    #[default]
    Abort,
    /// Failures become `{"error": ...}` records and the batch goes on.
    Continue,
}

impl FailPolicy {
    pub fn from_continue_on_fail(continue_on_fail: bool) -> Self {
        if continue_on_fail {
            Self::Continue
        } else {
            Self::Abort
        }
    }
}

/// Stage of the item state machine where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadParams,
    Validate,
    Build,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadParams => "read_params",
            Self::Validate => "validate",
            Self::Build => "build",
            Self::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// Result of a batch run.
#[derive(Debug)]
pub struct ExecutionResult {
    /// One record per input item, in input order
    pub records: Vec<OutputRecord>,

    /// Per-item details
    pub item_results: Vec<ItemResult>,

    /// Total execution time in milliseconds
    pub total_ms: f64,
}

/// What happened to a single item.
#[derive(Debug, Clone)]
pub struct ItemResult {
    /// Item index (0-based)
    pub index: usize,

    /// Resolved operation, if resolution got that far
    pub operation: Option<Operation>,

    /// Stage that failed, for items captured under continue-on-fail
    pub failed_stage: Option<Stage>,

    /// Execution time in milliseconds
    pub duration_ms: f64,
}

struct ItemFailure {
    stage: Stage,
    operation: Option<Operation>,
    error: NylasError,
}

/// Run every item through read, validate, build, call and normalize.
///
/// Items are processed one at a time and in order; output `i` belongs to
/// input `i`. Under [`FailPolicy::Abort`] the first failing item's error is
/// returned unchanged and no records are produced. Unknown operations abort
/// regardless of policy.
pub async fn execute<S, C>(
    source: &S,
    item_count: usize,
    caller: &C,
    policy: FailPolicy,
) -> Result<ExecutionResult, NylasError>
where
    S: ParamSource + ?Sized,
    C: HttpCaller + ?Sized,
{
    tracing::info!(items = item_count, policy = ?policy, "Starting Nylas batch");

    let start = std::time::Instant::now();
    let mut records = Vec::with_capacity(item_count);
    let mut item_results = Vec::with_capacity(item_count);

    for index in 0..item_count {
        let item_start = std::time::Instant::now();

        match process_item(source, index, caller).await {
            Ok((operation, record)) => {
                let duration_ms = item_start.elapsed().as_secs_f64() * 1000.0;
                tracing::debug!(item = index, operation = %operation, duration_ms, "Item completed");

                records.push(record);
                item_results.push(ItemResult {
                    index,
                    operation: Some(operation),
                    failed_stage: None,
                    duration_ms,
                });
            }
            Err(failure) => {
                if policy == FailPolicy::Abort || !failure.error.is_recoverable() {
                    tracing::error!(
                        item = index,
                        stage = %failure.stage,
                        error = %failure.error,
                        "Item failed, aborting batch"
                    );
                    return Err(failure.error);
                }

                tracing::warn!(
                    item = index,
                    stage = %failure.stage,
                    error = %failure.error,
                    "Item failed, continuing"
                );

                records.push(OutputRecord::failure(&failure.error));
                item_results.push(ItemResult {
                    index,
                    operation: failure.operation,
                    failed_stage: Some(failure.stage),
                    duration_ms: item_start.elapsed().as_secs_f64() * 1000.0,
                });
            }
        }
    }

    let total_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(items = records.len(), total_ms, "Nylas batch completed");

    Ok(ExecutionResult {
        records,
        item_results,
        total_ms,
    })
}

async fn process_item<S, C>(
    source: &S,
    index: usize,
    caller: &C,
) -> Result<(Operation, OutputRecord), ItemFailure>
where
    S: ParamSource + ?Sized,
    C: HttpCaller + ?Sized,
{
    let reader = ParamReader::new(source, index);
    let fail = |stage: Stage, operation: Option<Operation>| {
        move |error: NylasError| ItemFailure {
            stage,
            operation,
            error,
        }
    };

    let operation = resolve_operation(&reader).map_err(fail(Stage::ReadParams, None))?;
    let op = Some(operation);

    let grant_id = read_grant_id(&reader).map_err(fail(Stage::ReadParams, op))?;
    let params = read_params(operation, &reader).map_err(fail(Stage::ReadParams, op))?;

    let validated = validate(params).map_err(fail(Stage::Validate, op))?;
    let request = build(&grant_id, &validated).map_err(fail(Stage::Build, op))?;

    tracing::debug!(
        item = index,
        resource = %operation.resource(),
        operation = %operation,
        method = %request.method(),
        path = request.path(),
        "Calling Nylas"
    );

    let response: Result<Value, NylasError> = caller.call(&request).await.map_err(api_error);
    let record = normalize(response).map_err(fail(Stage::Execute, op))?;

    Ok((operation, record))
}

fn resolve_operation<S: ParamSource + ?Sized>(
    reader: &ParamReader<'_, S>,
) -> Result<Operation, NylasError> {
    let resource = reader.string("resource")?;
    let operation = reader.string("operation")?;
    resolve(&resource, &operation)
}
