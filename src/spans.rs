//! Span constructors shared by the lane components
//!
//! Span names are static (`ccip_rs.<operation>`) and identifying data goes
//! into structured attributes, so traces from many lanes aggregate cleanly.
//! Spans that can fail carry empty `error.*` fields and an
//! `otel.status_code` which [`record_error`] fills in.
//!
//! # Example
//!
//! ```rust,no_run
//! use ccip_rs::{spans, ChainSelector, Interval};
//!
//! let span = spans::commit(ChainSelector::new(1), ChainSelector::new(2), Interval::new(1, 10));
//! span.in_scope(|| tracing::info!(event = "custom_commit_check"));
//! ```

use alloy_primitives::B256;
use tracing::Span;
use url::Url;

use crate::protocol::{Address, ChainSelector, Interval};

/// `ccip_rs.send`: one OnRamp admission. Pool `lock_or_burn` calls nest
/// inside it; the sequence number and message id are recorded once assigned.
pub fn send(dest_chain_selector: ChainSelector, sender: &Address, token_count: usize) -> Span {
    tracing::info_span!(
        "ccip_rs.send",
        dest_chain_selector = %dest_chain_selector,
        sender = %sender,
        token_count = token_count,
        sequence_number = tracing::field::Empty,
        message_id = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// `ccip_rs.commit`: validation and storage of one commit report.
pub fn commit(
    source_chain_selector: ChainSelector,
    dest_chain_selector: ChainSelector,
    interval: Interval,
) -> Span {
    tracing::info_span!(
        "ccip_rs.commit",
        source_chain_selector = %source_chain_selector,
        dest_chain_selector = %dest_chain_selector,
        interval = %interval,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// `ccip_rs.execute`: a single OffRamp execution attempt.
///
/// Opened by the executor directly or under `ccip_rs.manually_execute`.
/// Token releases and `ccip_rs.ccip_receive` run inside it, and the final
/// execution state lands in the `state` field.
pub fn execute(
    source_chain_selector: ChainSelector,
    sequence_number: u64,
    message_id: &B256,
    manual: bool,
) -> Span {
    tracing::info_span!(
        "ccip_rs.execute",
        source_chain_selector = %source_chain_selector,
        sequence_number = sequence_number,
        message_id = %message_id,
        manual = manual,
        state = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// `ccip_rs.manually_execute`: an operator batch, one `ccip_rs.execute`
/// child per report.
pub fn manually_execute(report_count: usize) -> Span {
    tracing::info_span!(
        "ccip_rs.manually_execute",
        report_count = report_count,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// `ccip_rs.ccip_receive`: the receiver callback. Debug level.
pub fn ccip_receive(receiver: &Address, gas_limit: u64) -> Span {
    tracing::debug_span!(
        "ccip_rs.ccip_receive",
        receiver = %receiver,
        gas_limit = gas_limit,
        gas_used = tracing::field::Empty,
    )
}

/// `ccip_rs.get_attestation_with_retry`: the poll loop that waits for a
/// CCTP attestation, wrapping one `ccip_rs.get_attestation` per attempt.
pub fn get_attestation_with_retry(
    message_hash: &B256,
    max_attempts: u32,
    poll_interval_secs: u64,
) -> Span {
    tracing::info_span!(
        "ccip_rs.get_attestation_with_retry",
        message_hash = %message_hash,
        max_attempts = max_attempts,
        poll_interval_secs = poll_interval_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// `ccip_rs.get_attestation`: one lookup, from the poll loop or straight
/// from a USDC pool's `release_or_mint`.
pub fn get_attestation(message_hash: &B256) -> Span {
    tracing::debug_span!(
        "ccip_rs.get_attestation",
        message_hash = %message_hash,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// `ccip_rs.http_request`: the raw Iris round trip. Trace level.
pub fn http_request(method: &str, url: &Url, request_id: Option<&str>) -> Span {
    tracing::trace_span!(
        "ccip_rs.http_request",
        http.method = method,
        http.url = %url,
        http.request_id = request_id,
    )
}

/// `ccip_rs.get_logs`: one `eth_getLogs` block range, with the number of
/// logs returned recorded afterwards.
pub fn get_logs(chain_selector: ChainSelector, from_block: u64, to_block: u64) -> Span {
    tracing::debug_span!(
        "ccip_rs.get_logs",
        chain_selector = %chain_selector,
        from_block = from_block,
        to_block = to_block,
        log_count = tracing::field::Empty,
    )
}

/// Marks the current span as failed with `error`.
///
/// `error.type` gets the text before the first colon of the message, which
/// for [`CcipError`](crate::CcipError) is the variant's summary.
///
/// ```rust,no_run
/// use ccip_rs::{spans, CcipError};
/// use tracing::Instrument;
///
/// # async fn example() -> Result<(), CcipError> {
/// async {
///     let result: Result<(), CcipError> = Err(CcipError::AttestationNotFound);
///     if let Err(e) = &result {
///         spans::record_error(e);
///     }
///     result
/// }
/// .instrument(tracing::info_span!("ccip_rs.operation"))
/// .await
/// # }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = Span::current();
    let message = error.to_string();
    let kind = message.split_once(':').map_or(message.as_str(), |(kind, _)| kind);
    span.record("error.type", kind);
    span.record("error.message", message.as_str());
    span.record("otel.status_code", "ERROR");
    if let Some(source) = error.source() {
        span.record("error.source", source.to_string());
    }
}

/// Like [`record_error`] for failures that are not a Rust error value,
/// such as a receiver revert. `context` goes to `error.context`.
pub fn record_error_with_context(kind: &str, message: &str, context: Option<&str>) {
    let span = Span::current();
    span.record("error.type", kind);
    span.record("error.message", message);
    span.record("otel.status_code", "ERROR");
    if let Some(context) = context {
        span.record("error.context", context);
    }
}
