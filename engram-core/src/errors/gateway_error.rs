/// Errors from the embedder and structurer gateways. Both services are
/// external processes addressed over loopback sockets; every failure mode
/// here is recoverable by the documented caller fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{operation} timed out after {budget_ms}ms")]
    Timeout { operation: String, budget_ms: u64 },

    #[error("service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("protocol error: {detail}")]
    Protocol { detail: String },

    #[error("service reported failure: {message}")]
    Remote { message: String },
}
