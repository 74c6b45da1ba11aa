use crate::{
    error::{PermanentError, TemporaryError, TransportError},
    transport::TransportResponse,
};

/// Status the provider returns once it has queued the message.
pub const STATUS_ACCEPTED: u16 = 202;

/// Status the provider returns for a recipient address it will never accept.
pub const STATUS_BAD_RECIPIENT: u16 = 501;

/// Classification of a single delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The provider accepted the message.
    Success(TransportResponse),
    /// Worth attempting again after a delay.
    RetryableFailure(TemporaryError),
    /// Retrying cannot help.
    TerminalFailure(PermanentError),
}

impl DeliveryOutcome {
    /// Classify the result of a transport call.
    ///
    /// Only [`STATUS_BAD_RECIPIENT`] is terminal. Transport errors and every
    /// other non-acceptance status are retryable.
    pub fn classify(result: Result<TransportResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.status == STATUS_ACCEPTED => Self::Success(response),
            Ok(TransportResponse { status, body }) if status == STATUS_BAD_RECIPIENT => {
                Self::TerminalFailure(PermanentError::InvalidRecipient { status, body })
            }
            Ok(TransportResponse { status, body }) => {
                Self::RetryableFailure(TemporaryError::UnexpectedStatus { status, body })
            }
            Err(error) => Self::RetryableFailure(TemporaryError::Transport(error)),
        }
    }
}
