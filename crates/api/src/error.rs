use serde::Deserialize;
use thiserror::Error;

/// Error body the EventX API returns alongside a non-success status code.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

fn auth_message(status: u16) -> &'static str {
    if status == 403 {
        "Access denied. You do not have permission."
    } else {
        "Unauthorized. Please login again."
    }
}

/// Client-observable error categories for remote calls. Each variant's
/// `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403: the stored session is no longer accepted by the server.
    #[error("{}", auth_message(*.status))]
    Auth { status: u16 },

    /// 400/409: the server rejected the request (seat already booked,
    /// invalid input). The server's own message is surfaced verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Resource not found.")]
    NotFound,

    #[error("Server error. Please try again later.")]
    Server { status: u16 },

    /// The request exceeded the client timeout; no response was received.
    #[error("Request timeout. Please try again.")]
    Timeout,

    /// The request never reached the server.
    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),

    /// The server answered with success but the payload did not parse.
    #[error("Unexpected response from the server.")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// True for the one globally propagated error: the session is invalid
    /// and must be torn down, regardless of which view made the call.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    /// Whether rerunning the same request unchanged can plausibly succeed.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Server { .. } | ApiError::Timeout | ApiError::Network(_)
        )
    }

    pub(crate) fn from_status(status: u16, body: ErrorBody) -> ApiError {
        match status {
            401 | 403 => ApiError::Auth { status },
            404 => ApiError::NotFound,
            s if s >= 500 => ApiError::Server { status: s },
            s => ApiError::Rejected {
                status: s,
                message: body
                    .into_message()
                    .unwrap_or_else(|| "An error occurred".to_string()),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Network(err)
        }
    }
}
