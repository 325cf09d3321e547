use thiserror::Error;

/// The central error type for teachassist.
///
/// Library operations return this (or one of the narrower enums below);
/// the CLI wraps it in `anyhow` and maps it to an exit code.
#[derive(Error, Debug)]
pub enum TeachAssistError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TeachAssistError {
    /// The message shown to the user in a notification.
    pub fn user_message(&self) -> String {
        match self {
            TeachAssistError::Api(e) => e.to_string(),
            TeachAssistError::Stream(e) => e.to_string(),
            TeachAssistError::Config(msg) => format!("Configuration error: {}", msg),
            TeachAssistError::Other(e) => e.to_string(),
        }
    }
}

/// Failures while talking to a generation function.
///
/// The display strings are the user-facing notification texts.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI credits exhausted. Please add credits.")]
    QuotaExhausted,

    #[error("Document content not found. Please ensure the document is processed.")]
    ContentNotFound,

    #[error("Invalid request. Please check your inputs.")]
    InvalidRequest,

    /// Rejected locally before any request was sent.
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No response body")]
    MissingBody,
}

/// Fallback text when a failed teaching-assistant response carries no
/// `error` field.
pub const GENERIC_FAILURE: &str = "Failed to generate content";
/// Fallback text when a failed syllabus response carries no `error` field.
pub const SYLLABUS_FAILURE: &str = "Failed to generate syllabus";

/// How a function's failure statuses are presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMapping {
    /// Fixed texts for 429, 402, 404 and 400.
    Assistant,
    /// Fixed texts for 429 and 402; the body's `error` for anything else.
    Syllabus,
}

impl StatusMapping {
    fn fallback(self) -> &'static str {
        match self {
            StatusMapping::Assistant => GENERIC_FAILURE,
            StatusMapping::Syllabus => SYLLABUS_FAILURE,
        }
    }
}

impl ApiError {
    /// Map a non-2xx status (and the decoded `error` field of its body, if
    /// any) to an error.
    pub fn from_status(status: u16, body_error: Option<String>, mapping: StatusMapping) -> Self {
        match (status, mapping) {
            (429, _) => ApiError::RateLimited,
            (402, _) => ApiError::QuotaExhausted,
            (404, StatusMapping::Assistant) => ApiError::ContentNotFound,
            (400, StatusMapping::Assistant) => ApiError::InvalidRequest,
            _ => ApiError::Http {
                status,
                message: body_error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| mapping.fallback().to_string()),
            },
        }
    }

    /// HTTP status associated with this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited => Some(429),
            ApiError::QuotaExhausted => Some(402),
            ApiError::ContentNotFound => Some(404),
            ApiError::InvalidRequest => Some(400),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// Failures of the streaming read loop.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Stream error: {0}")]
    Transport(String),

    #[error("Generation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TeachAssistError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_API_ERROR: u8 = 4;
pub const EXIT_CANCELLED: u8 = 130;

fn exit_code_for(e: &TeachAssistError) -> u8 {
    match e {
        TeachAssistError::Config(_) => EXIT_CONFIG_ERROR,
        TeachAssistError::Api(_) => EXIT_API_ERROR,
        TeachAssistError::Stream(StreamError::Cancelled) => EXIT_CANCELLED,
        TeachAssistError::Stream(StreamError::Transport(_)) => EXIT_API_ERROR,
        TeachAssistError::Other(_) => EXIT_ERROR,
    }
}

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<TeachAssistError>() {
        return exit_code_for(err);
    }
    if e.downcast_ref::<ApiError>().is_some() {
        return EXIT_API_ERROR;
    }
    if let Some(err) = e.downcast_ref::<StreamError>() {
        return match err {
            StreamError::Cancelled => EXIT_CANCELLED,
            StreamError::Transport(_) => EXIT_API_ERROR,
        };
    }
    EXIT_ERROR
}
