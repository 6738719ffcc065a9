use thiserror::Error;

/// Failure of a single host-page primitive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("node is detached from the document")]
    Detached,

    #[error("page script failed: {0}")]
    Script(String),

    #[error("CDP error: {0}")]
    Cdp(String),
}

impl From<chromiumoxide::error::CdpError> for PageError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        PageError::Cdp(e.to_string())
    }
}

/// Why an apply attempt did not complete. The message is shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InjectError {
    #[error("editor not found")]
    EditorNotFound,

    #[error("apply control not found")]
    ApplyControlNotFound,

    #[error("could not update embedded editor")]
    EditorWriteFailed,

    #[error("no supported editor found")]
    UnsupportedEditorType,

    #[error(transparent)]
    Page(#[from] PageError),
}

pub type OperationResult<T = ()> = Result<T, InjectError>;
