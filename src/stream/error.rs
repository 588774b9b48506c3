use crate::auth::AuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("no topic is registered for path {0}")]
    UnknownTopic(String),

    #[error("snapshot provider failed: {0:#}")]
    Provider(#[source] anyhow::Error),

    #[error("snapshot could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StreamError {
    pub fn client_message(&self) -> &'static str {
        match self {
            StreamError::Auth(err) => err.client_message(),
            StreamError::UnknownTopic(_) => "Invalid request URL",
            StreamError::Provider(_) | StreamError::Serialization(_) => "Internal server error",
        }
    }
}

impl From<anyhow::Error> for StreamError {
    fn from(err: anyhow::Error) -> Self {
        StreamError::Provider(err)
    }
}
