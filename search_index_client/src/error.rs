use opensearch::{
    Error,
    http::{StatusCode, response::Response},
};

#[derive(thiserror::Error, Debug, serde::Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum SearchIndexClientError {
    #[error("error deserializing response body. method: {method:?} details: {details}")]
    DeserializationFailed {
        details: String,
        method: Option<String>,
    },
    #[error("a network error occurred. status_code: {status_code} message: {message}")]
    NetworkError { status_code: u16, message: String },

    #[error("an unknown error occurred. method: {method:?} details: {details}")]
    Unknown {
        details: String,
        method: Option<String>,
    },
}

impl From<anyhow::Error> for SearchIndexClientError {
    fn from(err: anyhow::Error) -> Self {
        SearchIndexClientError::Unknown {
            details: err.to_string(),
            method: None,
        }
    }
}

pub trait ResponseExt {
    #[allow(async_fn_in_trait)]
    async fn map_client_error(self) -> Result<Response, SearchIndexClientError>;
}

impl ResponseExt for Response {
    async fn map_client_error(self) -> Result<Response, SearchIndexClientError> {
        match self.status_code() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => Ok(self),
            _ => Err(SearchIndexClientError::NetworkError {
                status_code: self.status_code().as_u16(),
                message: self.text().await.unwrap_or_default(),
            }),
        }
    }
}

impl ResponseExt for Result<Response, Error> {
    async fn map_client_error(self) -> Result<Response, SearchIndexClientError> {
        match self {
            Ok(response) => response.map_client_error().await,
            Err(e) => Err(SearchIndexClientError::Unknown {
                details: e.to_string(),
                method: None,
            }),
        }
    }
}
