use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that escape the pipeline.
///
/// Missing search matches and missing statistics are not errors: they show up
/// as an empty `ResultSet` and as zeroed counters on the affected records.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid process configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The platform could not be reached (network, TLS, timeout, bad payload).
    #[error("{call} call failed: {message}")]
    Upstream { call: &'static str, message: String },

    /// The platform answered with a non-2xx status (auth, quota, bad key).
    #[error("{call} call returned {status}: {body}")]
    UpstreamStatus {
        call: &'static str,
        status: u16,
        body: String,
    },
}

impl Error {
    pub fn upstream(call: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Upstream {
            call,
            message: err.to_string(),
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. } | Error::UpstreamStatus { .. })
    }
}

#[test]
fn test_upstream_classification() {
    assert!(Error::upstream("search", "connection reset").is_upstream());
    assert!(
        Error::UpstreamStatus {
            call: "videos",
            status: 403,
            body: "quotaExceeded".into()
        }
        .is_upstream()
    );
    assert!(!Error::Config("missing key".into()).is_upstream());
    assert!(!Error::InvalidRequest("blank".into()).is_upstream());

    let err = Error::upstream("search", "timed out");
    assert_eq!(err.to_string(), "search call failed: timed out");
}
