//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;
use std::time::Duration;

use oslink_domain::OsLinkError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub OsLinkError);

impl From<InfraError> for OsLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<OsLinkError> for InfraError {
    fn from(value: OsLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoOsLinkError {
    fn into_oslink(self) -> OsLinkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → OsLinkError */
/* -------------------------------------------------------------------------- */

impl InfraError {
    /// Convert a `reqwest` failure. Timeouts carry the deadline the request
    /// ran under, which `reqwest` itself does not report.
    pub fn from_http(err: HttpError, deadline: Duration) -> Self {
        InfraError(http_into_oslink(err, deadline))
    }
}

fn http_into_oslink(err: HttpError, deadline: Duration) -> OsLinkError {
    if err.is_timeout() {
        return OsLinkError::Timeout(deadline);
    }

    if err.is_connect() {
        return OsLinkError::Network(format!("HTTP connection failure: {err}"));
    }

    if err.is_builder() {
        return OsLinkError::Config(format!("invalid HTTP request: {err}"));
    }

    if err.is_decode() {
        return OsLinkError::Decode(format!("invalid HTTP response body: {err}"));
    }

    if let Some(status) = err.status() {
        return OsLinkError::Remote {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown status").to_string(),
        };
    }

    OsLinkError::Network(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → OsLinkError */
/* -------------------------------------------------------------------------- */

impl IntoOsLinkError for IoError {
    fn into_oslink(self) -> OsLinkError {
        OsLinkError::Persistence(format!("{:?}: {}", self.kind(), self))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_oslink())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → OsLinkError */
/* -------------------------------------------------------------------------- */

impl IntoOsLinkError for JsonError {
    fn into_oslink(self) -> OsLinkError {
        OsLinkError::Decode(format!("line {} column {}: {}", self.line(), self.column(), self))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_oslink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn io_error_maps_to_persistence() {
        let err = IoError::new(ErrorKind::PermissionDenied, "read-only volume");
        let mapped: OsLinkError = InfraError::from(err).into();
        match mapped {
            OsLinkError::Persistence(msg) => assert!(msg.contains("read-only volume")),
            other => panic!("expected persistence error, got {other:?}"),
        }
    }

    #[test]
    fn json_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let mapped: OsLinkError = InfraError::from(err).into();
        assert!(matches!(mapped, OsLinkError::Decode(msg) if msg.contains("line 1")));
    }

    #[tokio::test]
    async fn http_status_maps_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::SERVICE_UNAVAILABLE))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: OsLinkError = InfraError::from_http(error, Duration::from_secs(8)).into();
        assert!(matches!(mapped, OsLinkError::Remote { status: 503, .. }));
        assert!(mapped.is_remote_unavailable());
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: OsLinkError = InfraError::from_http(error, Duration::from_secs(8)).into();
        assert!(matches!(mapped, OsLinkError::Network(_)));
    }

    #[tokio::test]
    async fn http_timeout_maps_to_timeout_with_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let deadline = Duration::from_millis(100);
        let client = Client::builder().no_proxy().timeout(deadline).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();
        assert!(error.is_timeout());

        let mapped: OsLinkError = InfraError::from_http(error, deadline).into();
        assert_eq!(mapped, OsLinkError::Timeout(deadline));
        assert!(mapped.is_remote_unavailable());
    }
}
