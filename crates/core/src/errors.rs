use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("upstream call timed out: {0}")]
    UpstreamTimeout(String),
    #[error("upstream service unreachable: {0}")]
    UpstreamUnreachable(String),
    #[error("upstream service failure: {0}")]
    Upstream(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("gateway timeout: {message}")]
    GatewayTimeout { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("bad gateway: {message}")]
    BadGateway { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Text safe to render on the search page; never carries upstream details.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::GatewayTimeout { .. } => {
                "The Pokémon TCG service took too long to respond. Try a more specific query and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "Couldn't reach the Pokémon TCG service. Please try again shortly."
            }
            Self::BadGateway { .. } => "Pokémon TCG API returned an error.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::GatewayTimeout { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::BadGateway { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::GatewayTimeout { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::BadGateway { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::UpstreamTimeout(message) => {
                Self::GatewayTimeout { message, correlation_id }
            }
            ApplicationError::UpstreamUnreachable(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Upstream(message) => Self::BadGateway { message, correlation_id },
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, InterfaceError};

    #[test]
    fn timeout_maps_to_narrower_query_hint() {
        let interface =
            ApplicationError::UpstreamTimeout("read timed out after 30s".to_owned())
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::GatewayTimeout { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert!(interface.user_message().contains("more specific query"));
    }

    #[test]
    fn unreachable_maps_to_service_unavailable() {
        let interface = ApplicationError::UpstreamUnreachable("connection refused".to_owned())
            .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "Couldn't reach the Pokémon TCG service. Please try again shortly."
        );
    }

    #[test]
    fn upstream_failure_hides_details_from_user() {
        let interface = ApplicationError::Upstream("status 500: stack trace here".to_owned())
            .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::BadGateway { .. }));
        assert!(!interface.user_message().contains("stack trace"));
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("client build failed".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
