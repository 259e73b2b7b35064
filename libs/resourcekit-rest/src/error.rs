use http::StatusCode;
use resourcekit_db::ResourceError;

use crate::problem::Problem;

/// Map a resource error to an RFC 9457 problem.
///
/// Server-side failures are logged here and answered with a generic detail so no store
/// internals reach the client.
#[must_use]
pub fn resource_error_to_problem(e: &ResourceError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    if e.is_client_error() {
        tracing::debug!(error = %e, instance, "Request rejected");
    }

    let problem = match e {
        ResourceError::Decode(msg) => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Request Body", msg.clone())
                .with_code("INVALID_BODY")
        }
        ResourceError::Validation(v) => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Failed", v.message.clone())
                .with_code("VALIDATION_FAILED")
        }
        ResourceError::MalformedId(raw) => Problem::new(
            StatusCode::BAD_REQUEST,
            "Invalid Id",
            format!("'{raw}' is not a valid resource id"),
        )
        .with_code("INVALID_ID"),
        ResourceError::InvalidFilter { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Filter", e.to_string())
                .with_code("INVALID_FILTER")
        }
        ResourceError::NotFound { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", e.to_string()).with_code("NOT_FOUND")
        }
        ResourceError::Internal(_) => {
            tracing::error!(error = %e, "Internal error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal error occurred",
            )
            .with_code("INTERNAL")
        }
        ResourceError::Store(_) => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Database error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal database error occurred",
            )
            .with_code("STORE_ERROR")
        }
    };

    problem.with_instance(instance).with_trace_id(trace_id)
}

impl From<ResourceError> for Problem {
    fn from(e: ResourceError) -> Self {
        resource_error_to_problem(&e, "")
    }
}
