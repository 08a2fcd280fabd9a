//! Contracts for the remote session store the core calls through.
//!
//! The core never retries: a failed round trip is surfaced to the caller and
//! the presentation layer decides what to do with it.

pub mod http;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dto::{
    attendance::AttendanceUpdateRequest,
    drill::{CreateDrillRequest, DrillDto},
    live::LiveStateDto,
    plan::{BootstrapDto, PlanSnapshot},
};

/// Result alias for session store round trips.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error raised by the session store boundary.
///
/// A transport failure and an error payload embedded in a well-formed reply
/// are deliberately the same kind; callers treat both as the round trip
/// failing.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed.
    #[error("request to `{path}` failed")]
    RequestSend {
        /// Endpoint path.
        path: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success HTTP status.
    #[error("request to `{path}` returned status {status}")]
    RequestStatus {
        /// Endpoint path.
        path: String,
        /// HTTP status received.
        status: reqwest::StatusCode,
    },
    /// The reply body could not be decoded.
    #[error("failed to decode reply from `{path}`")]
    DecodeResponse {
        /// Endpoint path.
        path: String,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint reported a failure inside a well-formed reply.
    #[error("session store reported an error: {message}")]
    Session {
        /// Failure reason from the reply payload.
        message: String,
    },
}

/// Request/response contract with the remote session store.
///
/// Object-safe so services depend on `Arc<dyn SessionApi>` and tests can
/// substitute canned replies.
pub trait SessionApi: Send + Sync {
    /// Poll the current live state of a session.
    fn fetch_live_state(&self, session_id: i64) -> BoxFuture<'static, ApiResult<LiveStateDto>>;

    /// Report an attendance status change already applied locally.
    fn update_attendance(
        &self,
        session_id: i64,
        request: AttendanceUpdateRequest,
    ) -> BoxFuture<'static, ApiResult<()>>;

    /// Persist a full plan snapshot. One shot; the core never retries.
    fn save_plan(
        &self,
        session_id: i64,
        snapshot: PlanSnapshot,
    ) -> BoxFuture<'static, ApiResult<()>>;

    /// Load the construction-time snapshot: plan, roster, drills, tags.
    fn fetch_bootstrap(&self, session_id: i64) -> BoxFuture<'static, ApiResult<BootstrapDto>>;

    /// Store a coach-authored drill and return it as the library will serve it.
    fn create_custom_drill(
        &self,
        request: CreateDrillRequest,
    ) -> BoxFuture<'static, ApiResult<DrillDto>>;
}
