//! HTTP implementation of [`SessionApi`] against the remote session store.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    api::{ApiError, ApiResult, SessionApi},
    dto::{
        attendance::AttendanceUpdateRequest,
        common::{ReplyStatus, StatusReply},
        drill::{CreateDrillRequest, DrillDto},
        live::{LiveStateDto, SessionStatusDto},
        plan::{BootstrapDto, PlanSnapshot},
    },
};

/// Header carrying the CSRF token on mutating requests.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Session store client speaking JSON over HTTP.
#[derive(Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: Arc<str>,
    csrf_token: Option<Arc<str>>,
}

impl HttpSessionApi {
    /// Build a client for the store at `base_url`.
    ///
    /// The CSRF token is attached to every mutating request when present; the
    /// hosting page supplies it alongside the bootstrap data.
    pub fn new(base_url: &str, csrf_token: Option<&str>) -> ApiResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| ApiError::RequestSend {
                path: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            csrf_token: csrf_token.map(Arc::from),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method.clone(), url);
        match (&self.csrf_token, method) {
            (Some(token), Method::POST) => builder.header(CSRF_HEADER, token.as_ref()),
            _ => builder,
        }
    }

    async fn decode<T>(path: &str, response: Response) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn get_json<T>(&self, path: String) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.clone(),
                source,
            })?;

        Self::decode(&path, response).await
    }

    async fn post_json<B, T>(&self, path: String, body: &B) -> ApiResult<T>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, &path)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.clone(),
                source,
            })?;

        Self::decode(&path, response).await
    }

    /// Collapse a `{status, message?}` reply into a result.
    fn check_reply(reply: StatusReply) -> ApiResult<()> {
        match reply.status {
            ReplyStatus::Success => Ok(()),
            ReplyStatus::Error => Err(ApiError::Session {
                message: reply.message.unwrap_or_else(|| "unspecified error".into()),
            }),
        }
    }
}

impl SessionApi for HttpSessionApi {
    fn fetch_live_state(&self, session_id: i64) -> BoxFuture<'static, ApiResult<LiveStateDto>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("live-session/api/update/{session_id}/");
            let state: LiveStateDto = api.get_json(path).await?;

            // An embedded error status is the same failure kind as a failed
            // transport round trip.
            if state.session_status == SessionStatusDto::Error {
                return Err(ApiError::Session {
                    message: state
                        .message
                        .unwrap_or_else(|| "live state unavailable".into()),
                });
            }

            Ok(state)
        })
    }

    fn update_attendance(
        &self,
        session_id: i64,
        request: AttendanceUpdateRequest,
    ) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("schedule/api/session/{session_id}/update_attendance/");
            let reply: StatusReply = api.post_json(path, &request).await?;
            Self::check_reply(reply)
        })
    }

    fn save_plan(
        &self,
        session_id: i64,
        snapshot: PlanSnapshot,
    ) -> BoxFuture<'static, ApiResult<()>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("schedule/api/session/{session_id}/save_plan/");
            let reply: StatusReply = api.post_json(path, &snapshot).await?;
            Self::check_reply(reply)
        })
    }

    fn fetch_bootstrap(&self, session_id: i64) -> BoxFuture<'static, ApiResult<BootstrapDto>> {
        let api = self.clone();
        Box::pin(async move {
            let path = format!("schedule/api/session/{session_id}/planner_data/");
            api.get_json(path).await
        })
    }

    fn create_custom_drill(
        &self,
        request: CreateDrillRequest,
    ) -> BoxFuture<'static, ApiResult<DrillDto>> {
        let api = self.clone();
        Box::pin(async move {
            let path = "live-session/api/drills/create/".to_string();
            let reply: CreateDrillReply = api.post_json(path, &request).await?;
            match reply.status {
                ReplyStatus::Success => reply.drill.ok_or(ApiError::Session {
                    message: "drill creation reply was missing the drill".into(),
                }),
                ReplyStatus::Error => Err(ApiError::Session {
                    message: reply.message.unwrap_or_else(|| "unspecified error".into()),
                }),
            }
        })
    }
}

/// Reply from the drill creation endpoint.
#[derive(Debug, serde::Deserialize)]
struct CreateDrillReply {
    status: ReplyStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    drill: Option<DrillDto>,
}
