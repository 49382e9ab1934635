//! HTTP access to the game module.
//!
//! Client-side (hydrate): real requests via `gloo-net`, each raced against the
//! configured timeout. Elsewhere the backend is inert and every call reports
//! [`ApiError::Unavailable`], so the state machines above it stay testable
//! against an in-memory [`Backend`].
//!
//! ERROR HANDLING
//! ==============
//! Request/response calls surface a typed [`ApiError`]. Fire-and-forget
//! posts and liveness pings only log failures.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

pub const CAMERA_COORDS: &str = "/camera/coords";
pub const CORRECTED_COORDS: &str = "/general/correctedcoords";
pub const TAKE_IMAGE: &str = "/general/takeimage";
pub const GAMEMODE_CONTROLLER: &str = "/gamemodecontroller";
pub const KP2_ENTER_ROUND: &str = "/kp2/enterround";
pub const KP2_SELECT_MODE: &str = "/kp2/selectmode";
pub const GAME_START: &str = "/game/startgame";
pub const GAME_DETERMINE_START: &str = "/game/determinestart";
pub const GAME_ENTER_ROUND: &str = "/game/enterround";
pub const TRICKSHOTS_LIST: &str = "/trickshots/list";
pub const TRICKSHOTS_LOAD: &str = "/trickshots/load";

/// Failure of a request/response call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("{path} responded with status {status}")]
    Status { path: String, status: u16 },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("request timed out after {0} ms")]
    Timeout(u32),
    #[error("not available outside the browser")]
    Unavailable,
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Request/response access to the backend.
///
/// Implementations are single-threaded; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// `GET path` and decode the JSON body.
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    /// `POST path` with a JSON body and decode the JSON response.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    /// `POST path` without waiting for or inspecting the response.
    fn post_detached(&self, path: &str, body: Value);

    /// `GET url` for liveness; the response is ignored.
    fn ping(&self, url: &str);
}

#[cfg(any(test, feature = "hydrate"))]
fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(any(test, feature = "hydrate"))]
fn check_status(path: &str, status: u16) -> Result<(), ApiError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(ApiError::Status { path: path.to_owned(), status })
    }
}

/// Browser backend talking to the page's origin.
#[derive(Clone, Copy, Debug)]
pub struct HttpBackend {
    timeout_ms: u32,
}

impl HttpBackend {
    #[must_use]
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

#[cfg(feature = "hydrate")]
async fn with_timeout<F, T>(timeout_ms: u32, request: F) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
{
    use futures::future::{Either, select};

    let request = Box::pin(request);
    let timer = Box::pin(gloo_timers::future::TimeoutFuture::new(timeout_ms));
    match select(request, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(ApiError::Timeout(timeout_ms)),
    }
}

#[cfg(feature = "hydrate")]
async fn decode_response(path: &str, resp: gloo_net::http::Response) -> Result<Value, ApiError> {
    check_status(path, resp.status())?;
    resp.json::<Value>().await.map_err(|e| ApiError::Decode(e.to_string()))
}

impl Backend for HttpBackend {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            with_timeout(self.timeout_ms, async {
                let resp = gloo_net::http::Request::get(path)
                    .header("Accept", "application/json")
                    .send()
                    .await
                    .map_err(|e| ApiError::Network(e.to_string()))?;
                decode_response(path, resp).await
            })
            .await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            log::debug!("GET {path} unavailable outside the browser");
            Err(ApiError::Unavailable)
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            with_timeout(self.timeout_ms, async {
                let resp = gloo_net::http::Request::post(path)
                    .header("Accept", "application/json")
                    .json(body)
                    .map_err(|e| ApiError::Network(e.to_string()))?
                    .send()
                    .await
                    .map_err(|e| ApiError::Network(e.to_string()))?;
                decode_response(path, resp).await
            })
            .await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            log::debug!("POST {path} unavailable outside the browser: {body}");
            Err(ApiError::Unavailable)
        }
    }

    fn post_detached(&self, path: &str, body: Value) {
        #[cfg(feature = "hydrate")]
        {
            let path = path.to_owned();
            wasm_bindgen_futures::spawn_local(async move {
                let sent = match gloo_net::http::Request::post(&path).json(&body) {
                    Ok(request) => request.send().await.map(|resp| resp.status()),
                    Err(e) => Err(e),
                };
                match sent {
                    Ok(status) => {
                        if let Err(e) = check_status(&path, status) {
                            log::warn!("detached post failed: {e}");
                        }
                    }
                    Err(e) => log::warn!("detached post to {path} failed: {e}"),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            log::debug!("dropping detached post to {path}: {body}");
        }
    }

    fn ping(&self, url: &str) {
        #[cfg(feature = "hydrate")]
        {
            let url = url.to_owned();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = gloo_net::http::Request::get(&url).send().await {
                    log::warn!("liveness ping to {url} failed: {e}");
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            log::debug!("skipping liveness ping to {url}");
        }
    }
}
