use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::json;
use steam_openid::{
    AuthContext, IncomingRequest, OpenIdError, ProfileLookup, ProviderConfig, SteamOpenId,
    SteamWebApi,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Profile lookup used after a successful login.
#[derive(Clone)]
pub struct ProfileSettings {
    pub lookup: Arc<dyn ProfileLookup>,
    pub api_key: String,
}

#[derive(Clone)]
pub struct AppState {
    pub openid: SteamOpenId,
    pub profiles: Option<ProfileSettings>,
    pub realm: Option<String>,
}

impl AppState {
    pub fn new(openid: SteamOpenId) -> Self {
        Self {
            openid,
            profiles: None,
            realm: None,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let profiles = config.api_key.clone().map(|api_key| ProfileSettings {
            lookup: Arc::new(SteamWebApi::new()) as Arc<dyn ProfileLookup>,
            api_key,
        });
        let provider = if config.strict {
            ProviderConfig::steam_strict()
        } else {
            ProviderConfig::steam()
        };
        Self {
            openid: SteamOpenId::new(provider),
            profiles,
            realm: config.realm.clone(),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", get(login).post(login))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let app = app_router(AppState::from_config(&config));
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for steam-openid server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("steam-openid listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({"status":"ok","service":"steam-openid"}))
}

/// Both legs of the login: redirect on first visit, verify on callback.
async fn login(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    body: String,
) -> Response {
    let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
        return (StatusCode::BAD_REQUEST, "missing Host header").into_response();
    };
    // TLS terminates in front of us; trust the proxy's scheme header.
    let tls = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
    let request_uri = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    let ctx = AuthContext::from_request(&IncomingRequest {
        method: method.as_str(),
        host,
        tls,
        request_uri,
        body: Some(&body),
    });

    match ctx.mode() {
        "" => {
            let url = state.openid.auth_url(&ctx, None, state.realm.as_deref());
            Redirect::to(&url).into_response()
        }
        "cancel" => (StatusCode::OK, "authorization cancelled").into_response(),
        _ => match &state.profiles {
            Some(profiles) => match state
                .openid
                .validate_and_get_user(&ctx, profiles.lookup.as_ref(), &profiles.api_key)
                .await
            {
                Ok(player) => Json(player).into_response(),
                Err(err) => ApiError(err).into_response(),
            },
            None => match state.openid.validate_and_get_id(&ctx).await {
                Ok(steam_id) => Json(json!({ "steam_id": steam_id })).into_response(),
                Err(err) => ApiError(err).into_response(),
            },
        },
    }
}

/// Maps validation failures to HTTP responses.
pub struct ApiError(pub OpenIdError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            OpenIdError::Transport(_) | OpenIdError::Downstream(_) => StatusCode::BAD_GATEWAY,
            OpenIdError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Text sent to the client. Upstream and config details stay in the log.
    pub fn public_message(&self) -> String {
        match self.status() {
            StatusCode::BAD_GATEWAY => "Steam is unavailable".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "internal error".to_string(),
            _ => self.0.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self.0, "steam login failed");
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}
