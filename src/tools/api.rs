//! HTTP client for the hero/monster/battle backend.
//!
//! `ApiClient` implements the collaborator traits the acquisition flow
//! depends on, and keeps the shared [`Session`] up to date on login.

use crate::core::acquisition::{BattleAuthority, MonsterCatalog};
use crate::core::error::ServiceError;
use crate::core::session::{Credentials, Session};
use crate::core::turn_log::{BattleDetails, BattleSummary};
use crate::data::roster::{Hero, Monster, NewHero};
use crate::data::settings::ApiSettings;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response had no body")]
    EmptyBody,
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => ServiceError::with_status(status, message),
            other => ServiceError::new(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBattleRequest {
    hero_id: i64,
    monster_id: i64,
}

/// `msg`, then `message`, then a generic fallback.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["msg", "message"]
                .iter()
                .filter_map(|key| value.get(*key).and_then(Value::as_str))
                .find(|message| !message.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

/// Decodes a successful body; `204` and empty bodies yield `None`.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Option<T>, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(body),
        });
    }
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

pub struct ApiClient {
    base_url: String,
    session: Session,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Session) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        with_token: bool,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if with_token {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), "api call");
        decode_body(status, &text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, with_token: bool) -> Result<Option<T>, ApiError> {
        self.request::<(), T>(Method::GET, path, with_token, None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.authenticate("/auth/login", username, password).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.authenticate("/auth/register", username, password).await
    }

    async fn authenticate(&self, path: &str, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .request(Method::POST, path, false, Some(&LoginRequest { username, password }))
            .await?
            .unwrap_or_default();
        if let Some(token) = &response.token {
            self.session.sign_in(Credentials {
                token: token.clone(),
                username: response.username.clone(),
                roles: response.roles.clone(),
            });
        }
        Ok(response)
    }

    pub fn logout(&self) {
        self.session.sign_out();
    }

    pub async fn get_heroes(&self) -> Result<Vec<Hero>, ApiError> {
        Ok(self.get("/heroes", true).await?.unwrap_or_default())
    }

    pub async fn create_hero(&self, hero: &NewHero) -> Result<Hero, ApiError> {
        let created: Hero = self
            .request(Method::POST, "/heroes", true, Some(hero))
            .await?
            .ok_or(ApiError::EmptyBody)?;
        Ok(created)
    }
}

#[async_trait]
impl MonsterCatalog for ApiClient {
    async fn get_monsters(&self) -> Result<Vec<Monster>, ServiceError> {
        let monsters: Option<Vec<Monster>> = self.get("/monsters", false).await?;
        Ok(monsters.unwrap_or_default())
    }

    async fn populate_monsters(&self) -> Result<(), ServiceError> {
        self.get::<Value>("/monsters/populate", false).await?;
        Ok(())
    }
}

#[async_trait]
impl BattleAuthority for ApiClient {
    async fn start_battle(&self, hero_id: i64, monster_id: i64) -> Result<BattleSummary, ServiceError> {
        let body = StartBattleRequest { hero_id, monster_id };
        let summary: BattleSummary = self
            .request(Method::POST, "/battles/start", true, Some(&body))
            .await?
            .ok_or(ApiError::EmptyBody)?;
        Ok(summary)
    }

    async fn get_battle_details(&self, battle_id: i64) -> Result<BattleDetails, ServiceError> {
        let details: BattleDetails = self
            .get(&format!("/battles/{}/details", battle_id), false)
            .await?
            .ok_or(ApiError::EmptyBody)?;
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReplayError;
    use crate::core::turn_log::TurnLog;

    #[test]
    fn test_error_message_prefers_msg() {
        assert_eq!(error_message(r#"{"msg":"Hero not found","message":"x"}"#), "Hero not found");
        assert_eq!(error_message(r#"{"message":"Token expired"}"#), "Token expired");
        assert_eq!(error_message(r#"{"msg":"","message":"Bad hero"}"#), "Bad hero");
        assert_eq!(error_message("<html>oops</html>"), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_decode_body_handles_no_content() {
        let empty: Option<Value> = decode_body(StatusCode::NO_CONTENT, "").expect("204");
        assert!(empty.is_none());
        let blank: Option<Value> = decode_body(StatusCode::OK, "  ").expect("blank 200");
        assert!(blank.is_none());
    }

    #[test]
    fn test_decode_body_maps_status_errors() {
        let err = decode_body::<Value>(StatusCode::UNAUTHORIZED, r#"{"msg":"Not allowed"}"#).unwrap_err();
        let service: ServiceError = err.into();
        assert_eq!(service.status, Some(401));
        assert_eq!(service.message, "Not allowed");
        assert_eq!(service.to_string(), "Not allowed");
    }

    #[test]
    fn test_decode_battle_details_without_logs() {
        let details: BattleDetails = decode_body(StatusCode::OK, r#"{"id":7}"#)
            .expect("decode")
            .expect("body");
        assert_eq!(details.id, 7);
        assert!(details.logs.is_none());
    }

    #[test]
    fn test_negative_turn_number_is_a_malformed_log() {
        let body = r#"{"id":1,"logs":[{"turnNumber":-1,"attacker":"Hero","defender":"Slime","damage":5,"defenderHpAfter":15}]}"#;
        let details: BattleDetails = decode_body(StatusCode::OK, body).expect("decode").expect("body");
        let err = TurnLog::from_details(details).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedLog(_)));
        assert_eq!(err.user_message(), "Failed to start battle");
    }
}
