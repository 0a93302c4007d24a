//! [`ContentApi`] over the JSON HTTP surface.

use std::time::Duration;

use async_trait::async_trait;
use lobianco_core::content::{
    CarouselSlide, ConfigPatch, Investment, InvestmentKind, InvestmentPatch, NewInvestment,
    NewProperty, NewSlide, Property, PropertyPatch, SettingsPatch, SiteConfig, SiteSettings,
    SlidePatch, User,
};
use lobianco_core::storage::{StoredObject, UploadRequest};
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{ClientError, ClientResult, ContentApi};

/// Error envelope returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: User,
    token: String,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[allow(dead_code)]
    success: bool,
}

/// Client for the site API. Holds the session token returned by
/// [`ContentApi::login`] and sends it as a bearer token.
pub struct HttpContentApi {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpContentApi {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Reuse a token obtained elsewhere.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.token.read().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(error_from(response).await)
    }
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) else {
        tracing::warn!(status, "unrecognised error body from server");
        return ClientError::Server {
            status,
            message: text,
        };
    };
    let ErrorBody { kind, message } = envelope.error;
    match kind.as_str() {
        "badRequest" => ClientError::Validation(message),
        "unauthorized" => ClientError::Unauthorized(message),
        "forbidden" => ClientError::Forbidden(message),
        "notFound" => ClientError::NotFound(message),
        "unavailable" => ClientError::Unavailable(message),
        _ => ClientError::Server { status, message },
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn list_slides(&self) -> ClientResult<Vec<CarouselSlide>> {
        self.send(self.request(Method::GET, "/api/carousel")).await
    }

    async fn create_slide(&self, input: &NewSlide) -> ClientResult<CarouselSlide> {
        self.send(self.request(Method::POST, "/api/carousel").json(input)).await
    }

    async fn update_slide(&self, id: i64, patch: &SlidePatch) -> ClientResult<CarouselSlide> {
        self.send(self.request(Method::PATCH, &format!("/api/carousel/{id}")).json(patch))
            .await
    }

    async fn delete_slide(&self, id: i64) -> ClientResult<()> {
        self.send::<Ack>(self.request(Method::DELETE, &format!("/api/carousel/{id}")))
            .await
            .map(|_| ())
    }

    async fn list_investments(&self, kind: Option<InvestmentKind>) -> ClientResult<Vec<Investment>> {
        let mut builder = self.request(Method::GET, "/api/investments");
        if let Some(kind) = kind {
            builder = builder.query(&[("tipo", kind.as_str())]);
        }
        self.send(builder).await
    }

    async fn create_investment(&self, input: &NewInvestment) -> ClientResult<Investment> {
        self.send(self.request(Method::POST, "/api/investments").json(input)).await
    }

    async fn update_investment(&self, id: i64, patch: &InvestmentPatch) -> ClientResult<Investment> {
        self.send(self.request(Method::PATCH, &format!("/api/investments/{id}")).json(patch))
            .await
    }

    async fn delete_investment(&self, id: i64) -> ClientResult<()> {
        self.send::<Ack>(self.request(Method::DELETE, &format!("/api/investments/{id}")))
            .await
            .map(|_| ())
    }

    async fn list_properties(&self) -> ClientResult<Vec<Property>> {
        self.send(self.request(Method::GET, "/api/properties")).await
    }

    async fn get_property(&self, id: i64) -> ClientResult<Property> {
        self.send(self.request(Method::GET, &format!("/api/properties/{id}"))).await
    }

    async fn create_property(&self, input: &NewProperty) -> ClientResult<Property> {
        self.send(self.request(Method::POST, "/api/properties").json(input)).await
    }

    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> ClientResult<Property> {
        self.send(self.request(Method::PATCH, &format!("/api/properties/{id}")).json(patch))
            .await
    }

    async fn delete_property(&self, id: i64) -> ClientResult<()> {
        self.send::<Ack>(self.request(Method::DELETE, &format!("/api/properties/{id}")))
            .await
            .map(|_| ())
    }

    async fn get_config(&self) -> ClientResult<Option<SiteConfig>> {
        self.send(self.request(Method::GET, "/api/config")).await
    }

    async fn update_config(&self, patch: &ConfigPatch) -> ClientResult<SiteConfig> {
        self.send(self.request(Method::PATCH, "/api/config").json(patch)).await
    }

    async fn get_settings(&self) -> ClientResult<Option<SiteSettings>> {
        self.send(self.request(Method::GET, "/api/settings")).await
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> ClientResult<SiteSettings> {
        self.send(self.request(Method::PATCH, "/api/settings").json(patch)).await
    }

    async fn upload_file(&self, request: &UploadRequest) -> ClientResult<StoredObject> {
        self.send(self.request(Method::POST, "/api/storage/upload").json(request))
            .await
    }

    async fn me(&self) -> ClientResult<Option<User>> {
        self.send(self.request(Method::GET, "/api/auth/me")).await
    }

    async fn login(&self, password: &str) -> ClientResult<User> {
        let response: LoginResponse = self
            .send(self.request(Method::POST, "/api/auth/login").json(&LoginRequest { password }))
            .await?;
        self.set_token(Some(response.token));
        Ok(response.user)
    }

    async fn logout(&self) -> ClientResult<()> {
        let result = self
            .send::<Ack>(self.request(Method::POST, "/api/auth/logout"))
            .await
            .map(|_| ());
        self.set_token(None);
        result
    }
}
