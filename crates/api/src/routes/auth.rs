use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use lobianco_core::auth::SESSION_COOKIE;
use lobianco_core::content::User;
use serde::{Deserialize, Serialize};

use super::Deleted;
use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentCaller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// The signed-in user, or `null`.
async fn me(CurrentCaller(caller): CurrentCaller) -> Json<Option<User>> {
    Json(caller.into_user())
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let session = state.service().sign_in_with_password(&request.password).await?;
    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: session.user,
            token: session.token,
        }),
    ))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<Deleted>) {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), Json(Deleted::OK))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::test_support::{send, TestApp, ADMIN_PASSWORD};

    #[tokio::test]
    async fn me_is_null_for_anonymous_callers() {
        let app = TestApp::new();
        let (status, body) = send(app.router(), Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn login_sets_the_session_cookie() {
        let app = TestApp::new();
        let req = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"password": ADMIN_PASSWORD}).to_string()))
            .unwrap();
        let res = app.router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("app_session_id="));
        assert!(cookie.contains("HttpOnly"));

        let session = cookie.split(';').next().unwrap().to_string();
        let req = Request::get("/api/auth/me")
            .header(header::COOKIE, session)
            .body(Body::empty())
            .unwrap();
        let res = app.router().oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let me: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(me["openId"], "owner");
        assert_eq!(me["role"], "admin");
        assert_eq!(me["loginMethod"], "password");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized_every_time() {
        let app = TestApp::new();
        for _ in 0..3 {
            let (status, err) = send(
                app.router(),
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"password": "chute"})),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(err["error"]["type"], "unauthorized");
        }
        let (status, _) = send(
            app.router(),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"password": ADMIN_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_expires_the_cookie() {
        let app = TestApp::new();
        let req = Request::post("/api/auth/logout").body(Body::empty()).unwrap();
        let res = app.router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("app_session_id="));
        assert!(cookie.contains("Max-Age=0"));
    }
}
