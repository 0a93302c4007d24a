use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::WithRejection;
use lobianco_core::content::{ConfigPatch, SettingsPatch, SiteConfig, SiteSettings};

use crate::error::{ApiError, ApiResult};
use crate::extract::AdminCaller;
use crate::state::AppState;

/// Singleton config and social settings.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/config", get(get_config).patch(update_config))
        .route("/api/settings", get(get_settings).patch(update_settings))
}

/// `null` until the first save.
async fn get_config(State(state): State<AppState>) -> Json<Option<SiteConfig>> {
    Json(state.service().get_config().await)
}

async fn update_config(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Json(patch), _): WithRejection<Json<ConfigPatch>, ApiError>,
) -> ApiResult<Json<SiteConfig>> {
    Ok(Json(state.service().update_config(&caller, patch).await?))
}

async fn get_settings(State(state): State<AppState>) -> Json<Option<SiteSettings>> {
    Json(state.service().get_settings().await)
}

async fn update_settings(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Json(patch), _): WithRejection<Json<SettingsPatch>, ApiError>,
) -> ApiResult<Json<SiteSettings>> {
    Ok(Json(state.service().update_settings(&caller, patch).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::routes::test_support::{send, TestApp};

    #[tokio::test]
    async fn config_is_null_until_saved_then_upserted_in_place() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let (status, body) = send(app.router(), Method::GET, "/api/config", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, first) = send(
            app.router(),
            Method::PATCH,
            "/api/config",
            Some(&token),
            Some(json!({"quemSomos": "Somos a Lobianco", "corPrimaria": "#0F172A"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["tamanho"], 16);

        let (_, second) = send(
            app.router(),
            Method::PATCH,
            "/api/config",
            Some(&token),
            Some(json!({"tamanho": 18})),
        )
        .await;
        assert_eq!(second["id"], first["id"]);
        assert_eq!(second["quemSomos"], "Somos a Lobianco");
        assert_eq!(second["corPrimaria"], "#0F172A");
        assert_eq!(second["tamanho"], 18);
        assert_eq!(app.store.config_rows(), 1);
    }

    #[tokio::test]
    async fn config_values_are_checked() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        for body in [json!({"corPrimaria": "azul"}), json!({"tamanho": 200}), json!({"fonte": "Arial"})] {
            let (status, _) =
                send(app.router(), Method::PATCH, "/api/config", Some(&token), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(app.store.config_rows(), 0);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        let (status, saved) = send(
            app.router(),
            Method::PATCH,
            "/api/settings",
            Some(&token),
            Some(json!({"whatsapp": "5511999999999", "instagram": "https://instagram.com/lobianco"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["facebook"], Value::Null);

        let (_, fetched) = send(app.router(), Method::GET, "/api/settings", None, None).await;
        assert_eq!(fetched["whatsapp"], "5511999999999");
        assert_eq!(app.store.settings_rows(), 1);
    }
}
