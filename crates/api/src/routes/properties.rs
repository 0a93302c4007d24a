use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use lobianco_core::content::{NewProperty, Property, PropertyPatch};

use super::Deleted;
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminCaller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/properties", get(list).post(create))
        .route("/api/properties/{id}", get(get_by_id).patch(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Json<Vec<Property>> {
    Json(state.service().list_properties().await)
}

async fn get_by_id(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<Property>> {
    Ok(Json(state.service().get_property(id).await?))
}

async fn create(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Json(input), _): WithRejection<Json<NewProperty>, ApiError>,
) -> ApiResult<(StatusCode, Json<Property>)> {
    let property = state.service().create_property(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

async fn update(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<PropertyPatch>, ApiError>,
) -> ApiResult<Json<Property>> {
    Ok(Json(state.service().update_property(&caller, id, patch).await?))
}

async fn remove(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<Deleted>> {
    state.service().delete_property(&caller, id).await?;
    Ok(Json(Deleted::OK))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{send, TestApp};

    #[tokio::test]
    async fn property_detail_by_id() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        let (status, created) = send(
            app.router(),
            Method::POST,
            "/api/properties",
            Some(&token),
            Some(json!({
                "title": "Cobertura Duplex",
                "location": "Moema, São Paulo",
                "areaMt2": 210,
                "suites": 2,
                "gym": true,
                "condominium": 2500,
                "iptu": 800
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, found) =
            send(app.router(), Method::GET, &format!("/api/properties/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["title"], "Cobertura Duplex");
        assert_eq!(found["areaMt2"], 210);
        assert_eq!(found["gym"], true);
        assert_eq!(found["pool"], false);

        let (status, err) =
            send(app.router(), Method::GET, "/api/properties/4040", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"]["type"], "notFound");
    }

    #[tokio::test]
    async fn location_is_required() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        let (status, _) = send(
            app.router(),
            Method::POST,
            "/api/properties",
            Some(&token),
            Some(json!({"title": "Casa", "location": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app.router(),
            Method::POST,
            "/api/properties",
            Some(&token),
            Some(json!({"title": "Casa", "location": "Centro", "bedrooms": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_bad_request() {
        let app = TestApp::new();
        let (status, _) = send(app.router(), Method::GET, "/api/properties/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
