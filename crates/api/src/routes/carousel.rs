use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use lobianco_core::content::{CarouselSlide, NewSlide, SlidePatch};

use super::Deleted;
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminCaller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/carousel", get(list).post(create))
        .route("/api/carousel/{id}", patch(update).delete(remove))
}

/// Slides in creation order.
async fn list(State(state): State<AppState>) -> Json<Vec<CarouselSlide>> {
    Json(state.service().list_slides().await)
}

async fn create(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Json(input), _): WithRejection<Json<NewSlide>, ApiError>,
) -> ApiResult<(StatusCode, Json<CarouselSlide>)> {
    let slide = state.service().create_slide(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(slide)))
}

async fn update(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<SlidePatch>, ApiError>,
) -> ApiResult<Json<CarouselSlide>> {
    Ok(Json(state.service().update_slide(&caller, id, patch).await?))
}

async fn remove(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<Deleted>> {
    state.service().delete_slide(&caller, id).await?;
    Ok(Json(Deleted::OK))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{send, TestApp};

    #[tokio::test]
    async fn admin_can_manage_slides() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let (status, created) = send(
            app.router(),
            Method::POST,
            "/api/carousel",
            Some(&token),
            Some(json!({"titulo": "Oportunidade", "descricao": "Invista", "imagemUrl": "https://img/a.jpg"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/carousel/{id}"),
            Some(&token),
            Some(json!({"titulo": "Nova"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["titulo"], "Nova");
        assert_eq!(updated["descricao"], "Invista");
        assert_eq!(updated["imagemUrl"], "https://img/a.jpg");

        let (status, body) =
            send(app.router(), Method::DELETE, &format!("/api/carousel/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (_, list) = send(app.router(), Method::GET, "/api/carousel", None, None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn mutations_need_an_admin() {
        let app = TestApp::new();
        let body = json!({"titulo": "X"});

        let (status, err) =
            send(app.router(), Method::POST, "/api/carousel", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["error"]["type"], "unauthorized");

        let visitor = app.visitor_token().await;
        let (status, err) =
            send(app.router(), Method::POST, "/api/carousel", Some(&visitor), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(err["error"]["type"], "forbidden");

        let (_, list) = send(app.router(), Method::GET, "/api/carousel", None, None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        for body in [json!({"titulo": "A", "cor": "azul"}), json!({"titulo": 3}), json!({"titulo": "  "})] {
            let (status, err) =
                send(app.router(), Method::POST, "/api/carousel", Some(&token), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(err["error"]["type"], "badRequest");
        }
    }

    #[tokio::test]
    async fn anonymous_malformed_body_is_unauthorized() {
        let app = TestApp::new();
        for (method, uri) in [(Method::POST, "/api/carousel"), (Method::PATCH, "/api/carousel/1")] {
            let (status, err) =
                send(app.router(), method, uri, None, Some(json!({"titulo": 3}))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(err["error"]["type"], "unauthorized");
        }

        let visitor = app.visitor_token().await;
        let (status, _) = send(
            app.router(),
            Method::POST,
            "/api/carousel",
            Some(&visitor),
            Some(json!({"cor": "azul"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn updating_a_missing_slide_is_not_found() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        let (status, _) = send(
            app.router(),
            Method::PATCH,
            "/api/carousel/999",
            Some(&token),
            Some(json!({"titulo": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(app.router(), Method::DELETE, "/api/carousel/999", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}
