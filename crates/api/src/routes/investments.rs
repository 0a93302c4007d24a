use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use lobianco_core::content::{Investment, InvestmentFilter, InvestmentPatch, NewInvestment};

use super::Deleted;
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminCaller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/investments", get(list).post(create))
        .route("/api/investments/{id}", patch(update).delete(remove))
}

/// All listings, or only those of `?tipo=`. Unknown kinds are rejected.
async fn list(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<InvestmentFilter>, ApiError>,
) -> Json<Vec<Investment>> {
    Json(state.service().list_investments(filter.kind).await)
}

async fn create(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Json(input), _): WithRejection<Json<NewInvestment>, ApiError>,
) -> ApiResult<(StatusCode, Json<Investment>)> {
    let investment = state.service().create_investment(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

async fn update(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<InvestmentPatch>, ApiError>,
) -> ApiResult<Json<Investment>> {
    Ok(Json(state.service().update_investment(&caller, id, patch).await?))
}

async fn remove(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<Deleted>> {
    state.service().delete_investment(&caller, id).await?;
    Ok(Json(Deleted::OK))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{send, TestApp};

    #[tokio::test]
    async fn rental_without_image_shows_up_under_its_kind() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let (status, _) = send(
            app.router(),
            Method::POST,
            "/api/investments",
            Some(&token),
            Some(json!({"tipo": "lancamentos", "titulo": "Torre Azul"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, created) = send(
            app.router(),
            Method::POST,
            "/api/investments",
            Some(&token),
            Some(json!({"tipo": "aluguel", "titulo": "Casa X"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["imagemUrl"], serde_json::Value::Null);

        let (status, rentals) =
            send(app.router(), Method::GET, "/api/investments?tipo=aluguel", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let rentals = rentals.as_array().unwrap();
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0]["titulo"], "Casa X");
        assert_eq!(rentals[0]["tipo"], "aluguel");

        let (_, all) = send(app.router(), Method::GET, "/api/investments", None, None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn kind_outside_the_closed_set_is_rejected() {
        let app = TestApp::new();
        let token = app.admin_token().await;

        let (status, _) = send(
            app.router(),
            Method::POST,
            "/api/investments",
            Some(&token),
            Some(json!({"tipo": "venda", "titulo": "Casa"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(app.router(), Method::GET, "/api/investments?tipo=venda", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn features_update_partially() {
        let app = TestApp::new();
        let token = app.admin_token().await;
        let (_, created) = send(
            app.router(),
            Method::POST,
            "/api/investments",
            Some(&token),
            Some(json!({
                "tipo": "na_planta",
                "titulo": "Edifício",
                "endereco": "Rua A, 10",
                "bedrooms": 3,
                "pool": true,
                "price": 450000
            })),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = send(
            app.router(),
            Method::PATCH,
            &format!("/api/investments/{id}"),
            Some(&token),
            Some(json!({"price": 430000, "endereco": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], 430000);
        assert_eq!(updated["endereco"], serde_json::Value::Null);
        assert_eq!(updated["bedrooms"], 3);
        assert_eq!(updated["pool"], true);
        assert_eq!(updated["titulo"], "Edifício");
    }
}
