// Integration tests for Swipe Quiz

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use swipe_quiz::core::Quiz;
use swipe_quiz::models::{Product, ProductId, Recommendations, SessionView, Stage};
use swipe_quiz::routes::{self, sessions::AppState};
use swipe_quiz::services::{CatalogClient, CatalogError, CatalogService, SessionStore};

struct FixedCatalog {
    candidates: Vec<Product>,
    fail_recommendations: bool,
}

#[async_trait]
impl CatalogService for FixedCatalog {
    async fn fetch_candidates(&self, _answers: &[String]) -> Result<Vec<Product>, CatalogError> {
        Ok(self.candidates.clone())
    }

    async fn fetch_recommendations(
        &self,
        liked: &[Product],
        gender: Option<&str>,
    ) -> Result<Recommendations, CatalogError> {
        if self.fail_recommendations {
            return Err(CatalogError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        let mut pick = Product::new("r1", format!("For {}", gender.unwrap_or("anyone")), 500.0);
        pick.images = vec!["https://img.test/r1.jpg".into()];
        Ok(Recommendations {
            gender_recommendations: vec![pick],
            additional_recommendations: liked.to_vec(),
        })
    }
}

fn candidates() -> Vec<Product> {
    vec![
        Product::new("1", "Massage oil", 320.0),
        Product::new("2", "Candle", 180.0),
    ]
}

fn app_state(catalog: FixedCatalog) -> AppState {
    AppState {
        sessions: Arc::new(SessionStore::new(
            Arc::new(catalog),
            Arc::new(Quiz::builtin()),
            100,
            60,
        )),
    }
}

#[actix_web::test]
async fn test_http_session_walks_all_stages() {
    let state = app_state(FixedCatalog {
        candidates: candidates(),
        fail_recommendations: false,
    });
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let view: SessionView = test::read_body_json(resp).await;
    assert_eq!(view.stage, Stage::Quiz);
    let id = view.session_id;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/answer", id))
        .set_json(json!({ "label": "Для себе" }))
        .to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.question.as_ref().unwrap().key, "gender");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/answer", id))
        .set_json(json!({ "label": "Жінка" }))
        .to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.stage, Stage::Swipe);
    assert_eq!(view.card.as_ref().unwrap().total, 2);

    for liked in [true, false] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{}/swipe", id))
            .set_json(json!({ "liked": liked }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.stage, Stage::Results);
    let results = view.results.unwrap();
    assert_eq!(results.liked.len(), 1);
    assert_eq!(results.liked[0].name, "Massage oil");
    assert_eq!(results.gender_recommendations[0].name, "For Жінка");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/restart", id))
        .to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.stage, Stage::Quiz);
    assert!(view.answers.is_empty());
    assert!(view.results.is_none());
}

#[actix_web::test]
async fn test_http_rejections() {
    let state = app_state(FixedCatalog {
        candidates: candidates(),
        fail_recommendations: false,
    });
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", uuid::Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/swipe", view.session_id))
        .set_json(json!({ "liked": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/answer", view.session_id))
        .set_json(json!({ "label": "Не з опцій" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/answer", view.session_id))
        .set_json(json!({ "label": "" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_http_retry_after_recommendation_failure() {
    let state = app_state(FixedCatalog {
        candidates: vec![Product::new("1", "Candle", 180.0)],
        fail_recommendations: true,
    });
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
    let id = test::call_and_read_body_json::<_, _, SessionView>(&app, req).await.session_id;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/answer", id))
        .set_json(json!({ "label": "Для подарунка" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/swipe", id))
        .set_json(json!({ "liked": true }))
        .to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.stage, Stage::Swipe);
    assert!(!view.loading);
    assert_eq!(view.error.as_deref(), Some("Не вдалося отримати рекомендації"));
    assert!(view.card.is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/retry", id))
        .to_request();
    let view: SessionView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.stage, Stage::Swipe);
    assert!(view.error.is_some());
}

#[actix_web::test]
async fn test_quiz_and_health_endpoints() {
    let state = app_state(FixedCatalog {
        candidates: vec![],
        fail_recommendations: false,
    });
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/quiz").to_request();
    let quiz: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(quiz["genderStep"], "gender");
    assert_eq!(quiz["steps"].as_array().unwrap().len(), 2);
    assert_eq!(quiz["steps"][1]["conditional"], true);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let health: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_catalog_client_fetches_candidates() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/products/swipe")
        .match_body(Matcher::Json(json!({
            "answers": ["Для себе", "Жінка"],
            "excluded_ids": []
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "products": [
                    { "id": 7, "name": "Oil", "price": "250", "picture": ["a.jpg"], "url": "https://shop.test/7" },
                    { "id": "x-8", "name": "Candle", "price": 99.5 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CatalogClient::new(format!("{}/api", server.url()), Duration::from_secs(5)).unwrap();
    let products = client
        .fetch_candidates(&["Для себе".to_string(), "Жінка".to_string()])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::Number(7));
    assert_eq!(products[0].price_amount(), Some(250.0));
    assert_eq!(products[1].id, ProductId::Text("x-8".into()));
    assert!(products[1].images.is_empty());
}

#[tokio::test]
async fn test_catalog_client_accepts_null_fields() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/products/swipe")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "products": [
                    { "id": 1, "name": "Candle", "price": 180, "picture": ["c.jpg"], "url": "https://shop.test/1" },
                    { "id": 2, "name": null, "price": "", "picture": null, "url": null }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = CatalogClient::new(server.url(), Duration::from_secs(5)).unwrap();
    let products = client.fetch_candidates(&[]).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[1].name, "");
    assert_eq!(products[1].primary_image(), None);
    assert_eq!(products[1].price_amount(), None);
}

#[tokio::test]
async fn test_catalog_client_defaults_missing_products() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/products/swipe")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let client = CatalogClient::new(server.url(), Duration::from_secs(5)).unwrap();
    let products = client.fetch_candidates(&[]).await.unwrap();

    assert!(products.is_empty());
}

#[tokio::test]
async fn test_catalog_client_sends_liked_products_and_gender() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/products/recommendations")
        .match_body(Matcher::PartialJson(json!({
            "liked_products": [{ "id": 7, "name": "Oil", "price": "250", "vendor": "Acme" }],
            "gender": "Жінка"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "gender_recommendations": [{ "id": 1, "name": "Lace", "price": 700 }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let liked: Product = serde_json::from_value(json!({
        "id": 7, "name": "Oil", "price": "250", "picture": [], "url": "", "vendor": "Acme"
    }))
    .unwrap();

    let client = CatalogClient::new(server.url(), Duration::from_secs(5)).unwrap();
    let recs = client
        .fetch_recommendations(&[liked], Some("Жінка"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(recs.gender_recommendations.len(), 1);
    assert!(recs.additional_recommendations.is_empty());
}

#[tokio::test]
async fn test_catalog_client_reports_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/products/recommendations")
        .with_status(503)
        .create_async()
        .await;

    let client = CatalogClient::new(server.url(), Duration::from_secs(5)).unwrap();
    let err = client.fetch_recommendations(&[], None).await.unwrap_err();

    assert!(matches!(err, CatalogError::Status(status) if status.as_u16() == 503));
}
