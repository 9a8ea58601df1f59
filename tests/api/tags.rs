use actix_web::{test, App, http::StatusCode};
use serde_json::{json, Value};

use realworld_tags::{
  app::AppConfig,
  services::config_services,
};

use crate::helpers::*;

#[actix_rt::test]
async fn lists_tags_in_store_order() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Tags(vec!["go", "rust", "api"]), false))
  ).await;

  let req = test::TestRequest::get().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!(["go", "rust", "api"]));
}

#[actix_rt::test]
async fn empty_store_gives_empty_array() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Tags(vec![]), false))
  ).await;

  let req = test::TestRequest::get().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body = test::read_body(resp).await;
  assert_eq!(&body[..], b"[]");
}

#[actix_rt::test]
async fn envelope_mode_wraps_tags() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Tags(vec!["go", "rust"]), true))
  ).await;

  let req = test::TestRequest::get().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "tags": ["go", "rust"] }));
}

#[actix_rt::test]
async fn credentials_are_not_inspected() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Tags(vec!["rust"]), false))
  ).await;

  let req = test::TestRequest::get()
    .uri("/api/tags")
    .header("Authorization", "not-a-token")
    .to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn store_failure_is_500() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Failing, false))
  ).await;

  let req = test::TestRequest::get().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_rt::test]
async fn lost_database_is_502() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Disconnected, false))
  ).await;

  let req = test::TestRequest::get().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_rt::test]
async fn only_get_is_routed() {
  init_logging();
  let mut app = test::init_service(
    App::new().configure(tag_app(StubStore::Tags(vec!["rust"]), false))
  ).await;

  let req = test::TestRequest::post().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert!(resp.status().is_client_error());
}

#[actix_rt::test]
async fn configured_services_serve_memory_tags() {
  init_logging();
  let config = AppConfig::from_toml_str(r#"
    [api]
    services = ["Tag"]

    [Tag]
    seed = ["realworld", "actix"]
    envelope = true
  "#).unwrap();
  let services = config_services(&config, "api").unwrap();

  let mut app = test::init_service(
    App::new().configure(|web| services.web_config(web))
  ).await;

  let req = test::TestRequest::get().uri("/api/tags").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "tags": ["realworld", "actix"] }));
}
