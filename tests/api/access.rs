use actix_web::{test, web, App, HttpResponse, http::StatusCode};

use realworld_tags::middleware::Access;

use crate::helpers::*;

async fn secret() -> HttpResponse {
  HttpResponse::Ok().body("secret")
}

#[actix_rt::test]
async fn token_policy_rejects_anonymous_requests() {
  init_logging();
  let mut app = test::init_service(
    App::new().service(
      web::resource("/private")
        .wrap(Access::token_required())
        .route(web::get().to(secret))
    )
  ).await;

  let req = test::TestRequest::get().uri("/private").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/private")
    .header("Authorization", "Bearer abc")
    .to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn token_policy_admits_token_requests() {
  init_logging();
  let mut app = test::init_service(
    App::new().service(
      web::resource("/private")
        .wrap(Access::token_required())
        .route(web::get().to(secret))
    )
  ).await;

  let req = test::TestRequest::get()
    .uri("/private")
    .header("Authorization", "Token abc")
    .to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn public_policy_admits_everyone() {
  init_logging();
  let mut app = test::init_service(
    App::new().service(
      web::resource("/open")
        .wrap(Access::public_read())
        .route(web::get().to(secret))
    )
  ).await;

  let req = test::TestRequest::get().uri("/open").to_request();
  let resp = test::call_service(&mut app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}
