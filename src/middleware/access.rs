use log::*;

use std::task::{Context, Poll};

use futures::future::{ok, Either, Ready};
use serde_json::json;

use actix_web::{
  http::{
    HeaderMap,
    header::AUTHORIZATION,
  },
  Error,
};
use actix_web::dev::{
  Service, Transform,
  ServiceRequest, ServiceResponse,
};

use crate::error::Result;

const TOKEN_PREFIX: &str = "Token ";

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
  /// Anyone, credentials are never looked at.
  PublicRead,
  /// Requests carrying an `Authorization: Token <token>` header.
  TokenRequired,
}

impl Policy {
  pub fn allows(&self, headers: &HeaderMap) -> Result<()> {
    match self {
      Policy::PublicRead => Ok(()),
      Policy::TokenRequired => {
        let token = headers.get(AUTHORIZATION).ok_or_else(|| {
          crate::error::Error::Unauthorized(json!({
            "error": "authorization required",
          }))
        })?;
        let token = token.to_str().map_err(|_| {
          crate::error::Error::Unauthorized(json!({
            "error": "Invalid authorization token",
          }))
        })?;
        if !token.starts_with(TOKEN_PREFIX) || token.len() == TOKEN_PREFIX.len() {
          return Err(crate::error::Error::Unauthorized(json!({
            "error": "Invalid authorization method",
          })));
        }
        Ok(())
      },
    }
  }
}

/// Route guard, checked before the handler runs:
/// `#[get("/tags", wrap = "Access::public_read()")]`.
pub struct Access {
  pub policy: Policy,
}

impl Access {
  pub fn public_read() -> Self {
    Self {
      policy: Policy::PublicRead,
    }
  }

  pub fn token_required() -> Self {
    Self {
      policy: Policy::TokenRequired,
    }
  }
}

impl<S, B> Transform<S> for Access
where
  S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
  S::Future: 'static,
{
  type Request = ServiceRequest;
  type Response = ServiceResponse<B>;
  type Error = Error;
  type InitError = ();
  type Transform = AccessMiddleware<S>;
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ok(AccessMiddleware {
      policy: self.policy,
      service
    })
  }
}

pub struct AccessMiddleware<S> {
  policy: Policy,
  service: S,
}

impl<S, B> Service for AccessMiddleware<S>
where
  S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
  S::Future: 'static,
{
  type Request = ServiceRequest;
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Future = Either<S::Future, Ready<Result<Self::Response, Self::Error>>>;

  fn poll_ready(&mut self, cx: &mut Context) -> Poll<Result<(), Self::Error>> {
    self.service.poll_ready(cx)
  }

  fn call(&mut self, req: ServiceRequest) -> Self::Future {
    match self.policy.allows(req.headers()) {
      Ok(()) => {
        Either::Left(self.service.call(req))
      },
      Err(err) => {
        debug!("Access denied: policy={:?}, path={}: {}", self.policy, req.path(), err);
        Either::Right(ok(req.error_response(err)))
      },
    }
  }
}
