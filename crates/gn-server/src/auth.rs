//! HTTP Basic-auth gate for the officer's login.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header::AUTHORIZATION},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::error::Error;

/// The single officer login this server accepts.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// argon2 PHC string, as printed by `gn-registry hash-password`.
  pub password_hash: String,
}

/// Check a request's `Authorization: Basic` header against `config`.
///
/// Any missing, malformed or wrong credential yields
/// [`Error::Unauthorized`]; [`require_auth`] turns that into a 401.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let (username, password) =
    basic_credentials(headers).ok_or(Error::Unauthorized)?;
  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let hash =
    PasswordHash::new(&config.password_hash).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &hash)
    .map_err(|_| Error::Unauthorized)
}

/// Decode `Authorization: Basic <base64(user:pass)>` into its two halves.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Middleware rejecting any request without valid credentials.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  match verify_auth(req.headers(), &config) {
    Ok(()) => next.run(req).await,
    Err(e) => {
      tracing::debug!(path = %req.uri().path(), "rejected unauthenticated request");
      e.into_response()
    }
  }
}

/// Argon2 PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, header};

  fn config(password: &str) -> AuthConfig {
    AuthConfig {
      username:      "officer".to_string(),
      password_hash: hash_password(password).unwrap(),
    }
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let encoded = B64.encode(format!("{user}:{pass}"));
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
    );
    headers
  }

  #[test]
  fn correct_credentials() {
    assert!(verify_auth(&basic("officer", "secret"), &config("secret")).is_ok());
  }

  #[test]
  fn wrong_password() {
    assert!(matches!(
      verify_auth(&basic("officer", "wrong"), &config("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn wrong_username() {
    assert!(matches!(
      verify_auth(&basic("intruder", "secret"), &config("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &config("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_static("Basic !!!not-base64!!!"),
    );
    assert!(matches!(
      verify_auth(&headers, &config("secret")),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn unparseable_stored_hash_rejects() {
    let cfg = AuthConfig {
      username:      "officer".to_string(),
      password_hash: "plaintext".to_string(),
    };
    assert!(verify_auth(&basic("officer", "plaintext"), &cfg).is_err());
  }
}
