use std::sync::Arc;

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use uuid::Uuid;

use super::jwt::{SessionToken, AUTH_COOKIE_NAME};
use super::problem::{problems, Problem};
use crate::config::Config;
use crate::security::Security;

/// Verifies the raw session token of a request and yields the caller's id.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: Option<&str>) -> Result<Uuid, Problem>;

    fn name(&self) -> &'static str;
}

/// Signature and expiry checking authenticator used by every normal deployment.
pub struct JwtAuthenticator {
    security: Security,
}

impl JwtAuthenticator {
    pub fn new(security: Security) -> JwtAuthenticator {
        JwtAuthenticator { security }
    }
}

impl Authenticator for JwtAuthenticator {
    fn verify(&self, token: Option<&str>) -> Result<Uuid, Problem> {
        let token = token.ok_or_else(|| problems::unauthorized("No authorization token was found."))?;
        let claims = SessionToken::decode_jwt(token, &self.security)?;

        tracing::debug!("decoded session token for user: {}", claims.user);
        Ok(claims.user)
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}

/// Accepts any request. The identity is read from an unverified token when one
/// is present and falls back to the configured development identity.
#[cfg(feature = "insecure-dev-auth")]
pub struct InsecureDevAuthenticator {
    identity: Option<Uuid>,
}

#[cfg(feature = "insecure-dev-auth")]
impl InsecureDevAuthenticator {
    pub fn new(identity: Option<Uuid>) -> InsecureDevAuthenticator {
        InsecureDevAuthenticator { identity }
    }

    fn unverified_claims(token: &str) -> Option<SessionToken> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<SessionToken>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(feature = "insecure-dev-auth")]
impl Authenticator for InsecureDevAuthenticator {
    fn verify(&self, token: Option<&str>) -> Result<Uuid, Problem> {
        token
            .and_then(Self::unverified_claims)
            .map(|claims| claims.user)
            .or(self.identity)
            .ok_or_else(|| problems::unauthorized("No development identity configured."))
    }

    fn name(&self) -> &'static str {
        "insecure-dev"
    }
}

/// Why a requested insecure bypass wasn't selected, if one was requested.
#[cfg(feature = "insecure-dev-auth")]
fn ignored_dev_auth_reason(config: &Config) -> Option<String> {
    (config.insecure_dev_auth && !config.is_development()).then(|| {
        format!(
            "environment is {:?}, the bypass needs development.",
            config.environment
        )
    })
}

#[cfg(not(feature = "insecure-dev-auth"))]
fn ignored_dev_auth_reason(config: &Config) -> Option<String> {
    config
        .insecure_dev_auth
        .then(|| "this build lacks the insecure-dev-auth feature.".to_string())
}

/// Managed state wrapping the authenticator picked at startup.
#[derive(Clone)]
pub struct Gatekeeper(Arc<dyn Authenticator>);

impl Gatekeeper {
    pub fn new(authenticator: impl Authenticator + 'static) -> Gatekeeper {
        Gatekeeper(Arc::new(authenticator))
    }

    /// Picks the authenticator for a configuration. The verification-skipping
    /// one is only reachable from a development configuration of a build with
    /// the `insecure-dev-auth` feature.
    pub fn for_config(config: &Config, security: Security) -> Gatekeeper {
        #[cfg(feature = "insecure-dev-auth")]
        if config.is_development() && config.insecure_dev_auth {
            tracing::warn!(
                "INSECURE development authentication enabled: session tokens are NOT verified."
            );
            return Gatekeeper::new(InsecureDevAuthenticator::new(config.dev_identity));
        }

        if let Some(reason) = ignored_dev_auth_reason(config) {
            tracing::warn!("Ignoring insecure_dev_auth: {}", reason);
        }

        Gatekeeper::new(JwtAuthenticator::new(security))
    }

    pub fn verify(&self, token: Option<&str>) -> Result<Uuid, Problem> {
        self.0.verify(token)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl std::fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gatekeeper({})", self.name())
    }
}

/// Token from the `Authorization: Bearer` header, else from the session cookie.
fn request_token(req: &Request<'_>) -> Option<String> {
    req.headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            req.cookies()
                .get(AUTH_COOKIE_NAME)
                .map(|cookie| cookie.value().to_string())
        })
}

/// Identity of a signed-in caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

impl AuthUser {
    /// Fails with 403 unless the caller is `target`.
    pub fn require_self(&self, target: Uuid) -> Result<(), Problem> {
        if self.id == target {
            Ok(())
        } else {
            Err(problems::forbidden())
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let gatekeeper = match req.rocket().state::<Gatekeeper>() {
            Some(it) => it,
            None => {
                let problem = problems::internal(
                    "Authentication is not configured.",
                    "no authenticator in managed state",
                );
                return Outcome::Error((Status::InternalServerError, problem));
            }
        };

        tracing::trace!("extracting session token from request");
        match gatekeeper.verify(request_token(req).as_deref()) {
            Ok(id) => Outcome::Success(AuthUser { id }),
            Err(problem) => {
                tracing::debug!("rejected session token: {:?}", problem.detail);
                // The 401 catcher renders the cached problem.
                req.local_cache(|| Some(problem.clone()));
                Outcome::Error((Status::Unauthorized, problem))
            }
        }
    }
}
