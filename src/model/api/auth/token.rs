use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::common::{Jurisdiction, Location};

use super::viewer::{Role, Viewer};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Token claims as issued by the identity provider.
#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "rgt")]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loc: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jur: Option<Jurisdiction>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

impl TryFrom<Claims> for Viewer {
    type Error = Error;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims.sub.parse()?;
        match (claims.role, claims.loc, claims.jur) {
            (Role::Citizen, location, None) => Ok(Self::Citizen { id, location }),
            (Role::Official, None, jurisdiction) => Ok(Self::Official { id, jurisdiction }),
            (role, _, _) => Err(Error::Unauthorized(format!(
                "token carries the wrong kind of area for a {role}"
            ))),
        }
    }
}

impl Viewer {
    /// Sign this identity into a token.
    pub fn to_token(&self, config: &Config) -> Result<String, Error> {
        let (loc, jur) = match self {
            Self::Citizen { location, .. } => (location.clone(), None),
            Self::Official { jurisdiction, .. } => (None, jurisdiction.clone()),
        };
        let claims = Claims {
            sub: self.id().to_string(),
            role: self.role(),
            loc,
            jur,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;
        Ok(token)
    }

    /// Sign this identity into a cookie.
    pub fn to_cookie(&self, config: &Config) -> Result<Cookie<'static>, Error> {
        let token = self.to_token(config)?;
        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Verify a token and extract the identity it carries.
    pub fn from_token(token: &str, config: &Config) -> Result<Self, Error> {
        let claims = jsonwebtoken::decode(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data: TokenData<Claims>| data.claims)?;
        claims.try_into()
    }
}

/// Find the raw token, preferring the cookie over the `Authorization` header.
fn raw_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    if let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) {
        return Some(cookie.value());
    }
    req.headers()
        .get_one("Authorization")
        .and_then(|header| header.strip_prefix("Bearer "))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Viewer {
    type Error = Error;

    /// Get the [`Viewer`] from the cookie or bearer token.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let token = match raw_token(req) {
            Some(token) => token,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::Unauthorized("no authentication token".to_string()),
                ))
            }
        };

        match Self::from_token(token, config) {
            Ok(viewer) => {
                trace!("Request made by {} {}", viewer.role(), viewer.id());
                Outcome::Success(viewer)
            }
            Err(e) => {
                warn!("Rejected authentication token: {e}");
                Outcome::Failure((Status::Unauthorized, e))
            }
        }
    }
}
