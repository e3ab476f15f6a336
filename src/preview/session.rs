use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;

use crate::app::AppState;
use crate::preview::marker::{PreviewMarker, PreviewRead, PreviewWrite};
use crate::settings::PreviewSettings;

/// Preview state of a request, backed by a signed cookie.
///
/// Extract it in a handler, read it through [`PreviewRead`], change it through
/// [`PreviewWrite`], and return it as part of the response so the cookie
/// update reaches the client. Unsigned or tampered cookies read as no marker.
pub struct PreviewSession {
    jar: SignedCookieJar,
    cookie_name: String,
    secure: bool,
}

impl PreviewSession {
    pub fn new(jar: SignedCookieJar, settings: &PreviewSettings) -> Self {
        Self {
            jar,
            cookie_name: settings.cookie_name.clone(),
            secure: settings.secure,
        }
    }
}

impl FromRequestParts<AppState> for PreviewSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        Ok(Self::new(jar, &state.settings.preview))
    }
}

impl PreviewRead for PreviewSession {
    fn marker(&self) -> Option<PreviewMarker> {
        self.jar
            .get(&self.cookie_name)
            .and_then(|cookie| PreviewMarker::decode(cookie.value()))
    }
}

impl PreviewWrite for PreviewSession {
    fn activate(self, marker: &PreviewMarker) -> Self {
        let cookie = Cookie::build((self.cookie_name.clone(), marker.encode()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build();

        Self {
            jar: self.jar.add(cookie),
            ..self
        }
    }

    fn deactivate(self) -> Self {
        let cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .build();

        Self {
            jar: self.jar.remove(cookie),
            ..self
        }
    }
}

impl IntoResponseParts for PreviewSession {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}
