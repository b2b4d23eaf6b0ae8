//! Signed session cookie holding the caller's identity.

use super::Identity;
use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use actix_web::HttpRequest;
use actix_web::dev::ServiceRequest;

pub const SESSION_COOKIE: &str = "portal_session";

/// Builds the signed cookie for a freshly authenticated identity.
pub fn issue(key: &Key, identity: Identity) -> Cookie<'static> {
    let mut jar = CookieJar::new();
    jar.signed_mut(key).add(
        Cookie::build(SESSION_COOKIE, identity.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    );
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.clone(),
        None => Cookie::named(SESSION_COOKIE),
    }
}

/// A cookie that clears the session when sent back.
pub fn removal() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Verifies the signature and parses the identity. Tampered or malformed
/// cookies read as anonymous.
pub fn read(key: &Key, cookie: Option<Cookie<'static>>) -> Option<Identity> {
    let mut jar = CookieJar::new();
    jar.add_original(cookie?);
    let verified = jar.signed(key).get(SESSION_COOKIE)?;
    verified.value().parse().ok()
}

pub fn from_request(key: &Key, req: &HttpRequest) -> Option<Identity> {
    read(key, req.cookie(SESSION_COOKIE))
}

pub fn from_service_request(key: &Key, req: &ServiceRequest) -> Option<Identity> {
    read(key, req.cookie(SESSION_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::Role;

    fn key() -> Key {
        Key::derive_from(b"an-adequately-long-secret-for-signing-tests")
    }

    #[test]
    fn issued_cookies_read_back() {
        let identity = Identity { role: Role::Admin, id: 1 };
        let cookie = issue(&key(), identity);
        assert_ne!(cookie.value(), "admin:1");
        assert_eq!(read(&key(), Some(cookie)), Some(identity));
    }

    #[test]
    fn tampered_cookies_are_anonymous() {
        let forged = Cookie::new(SESSION_COOKIE, "admin:1");
        assert_eq!(read(&key(), Some(forged)), None);

        let other = Key::derive_from(b"a-completely-different-secret-key-of-length");
        let cookie = issue(&other, Identity { role: Role::Admin, id: 1 });
        assert_eq!(read(&key(), Some(cookie)), None);
    }
}
