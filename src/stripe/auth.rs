use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum_extra::headers::{self, HeaderMapExt};

pub fn authenticated_headers(secret_key: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.typed_insert(
        headers::Authorization::bearer(secret_key).expect("secret key is validated at startup"),
    );
    map.typed_insert(headers::ContentType::form_url_encoded());
    map
}

/// Same as [authenticated_headers] plus the API version pin.
///
/// The ephemeral key endpoint refuses to answer without a version; a version
/// that differs from the one the client SDK expects only fails later, at
/// confirmation time.
pub fn versioned_headers(secret_key: &str, api_version: &str) -> HeaderMap {
    let mut map = authenticated_headers(secret_key);
    map.insert(
        HeaderName::from_static("stripe-version"),
        HeaderValue::from_str(api_version).expect("api version is ascii"),
    );
    map
}
