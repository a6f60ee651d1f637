use std::sync::Arc;

use axum::{extract, http::HeaderMap, middleware::Next, response::IntoResponse};

/// Scheme, host and path prefix under which a client reached the api, so that
/// links work behind a reverse proxy.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let proto = header(headers, "x-forwarded-proto").unwrap_or("http");
        let host = header(headers, "x-forwarded-host")
            .or_else(|| header(headers, "host"))
            .unwrap_or("localhost");
        let prefix = header(headers, "x-forwarded-prefix").unwrap_or("");

        BaseUrl {
            proto: proto.to_owned(),
            host: host.to_owned(),
            prefix: prefix.trim_end_matches('/').to_owned(),
        }
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!("{}://{}{}{}", self.proto, self.host, self.prefix, path.into())
    }
}

pub async fn base_url_middleware(mut req: extract::Request, next: Next) -> impl IntoResponse {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn defaults_to_plain_localhost() {
        let base_url = BaseUrl::from_headers(&HeaderMap::new());
        assert_eq!(
            base_url.full_url("/api/v1/stations/1"),
            "http://localhost/api/v1/stations/1"
        );
    }

    #[test]
    fn forwarded_headers_win_over_host() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("internal:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("tickets.example"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/rail/"));
        let base_url = BaseUrl::from_headers(&headers);
        assert_eq!(
            base_url.full_url("/api/ping"),
            "https://tickets.example/rail/api/ping"
        );
    }
}
