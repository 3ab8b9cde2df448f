//! Scene source loading
//!
//! Parses the `{ "videos": [...] }` document and, with the `fetch` feature,
//! retrieves it over HTTP.

use crate::error::{Error, Result};
use crate::types::SceneList;
use tracing::debug;
use url::Url;

impl SceneList {
    /// Parse a scene source document. An empty list is a load error.
    pub fn from_json(json: &str) -> Result<Self> {
        let list: SceneList = serde_json::from_str(json)?;
        if list.is_empty() {
            return Err(Error::source_load("scene source contains no videos"));
        }
        debug!(scenes = list.len(), "Scene source parsed");
        Ok(list)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Resolve a possibly relative `json_url` against the page location
pub fn resolve_source_url(base: &str, json_url: &str) -> Result<Url> {
    match Url::parse(json_url) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Url::parse(base)?.join(json_url)?),
        Err(e) => Err(e.into()),
    }
}

#[cfg(feature = "fetch")]
pub use http::{HttpSource, SceneSource};

#[cfg(feature = "fetch")]
mod http {
    use super::*;
    use async_trait::async_trait;
    use tracing::info;

    /// Somewhere a scene list can be loaded from
    #[async_trait(?Send)]
    pub trait SceneSource {
        async fn load(&self) -> Result<SceneList>;
    }

    /// Scene source served over HTTP
    #[derive(Debug, Clone)]
    pub struct HttpSource {
        url: Url,
        client: reqwest::Client,
    }

    impl HttpSource {
        pub fn new(url: Url) -> Self {
            Self {
                url,
                client: reqwest::Client::new(),
            }
        }

        pub fn url(&self) -> &Url {
            &self.url
        }
    }

    #[async_trait(?Send)]
    impl SceneSource for HttpSource {
        async fn load(&self) -> Result<SceneList> {
            info!(url = %self.url, "Fetching scene source");

            let response = self
                .client
                .get(self.url.clone())
                .send()
                .await?
                .error_for_status()
                .map_err(|e| Error::source_load(format!("{}: {}", self.url, e)))?;
            let body = response.text().await?;

            SceneList::from_json(&body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"{
        "videos": [
            {
                "title": "Harbour",
                "project": "Coastline",
                "category": "film",
                "poster_smartphone": "img/harbour-s.jpg",
                "poster_tablet": "img/harbour-t.jpg",
                "poster_desktop": "img/harbour-d.jpg",
                "video_h264": "video/harbour.mp4",
                "video_webm": "video/harbour.webm"
            },
            {
                "title": "Dunes",
                "project": "Coastline",
                "category": "still",
                "poster_smartphone": "img/dunes-s.jpg",
                "poster_tablet": "img/dunes-t.jpg",
                "poster_desktop": "img/dunes-d.jpg"
            }
        ]
    }"#;

    #[test]
    fn test_parse_source() {
        let list = SceneList::from_json(SOURCE).unwrap();
        assert_eq!(list.len(), 2);

        let dunes = list.get(1).unwrap();
        assert_eq!(dunes.id, 1);
        assert_eq!(dunes.title, "Dunes");
        assert!(dunes.video_h264.is_none());
        assert!(dunes.available_codecs().is_empty());
    }

    #[test]
    fn test_empty_source_is_error() {
        let err = SceneList::from_json(r#"{"videos": []}"#).unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_LOAD");
    }

    #[test]
    fn test_malformed_source_is_error() {
        assert!(SceneList::from_json("{\"videos\": [{\"title\": 3}]}").is_err());
        assert!(SceneList::from_json("<html>").is_err());
    }

    #[test]
    fn test_serialized_form_matches_source_format() {
        let list = SceneList::from_json(SOURCE).unwrap();
        let value: serde_json::Value = serde_json::from_str(&list.to_json()).unwrap();
        assert_eq!(value["videos"][0]["title"], "Harbour");
        assert!(value["videos"][0].get("id").is_none());
        assert!(value["videos"][1].get("video_h264").is_none());
    }

    #[test]
    fn test_resolve_source_url() {
        let url = resolve_source_url("https://example.com/gallery/index.html", "data/scenes.json")
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/gallery/data/scenes.json");

        let url = resolve_source_url("https://example.com/gallery/", "/scenes.json").unwrap();
        assert_eq!(url.as_str(), "https://example.com/scenes.json");

        let url = resolve_source_url("https://example.com/", "https://cdn.example.com/s.json")
            .unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));

        assert!(resolve_source_url("not a base", "scenes.json").is_err());
    }

    /// Serve one connection with `response`, or close it unanswered when `None`
    #[cfg(feature = "fetch")]
    fn serve_once(response: Option<String>) -> Url {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                if let Some(response) = response {
                    let _ = stream.write_all(response.as_bytes());
                }
            }
        });
        Url::parse(&format!("http://{}/scenes.json", addr)).unwrap()
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_http_source_not_found() {
        let url = serve_once(Some(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string(),
        ));
        let err = tokio_test::block_on(HttpSource::new(url).load()).unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_LOAD");
        assert!(err.is_recoverable());
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_http_source_connection_closed() {
        let url = serve_once(None);
        let err = tokio_test::block_on(HttpSource::new(url).load()).unwrap_err();
        assert_eq!(err.error_code(), "NETWORK");
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_http_source_serves_scenes() {
        let body = r#"{"videos":[{"title":"Harbour","poster_smartphone":"s.jpg","poster_tablet":"t.jpg","poster_desktop":"d.jpg"}]}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let list = tokio_test::block_on(HttpSource::new(serve_once(Some(response))).load()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).map(|s| s.title.as_str()), Some("Harbour"));
    }
}
