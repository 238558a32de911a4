//! Local stand-ins for the hosted APIs.

use std::sync::{Arc, Mutex};

use axum::http::{StatusCode, Uri};
use axum::{Json, Router};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::Value;
use wordbot_core::ImageInput;

#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub query: String,
    pub body: String,
}

pub struct MockServer {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockServer {
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }
}

/// Serve `reply` with `status` for every request.
pub async fn serve(status: u16, reply: Value) -> MockServer {
    serve_with(move |_| (status, reply.clone())).await
}

/// Serve whatever `respond` returns for each request.
pub async fn serve_with<F>(respond: F) -> MockServer
where
    F: Fn(&Hit) -> (u16, Value) + Clone + Send + Sync + 'static,
{
    let hits = Arc::new(Mutex::new(Vec::new()));
    let recorded = hits.clone();
    let app = Router::new().fallback(move |uri: Uri, body: String| {
        let recorded = recorded.clone();
        let respond = respond.clone();
        async move {
            let hit = Hit {
                path: uri.path().to_string(),
                query: uri.query().unwrap_or_default().to_string(),
                body,
            };
            let (status, reply) = respond(&hit);
            recorded.lock().unwrap().push(hit);
            (StatusCode::from_u16(status).unwrap(), Json(reply))
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockServer {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// A small PNG with a dark bar across a light page.
pub fn sample_image() -> ImageInput {
    let img = RgbImage::from_fn(24, 12, |x, y| {
        if (4..8).contains(&y) && (3..21).contains(&x) {
            Rgb([30, 30, 30])
        } else {
            Rgb([235, 235, 235])
        }
    });
    wordbot_media::from_dynamic(&DynamicImage::ImageRgb8(img)).unwrap()
}
