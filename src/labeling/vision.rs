//! Cloud Vision `images:annotate` client: label and face detection.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ImageSource, Joy, LabelError, Labeler};
use crate::config::LabelingConfig;

const LABEL_DETECTION: &str = "LABEL_DETECTION";
const FACE_DETECTION: &str = "FACE_DETECTION";

pub struct VisionLabeler {
    http: Client,
    endpoint: String,
    api_key: String,
    max_results: u32,
}

impl VisionLabeler {
    pub fn new(config: &LabelingConfig, api_key: String) -> Result<Self, LabelError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            max_results: config.max_results,
        })
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<AnnotateResponse, LabelError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(LabelError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Run one feature against one image.
    async fn annotate(
        &self,
        image: ImageSource<'_>,
        kind: &'static str,
        max_results: u32,
    ) -> Result<AnnotateResponse, LabelError> {
        let request = build_request(image, kind, max_results);

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

// -- Wire types --

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: [ImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: Image<'a>,
    features: [Feature; 1],
}

#[derive(Serialize)]
#[serde(untagged)]
enum Image<'a> {
    Source { source: Source<'a> },
    Content { content: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Source<'a> {
    image_uri: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Deserialize, Default)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    face_annotations: Vec<FaceAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct LabelAnnotation {
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceAnnotation {
    #[serde(default)]
    joy_likelihood: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// The service can fetch http(s) and gs:// URIs itself; anything else is sent inline.
fn image_for(source: ImageSource<'_>) -> Image<'_> {
    let fetchable = ["http://", "https://", "gs://"]
        .iter()
        .any(|scheme| source.uri.starts_with(scheme));

    if fetchable {
        Image::Source {
            source: Source {
                image_uri: source.uri,
            },
        }
    } else {
        Image::Content {
            content: base64::engine::general_purpose::STANDARD.encode(source.content),
        }
    }
}

fn build_request<'a>(
    source: ImageSource<'a>,
    kind: &'static str,
    max_results: u32,
) -> AnnotateRequest<'a> {
    AnnotateRequest {
        requests: [ImageRequest {
            image: image_for(source),
            features: [Feature { kind, max_results }],
        }],
    }
}

/// The single per-image response, or the error it carries.
fn first_response(response: AnnotateResponse) -> Result<ImageResponse, LabelError> {
    let first = response.responses.into_iter().next().unwrap_or_default();
    match first.error {
        Some(status) => Err(LabelError::Annotation(status.message)),
        None => Ok(first),
    }
}

fn labels_from(response: AnnotateResponse) -> Result<Vec<String>, LabelError> {
    Ok(first_response(response)?
        .label_annotations
        .into_iter()
        .map(|label| label.description)
        .collect())
}

fn joy_from(response: AnnotateResponse) -> Result<Joy, LabelError> {
    Ok(first_response(response)?
        .face_annotations
        .first()
        .map(|face| Joy::from_likelihood(&face.joy_likelihood))
        .unwrap_or_default())
}

#[async_trait]
impl Labeler for VisionLabeler {
    async fn detect_labels(&self, image: ImageSource<'_>) -> Result<Vec<String>, LabelError> {
        let response = self
            .annotate(image, LABEL_DETECTION, self.max_results)
            .await?;
        let labels = labels_from(response)?;
        tracing::debug!("Labeled {} with {} labels", image.uri, labels.len());
        Ok(labels)
    }

    async fn detect_joy(&self, image: ImageSource<'_>) -> Result<Joy, LabelError> {
        // Only the first face is scored
        let joy = joy_from(self.annotate(image, FACE_DETECTION, 1).await?)?;
        tracing::debug!("Joy for {}: {}", image.uri, joy);
        Ok(joy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn image<'a>(uri: &'a str, content: &'a [u8]) -> ImageSource<'a> {
        ImageSource { uri, content }
    }

    #[test]
    fn fetchable_uri_is_passed_by_reference() {
        let request = build_request(image("gs://bucket/cat.png", b"ignored"), LABEL_DETECTION, 5);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "requests": [{
                    "image": { "source": { "imageUri": "gs://bucket/cat.png" } },
                    "features": [{ "type": "LABEL_DETECTION", "maxResults": 5 }]
                }]
            })
        );
    }

    #[test]
    fn local_uri_is_sent_inline() {
        let request = build_request(image("file:///data/cat.png", b"abc"), FACE_DETECTION, 1);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["requests"][0]["image"], json!({ "content": "YWJj" }));
        assert_eq!(
            body["requests"][0]["features"],
            json!([{ "type": "FACE_DETECTION", "maxResults": 1 }])
        );
    }

    #[test]
    fn labels_come_back_in_response_order() {
        let response: AnnotateResponse = serde_json::from_value(json!({
            "responses": [{
                "labelAnnotations": [
                    { "description": "Cat", "score": 0.98 },
                    { "description": "Whiskers", "score": 0.91 }
                ]
            }]
        }))
        .unwrap();
        assert_eq!(labels_from(response).unwrap(), vec!["Cat", "Whiskers"]);
    }

    #[test]
    fn empty_response_means_no_labels() {
        let response: AnnotateResponse = serde_json::from_value(json!({ "responses": [{}] })).unwrap();
        assert!(labels_from(response).unwrap().is_empty());
        assert!(labels_from(AnnotateResponse::default()).unwrap().is_empty());
    }

    #[test]
    fn per_image_error_is_reported() {
        let response: AnnotateResponse = serde_json::from_value(json!({
            "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
        }))
        .unwrap();
        assert!(matches!(
            labels_from(response),
            Err(LabelError::Annotation(msg)) if msg == "Bad image data."
        ));
    }

    #[test]
    fn joy_comes_from_first_face() {
        let response: AnnotateResponse = serde_json::from_value(json!({
            "responses": [{
                "faceAnnotations": [
                    { "joyLikelihood": "LIKELY", "sorrowLikelihood": "VERY_UNLIKELY" },
                    { "joyLikelihood": "VERY_UNLIKELY" }
                ]
            }]
        }))
        .unwrap();
        assert_eq!(joy_from(response).unwrap(), Joy::Likely);
    }

    #[test]
    fn no_faces_means_unknown_joy() {
        let response: AnnotateResponse = serde_json::from_value(json!({ "responses": [{}] })).unwrap();
        assert_eq!(joy_from(response).unwrap(), Joy::Unknown);
    }

    #[test]
    fn per_image_error_fails_face_detection() {
        let response: AnnotateResponse = serde_json::from_value(json!({
            "responses": [{ "error": { "message": "Bad image data." } }]
        }))
        .unwrap();
        assert!(matches!(joy_from(response), Err(LabelError::Annotation(_))));
    }

    async fn fake_vision(
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if query.get("key").map(String::as_str) != Some("test-key") {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": { "message": "bad key" } })),
            );
        }
        let feature = &body["requests"][0]["features"][0];
        if feature["type"] == "FACE_DETECTION" {
            let faces = json!([
                { "joyLikelihood": "VERY_LIKELY" },
                { "joyLikelihood": "UNLIKELY" }
            ]);
            return (
                StatusCode::OK,
                Json(json!({ "responses": [{ "faceAnnotations": faces }] })),
            );
        }
        let max = feature["maxResults"].as_u64().unwrap_or(0);
        let labels: Vec<Value> = ["Cat", "Outdoor", "Grass"]
            .iter()
            .take(max as usize)
            .map(|d| json!({ "description": d }))
            .collect();
        (
            StatusCode::OK,
            Json(json!({ "responses": [{ "labelAnnotations": labels }] })),
        )
    }

    async fn spawn_fake_vision() -> String {
        let app = Router::new().route("/v1/annotate", post(fake_vision));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/annotate", addr)
    }

    fn config(endpoint: String, max_results: u32) -> LabelingConfig {
        LabelingConfig {
            endpoint,
            max_results,
            ..LabelingConfig::default()
        }
    }

    #[tokio::test]
    async fn detect_labels_against_service() {
        let endpoint = spawn_fake_vision().await;
        let labeler = VisionLabeler::new(&config(endpoint, 2), "test-key".into()).unwrap();

        let labels = labeler
            .detect_labels(image("file:///data/cat.png", b"png"))
            .await
            .unwrap();
        assert_eq!(labels, vec!["Cat", "Outdoor"]);
    }

    #[tokio::test]
    async fn detect_joy_against_service() {
        let endpoint = spawn_fake_vision().await;
        let labeler = VisionLabeler::new(&config(endpoint, 10), "test-key".into()).unwrap();

        let joy = labeler
            .detect_joy(image("file:///data/face.jpg", b"jpg"))
            .await
            .unwrap();
        assert_eq!(joy, Joy::VeryLikely);
    }

    #[tokio::test]
    async fn rejected_key_is_an_api_error() {
        let endpoint = spawn_fake_vision().await;
        let labeler = VisionLabeler::new(&config(endpoint, 2), "wrong".into()).unwrap();

        let result = labeler
            .detect_labels(image("file:///data/cat.png", b"png"))
            .await;
        assert!(matches!(result, Err(LabelError::Api { status: 403, .. })));
    }
}
