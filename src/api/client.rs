//! JSON-over-HTTP client for the school backend

use reqwest::{Client, Method, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{api::errors::ApiError, config::Config};

/// Shared HTTP client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client from the application configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http_timeout())
            .build()?;

        Self::with_client(http, &config.api_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// Join percent-encoded path segments onto the base URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);

        let response = self.http.get(url.clone()).send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            path: url.path().to_string(),
            source,
        })
    }

    /// POST a JSON body, ignoring the response body
    pub async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<(), ApiError> {
        self.send(Method::POST, segments, Some(body)).await
    }

    /// PUT a JSON body, ignoring the response body
    pub async fn put<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<(), ApiError> {
        self.send(Method::PUT, segments, Some(body)).await
    }

    /// DELETE a resource; both `200` with a body and `204` are success
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, segments, None).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the server's `detail`
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status_code: status.as_u16(),
        detail: extract_detail(&body),
    })
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Null => None,
        // Validation errors arrive as a list of objects
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{delete, get},
        Json, Router,
    };

    /// Serve `router` on an ephemeral port and return its base URL
    pub(crate) async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::with_client(Client::new(), base_url).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://127.0.0.1:8000/");
        let url = client.endpoint(&["matriculas", "aluno", "Ana Maria"]);
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/matriculas/aluno/Ana%20Maria");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::with_client(Client::new(), "mailto:admin@example.com").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(extract_detail(r#"{"detail": "Curso não encontrado"}"#).as_deref(), Some("Curso não encontrado"));
        assert_eq!(extract_detail("<html>oops</html>"), None);
        assert!(extract_detail(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#)
            .unwrap()
            .contains("field required"));
    }

    #[tokio::test]
    async fn test_get_json_and_error_detail() {
        let router = Router::new()
            .route("/alunos", get(|| async { Json(serde_json::json!([{"id": 1, "nome": "Ana", "email": "a@x"}])) }))
            .route(
                "/cursos/:codigo",
                get(|Path(codigo): Path<String>| async move {
                    (
                        StatusCode::NOT_FOUND,
                        Json(serde_json::json!({"detail": format!("Nenhum curso encontrado com o código {}", codigo)})),
                    )
                }),
            );
        let base_url = spawn_backend(router).await;
        let client = client(&base_url);

        let students: Vec<crate::models::Student> = client.get_json(&["alunos"]).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Ana");

        let err = client
            .get_json::<crate::models::Course>(&["cursos", "XYZ"])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status_code: 404, .. }));
        assert_eq!(err.user_message("fallback"), "Nenhum curso encontrado com o código XYZ");
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let router = Router::new().route("/matriculas/:id", delete(|| async { StatusCode::NO_CONTENT }));
        let base_url = spawn_backend(router).await;

        client(&base_url).delete(&["matriculas", "3"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_decode_error_names_path() {
        let router = Router::new().route("/cursos", get(|| async { "not json" }));
        let base_url = spawn_backend(router).await;

        let err = client(&base_url)
            .get_json::<Vec<crate::models::Course>>(&["cursos"])
            .await
            .unwrap_err();
        match err {
            ApiError::Decode { path, .. } => assert_eq!(path, "/cursos"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
