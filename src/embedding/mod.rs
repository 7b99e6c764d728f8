//! 임베딩 모듈 - Gemini API를 통한 텍스트 벡터화
//!
//! 청크와 질문을 벡터로 변환하는 Gemini 임베딩 프로바이더입니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let embedder = GeminiEmbedding::new(api_key)?;
//! let embedding = embedder.embed_query("질문 텍스트").await?;
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// EmbeddingProvider Trait
// ============================================================================

/// 임베딩 프로바이더 트레이트
///
/// 텍스트를 벡터로 변환하는 인터페이스입니다.
/// 문서(청크)와 검색 질의는 서로 다른 태스크 타입으로 임베딩됩니다.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// 문서 청크 임베딩 (인덱싱 용도)
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// 검색 질의 임베딩
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// 임베딩 차원 수
    fn dimension(&self) -> usize;

    /// 프로바이더 이름
    fn name(&self) -> &str;
}

// ============================================================================
// Google Gemini Embedding
// ============================================================================

/// Gemini 임베딩 API 엔드포인트 (embedding-001)
/// source: https://ai.google.dev/gemini-api/docs/embeddings
const GEMINI_EMBED_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/embedding-001:embedContent";

/// 임베딩 모델 이름
pub const EMBEDDING_MODEL: &str = "models/embedding-001";

/// 임베딩 차원 (embedding-001 고정값)
pub const EMBEDDING_DIMENSION: usize = 768;

/// Google Gemini 임베딩 구현체
#[derive(Debug)]
pub struct GeminiEmbedding {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiEmbedding {
    /// 새 Gemini 임베딩 인스턴스 생성
    ///
    /// # Arguments
    /// * `api_key` - 세션에서 제공된 Google AI API 키
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("API key is empty");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }

    /// 태스크 타입을 지정하여 임베딩
    async fn embed_with_task(&self, text: &str, task_type: &str) -> Result<Vec<f32>> {
        // 빈 텍스트 처리
        if text.trim().is_empty() {
            return Ok(vec![0.0; EMBEDDING_DIMENSION]);
        }

        let request = EmbedRequest {
            model: EMBEDDING_MODEL.to_string(),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
            task_type: task_type.to_string(),
        };

        // API 호출 (API 키는 URL이 아닌 헤더로 전송)
        let response = self
            .client
            .post(GEMINI_EMBED_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send embedding request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<GeminiError>(&body) {
                anyhow::bail!(
                    "Gemini API error ({}): {}",
                    error.error.status,
                    error.error.message
                );
            }
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let embed_response: EmbedResponse =
            serde_json::from_str(&body).context("Failed to parse embedding response")?;

        Ok(embed_response.embedding.values)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedding {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, "RETRIEVAL_DOCUMENT").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, "RETRIEVAL_QUERY").await
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn name(&self) -> &str {
        "embedding-001"
    }
}

// ============================================================================
// API Types
// ============================================================================

/// Gemini API 요청 본문
/// source: https://ai.google.dev/gemini-api/docs/embeddings
#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
    #[serde(rename = "taskType")]
    task_type: String,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

/// Gemini API 응답
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini API 에러 응답
#[derive(Debug, Deserialize)]
pub(crate) struct GeminiError {
    pub(crate) error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorDetail {
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) status: String,
}

// ============================================================================
// API Key Management
// ============================================================================

/// API 키 해석 (플래그 > 환경변수)
///
/// 우선순위:
/// 1. `--api-key` 플래그 값
/// 2. `GEMINI_API_KEY` 환경변수
/// 3. `GOOGLE_API_KEY` 환경변수
pub fn resolve_api_key(flag: Option<String>) -> Result<String> {
    if let Some(key) = flag {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    if let Some(key) = api_key_from_env() {
        return Ok(key);
    }

    anyhow::bail!(
        "API key not found. Pass --api-key or set GEMINI_API_KEY / GOOGLE_API_KEY.\n\
         Get your API key at: https://aistudio.google.com/app/apikey"
    )
}

/// 환경변수에서 API 키 조회
pub fn api_key_from_env() -> Option<String> {
    for var in ["GEMINI_API_KEY", "GOOGLE_API_KEY"] {
        if let Ok(key) = std::env::var(var) {
            if !key.is_empty() {
                tracing::debug!("Using API key from {}", var);
                return Some(key);
            }
        }
    }
    None
}

/// API 키 존재 여부 확인 (환경변수 기준)
pub fn has_api_key() -> bool {
    api_key_from_env().is_some()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(GeminiEmbedding::new(String::new()).is_err());
        assert!(GeminiEmbedding::new("  ".to_string()).is_err());
        assert!(GeminiEmbedding::new("fake-key".to_string()).is_ok());
    }

    #[test]
    fn test_dimension() {
        let embedder = GeminiEmbedding::new("fake-key".to_string()).unwrap();
        assert_eq!(embedder.dimension(), 768);
        assert_eq!(embedder.name(), "embedding-001");
    }

    #[tokio::test]
    async fn test_embed_empty_text_returns_zero_vector() {
        let embedder = GeminiEmbedding::new("fake-key".to_string()).unwrap();

        // 빈 텍스트는 API 호출 없이 영벡터 반환
        let embedding = embedder.embed_document("   ").await.unwrap();
        assert_eq!(embedding.len(), EMBEDDING_DIMENSION);
        assert!(embedding.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_resolve_api_key_flag_precedence() {
        let key = resolve_api_key(Some("flag-key".to_string())).unwrap();
        assert_eq!(key, "flag-key");

        // 공백 플래그는 무시됨
        std::env::remove_var("GEMINI_API_KEY");
        std::env::remove_var("GOOGLE_API_KEY");
        assert!(resolve_api_key(Some("  ".to_string())).is_err());
    }

    #[test]
    fn test_embed_request_serialization() {
        let request = EmbedRequest {
            model: EMBEDDING_MODEL.to_string(),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: "hello".to_string(),
                }],
            },
            task_type: "RETRIEVAL_QUERY".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "models/embedding-001");
        assert_eq!(json["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(json["content"]["parts"][0]["text"], "hello");
    }
}
