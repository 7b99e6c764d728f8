//! 답변 생성 모듈 - Gemini 챗 API
//!
//! 검색된 청크(컨텍스트)와 질문을 고정 프롬프트 템플릿에 채워
//! gemini-pro 모델로 답변을 생성합니다.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::embedding::GeminiError;

/// Gemini 챗 API 엔드포인트
const GEMINI_CHAT_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// 챗 모델 이름
pub const CHAT_MODEL: &str = "gemini-pro";

/// 답변 생성 온도
const TEMPERATURE: f32 = 0.3;

/// QA 프롬프트 템플릿
///
/// 컨텍스트에 답이 없으면 지어내지 않고 명시하도록 지시합니다.
pub const PROMPT_TEMPLATE: &str = r#"Answer the question as detailed as possible from the provided context. If the answer is not in
the provided context, say, "answer is not available in the context." Do not provide a wrong answer.

Context:
 {context}
Question:
 {question}

Answer:
"#;

/// 프롬프트 템플릿 채우기
///
/// 검색된 청크들을 빈 줄로 이어 컨텍스트로 사용합니다.
pub fn build_prompt(chunks: &[String], question: &str) -> String {
    let context = chunks.join("\n\n");
    PROMPT_TEMPLATE
        .replace("{context}", &context)
        .replace("{question}", question)
}

// ============================================================================
// GeminiChat
// ============================================================================

/// Gemini 챗 클라이언트
#[derive(Debug)]
pub struct GeminiChat {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiChat {
    /// 새 챗 클라이언트 생성
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("API key is empty");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }

    /// 컨텍스트 청크와 질문으로 답변 생성
    pub async fn answer(&self, chunks: &[String], question: &str) -> Result<String> {
        let prompt = build_prompt(chunks, question);

        let request = ChatRequest {
            contents: vec![ChatContent {
                parts: vec![ChatPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(GEMINI_CHAT_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send chat request")?;

        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;

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

        let chat_response: ChatResponse =
            serde_json::from_str(&body).context("Failed to parse chat response")?;

        let text = chat_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("No response generated");
        }

        Ok(text)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    contents: Vec<ChatContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ChatContent {
    parts: Vec<ChatPart>,
}

#[derive(Debug, Serialize)]
struct ChatPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    // 안전 필터에 걸린 응답은 content가 없을 수 있음
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    text: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_fills_template() {
        let chunks = vec!["첫 청크".to_string(), "둘째 청크".to_string()];
        let prompt = build_prompt(&chunks, "질문은?");

        assert!(prompt.contains("첫 청크\n\n둘째 청크"));
        assert!(prompt.contains("질문은?"));
        assert!(prompt.contains("answer is not available in the context"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn test_build_prompt_empty_context() {
        let prompt = build_prompt(&[], "question");
        assert!(prompt.contains("Context:\n \n"));
        assert!(prompt.contains("question"));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(GeminiChat::new(String::new()).is_err());
        assert!(GeminiChat::new("fake-key".to_string()).is_ok());
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "답변 텍스트" } ] } }
            ]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text);
        assert_eq!(text.as_deref(), Some("답변 텍스트"));
    }

    #[test]
    fn test_chat_response_no_candidates() {
        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
