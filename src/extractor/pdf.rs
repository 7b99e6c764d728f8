//! PDF 텍스트 추출 모듈
//!
//! pdf-extract 크레이트를 사용하여 PDF에서 텍스트를 추출합니다.

use std::path::Path;

use anyhow::{Context, Result};

/// PDF에서 전체 텍스트 추출
///
/// 추출 가능한 텍스트가 없는 문서(스캔본 등)는 빈 문자열을 반환합니다.
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    // PDF 파일 열기
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;

    // 전체 텍스트 추출
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    // 텍스트가 비어있으면 경고
    if text.trim().is_empty() {
        tracing::warn!(
            "No text extracted from PDF: {:?}. It might be a scanned document.",
            path
        );
        return Ok(String::new());
    }

    Ok(normalize_text(&text))
}

/// 추출된 텍스트 정리
///
/// 폼피드(페이지 구분 문자)를 줄바꿈으로 바꾸고, 연속된 빈 줄을 정리합니다.
fn normalize_text(text: &str) -> String {
    let text = text.replace('\x0c', "\n");

    if let Ok(re) = regex::Regex::new(r"\n{3,}") {
        re.replace_all(&text, "\n\n").trim().to_string()
    } else {
        text.trim().to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_formfeed() {
        let text = "Page 1 content\x0cPage 2 content";
        assert_eq!(normalize_text(text), "Page 1 content\nPage 2 content");
    }

    #[test]
    fn test_normalize_text_collapses_blank_lines() {
        let text = "첫 문단\n\n\n\n\n둘째 문단";
        assert_eq!(normalize_text(text), "첫 문단\n\n둘째 문단");
    }

    #[test]
    fn test_normalize_text_trims() {
        assert_eq!(normalize_text("\n\n  hello  \n\n"), "hello");
    }

    #[test]
    fn test_extract_missing_file_errors() {
        // 호출자(extract_documents)가 이 에러를 빈 텍스트로 처리함
        assert!(extract_text_from_pdf(Path::new("/no/such/doc.pdf")).is_err());
    }
}
