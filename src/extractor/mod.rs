//! 콘텐츠 추출 모듈
//!
//! PDF 파일을 수집하고 텍스트를 추출하여 하나의 문자열로 합칩니다.
//! 텍스트를 추출할 수 없는 문서는 빈 문자열로 처리되며,
//! 처리 실행 전체를 중단시키지 않습니다.

pub mod pdf;

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

// ============================================================================
// PDF Collection
// ============================================================================

/// PDF 파일 수집
///
/// 명시된 파일 목록과 (선택적으로) 폴더를 재귀 탐색하여
/// 처리 대상 PDF 경로 목록을 만듭니다.
pub fn collect_pdfs(files: &[PathBuf], dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();

    for file in files {
        if !file.exists() {
            anyhow::bail!("File not found: {:?}", file);
        }
        if !is_pdf(file) {
            anyhow::bail!("Not a PDF file: {:?}", file);
        }
        pdfs.push(file.clone());
    }

    if let Some(dir_path) = dir {
        if !dir_path.is_dir() {
            anyhow::bail!("Directory not found: {:?}", dir_path);
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(dir_path) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && is_pdf(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }

        // 결정적 순서 보장
        found.sort();
        tracing::info!("Collected {} PDF files from {:?}", found.len(), dir_path);
        pdfs.extend(found);
    }

    Ok(pdfs)
}

/// PDF 확장자 확인 (대소문자 무시)
fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

// ============================================================================
// Text Extraction
// ============================================================================

/// 여러 PDF에서 텍스트를 추출하여 하나의 문자열로 합치기
///
/// 추출에 실패한 문서는 경고 로그 후 빈 텍스트로 취급됩니다.
/// 문서별/페이지별 식별자는 유지하지 않습니다.
pub async fn extract_documents(paths: &[PathBuf]) -> Result<String> {
    let mut text = String::new();

    for path in paths {
        // PDF 추출은 CPU 바운드이므로 spawn_blocking 사용
        let task_path = path.clone();
        let extracted =
            tokio::task::spawn_blocking(move || pdf::extract_text_from_pdf(&task_path)).await;

        match extracted {
            Ok(Ok(doc_text)) => {
                if !text.is_empty() && !doc_text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&doc_text);
            }
            Ok(Err(e)) => {
                tracing::warn!("Skipping unreadable PDF {:?}: {}", path, e);
            }
            // pdf-extract는 일부 손상된 파일에서 panic할 수 있음
            Err(e) => {
                tracing::warn!("Skipping PDF {:?}: extraction task failed: {}", path, e);
            }
        }
    }

    Ok(text)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("doc.pdf")));
        assert!(is_pdf(Path::new("DOC.PDF")));
        assert!(!is_pdf(Path::new("doc.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn test_collect_pdfs_rejects_missing_file() {
        let result = collect_pdfs(&[PathBuf::from("/no/such/file.pdf")], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_collect_pdfs_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "text").unwrap();

        let result = collect_pdfs(&[path], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_collect_pdfs_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("skip.txt"), b"x").unwrap();

        let pdfs = collect_pdfs(&[], Some(dir.path())).unwrap();
        assert_eq!(pdfs.len(), 2);

        // 정렬된 순서
        let names: Vec<_> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_extract_documents_tolerates_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a real pdf").unwrap();

        // 읽을 수 없는 문서는 빈 텍스트로 처리, 에러 아님
        let text = extract_documents(&[path]).await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_extract_documents_empty_list() {
        let text = extract_documents(&[]).await.unwrap();
        assert!(text.is_empty());
    }
}
