//! Vector Index - 파일 기반 벡터 인덱스
//!
//! 청크 텍스트와 임베딩을 단일 로컬 파일로 저장합니다.
//! 처리 실행마다 파일 전체를 덮어쓰며, 검색은 코사인 유사도
//! 선형 스캔으로 수행합니다.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (~/.docgenie/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".docgenie")
}

/// 기본 인덱스 파일 경로 (~/.docgenie/genie_index.json)
pub fn default_index_path() -> PathBuf {
    get_data_dir().join(INDEX_FILE_NAME)
}

/// 인덱스 파일 이름
pub const INDEX_FILE_NAME: &str = "genie_index.json";

/// 인덱스 파일 포맷 버전
pub const FORMAT_VERSION: u32 = 1;

// ============================================================================
// Errors
// ============================================================================

/// 인덱스 로드 에러
///
/// 질의 경로에서 사용자에게 그대로 표시되는 두 가지 에러입니다.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// 인덱스 파일이 존재하지 않음 (아직 처리된 문서 없음)
    #[error("벡터 인덱스가 없습니다. 먼저 PDF 문서를 처리해주세요 (docgenie process)")]
    NotBuilt,

    /// 인덱스 파일을 읽을 수 없음 (손상, 포맷 버전 불일치 등)
    #[error("벡터 인덱스를 불러올 수 없습니다: {0}")]
    Load(String),
}

// ============================================================================
// Types
// ============================================================================

/// 인덱스 엔트리 (청크 텍스트 + 임베딩)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// 청크 텍스트
    pub chunk_text: String,
    /// 임베딩 벡터
    pub embedding: Vec<f32>,
}

/// 검색 결과 (유사도 스코어 포함)
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// 청크 텍스트
    pub chunk_text: String,
    /// 코사인 유사도 (-1.0 ~ 1.0)
    pub similarity: f32,
}

/// 인덱스 통계
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub chunk_count: usize,
    pub dimension: usize,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// 직렬화 포맷 (파일에 기록되는 형태)
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    model: String,
    dimension: usize,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

// ============================================================================
// VectorIndex
// ============================================================================

/// 파일 기반 벡터 인덱스
///
/// 메모리에 전체 엔트리를 유지하며, `save`로 파일 전체를 덮어쓰고
/// `load`로 파일 전체를 읽어옵니다.
#[derive(Debug)]
pub struct VectorIndex {
    model: String,
    dimension: usize,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// 빈 인덱스 생성
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// 엔트리 배치 삽입
    ///
    /// 모든 임베딩의 차원이 인덱스 차원과 일치해야 합니다.
    pub fn insert_batch(&mut self, entries: Vec<IndexEntry>) -> Result<usize> {
        for entry in &entries {
            if entry.embedding.len() != self.dimension {
                anyhow::bail!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    entry.embedding.len()
                );
            }
        }

        let inserted = entries.len();
        self.entries.extend(entries);
        Ok(inserted)
    }

    /// 코사인 유사도 기준 상위 k개 청크 검색
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        if query_embedding.len() != self.dimension {
            anyhow::bail!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimension,
                query_embedding.len()
            );
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk_text: entry.chunk_text.clone(),
                similarity: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 임베딩 차원
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// 인덱스 통계
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            chunk_count: self.entries.len(),
            dimension: self.dimension,
            model: self.model.clone(),
            created_at: self.created_at,
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// 인덱스를 파일로 저장 (기존 파일 덮어쓰기)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = IndexFile {
            version: FORMAT_VERSION,
            model: self.model.clone(),
            dimension: self.dimension,
            created_at: self.created_at,
            entries: self.entries.clone(),
        };

        let json = serde_json::to_string(&file)?;
        std::fs::write(path, json)?;

        tracing::info!(
            "Saved vector index: {} entries -> {}",
            self.entries.len(),
            path.display()
        );

        Ok(())
    }

    /// 기본 경로에 저장
    pub fn save_default(&self) -> Result<()> {
        self.save(&default_index_path())
    }

    /// 파일에서 인덱스 로드
    ///
    /// # Errors
    /// - [`IndexError::NotBuilt`] - 파일이 존재하지 않음
    /// - [`IndexError::Load`] - 파싱 실패 또는 포맷 버전 불일치
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::NotBuilt);
        }

        let json = std::fs::read_to_string(path)
            .map_err(|e| IndexError::Load(format!("파일 읽기 실패: {}", e)))?;

        let file: IndexFile = serde_json::from_str(&json)
            .map_err(|e| IndexError::Load(format!("파싱 실패: {}", e)))?;

        if file.version != FORMAT_VERSION {
            return Err(IndexError::Load(format!(
                "포맷 버전 불일치: 파일 v{}, 지원 v{}",
                file.version, FORMAT_VERSION
            )));
        }

        // 엔트리 차원 검증
        if let Some(bad) = file
            .entries
            .iter()
            .find(|e| e.embedding.len() != file.dimension)
        {
            return Err(IndexError::Load(format!(
                "임베딩 차원 불일치: 선언 {}, 실제 {}",
                file.dimension,
                bad.embedding.len()
            )));
        }

        tracing::info!(
            "Loaded vector index: {} entries from {}",
            file.entries.len(),
            path.display()
        );

        Ok(Self {
            model: file.model,
            dimension: file.dimension,
            created_at: file.created_at,
            entries: file.entries,
        })
    }

    /// 기본 경로에서 로드
    pub fn load_default() -> Result<Self, IndexError> {
        Self::load(&default_index_path())
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// 코사인 유사도 계산
///
/// 두 벡터 간의 코사인 유사도를 계산합니다.
/// 결과는 -1.0 ~ 1.0 범위입니다.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

// ============================================================================
// Tests
// ============================================================================
