//! Text Chunking Module
//!
//! 추출된 문서 텍스트를 고정 크기 윈도우로 분할합니다.
//! 윈도우는 문자 수 기준이며, 인접 청크 간 오버랩을 지원합니다.

// ============================================================================
// Chunk Configuration
// ============================================================================

/// 기본 청크 크기 (문자 수)
pub const DEFAULT_CHUNK_CHARACTERS: usize = 10_000;

/// 기본 오버랩 크기 (문자 수)
pub const DEFAULT_OVERLAP_CHARACTERS: usize = 1_000;

/// 청킹 설정
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 청크 크기 (문자 수)
    pub chunk_characters: usize,
    /// 오버랩 크기 (문자 수)
    pub overlap_characters: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_characters: DEFAULT_CHUNK_CHARACTERS,
            overlap_characters: DEFAULT_OVERLAP_CHARACTERS,
        }
    }
}

impl ChunkConfig {
    /// 윈도우 시작점 간격 (오버랩이 청크 크기 이상이면 1로 보정)
    pub fn step(&self) -> usize {
        self.chunk_characters
            .saturating_sub(self.overlap_characters)
            .max(1)
    }
}

// ============================================================================
// Chunker Trait
// ============================================================================

/// 텍스트 청킹 전략 트레이트
pub trait Chunker: Send + Sync {
    /// 텍스트를 청크로 분할
    fn chunk(&self, text: &str) -> Vec<String>;

    /// 청커 이름
    fn name(&self) -> &'static str;
}

// ============================================================================
// FixedSizeChunker
// ============================================================================

/// 고정 크기 청커
///
/// 텍스트를 `chunk_characters` 문자 윈도우로 분할합니다.
/// 윈도우 시작점은 `chunk_characters - overlap_characters` 간격으로 이동하며,
/// 모든 경계는 UTF-8 문자 경계에 맞춰집니다.
pub struct FixedSizeChunker {
    config: ChunkConfig,
}

impl FixedSizeChunker {
    /// 설정으로 생성
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// 기본 설정으로 생성 (10,000자 / 오버랩 1,000자)
    pub fn with_defaults() -> Self {
        Self::new(ChunkConfig::default())
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        // 문자 단위 바이트 오프셋 테이블
        let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let char_count = offsets.len();

        // 한 윈도우에 전부 들어가면 그대로 반환
        if char_count <= self.config.chunk_characters {
            return vec![text.to_string()];
        }

        let step = self.config.step();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < char_count {
            let end = (start + self.config.chunk_characters).min(char_count);

            let byte_start = offsets[start];
            let byte_end = if end == char_count {
                text.len()
            } else {
                offsets[end]
            };

            chunks.push(text[byte_start..byte_end].to_string());

            if end == char_count {
                break;
            }

            start += step;
        }

        chunks
    }

    fn name(&self) -> &'static str {
        "FixedSizeChunker"
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// 기본 청커 생성
pub fn default_chunker() -> Box<dyn Chunker> {
    Box::new(FixedSizeChunker::with_defaults())
}

/// 고정 크기 청커 생성 (설정 지정)
pub fn fixed_chunker(config: ChunkConfig) -> Box<dyn Chunker> {
    Box::new(FixedSizeChunker::new(config))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> FixedSizeChunker {
        FixedSizeChunker::new(ChunkConfig {
            chunk_characters: size,
            overlap_characters: overlap,
        })
    }

    #[test]
    fn test_chunk_empty() {
        let chunks = FixedSizeChunker::with_defaults().chunk("");
        assert!(chunks.is_empty());

        let chunks = FixedSizeChunker::with_defaults().chunk("   \n\t  ");
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_small_text() {
        let chunks = FixedSizeChunker::with_defaults().chunk("짧은 텍스트입니다.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "짧은 텍스트입니다.");
    }

    #[test]
    fn test_chunk_boundaries_match_config() {
        // 크기 10, 오버랩 3 -> 시작점 간격 7
        let text: String = ('a'..='z').cycle().take(30).collect();
        let chunks = chunker(10, 3).chunk(&text);

        let text_chars: Vec<char> = text.chars().collect();
        for (i, chunk) in chunks.iter().enumerate() {
            let start = i * 7;
            let expected: String = text_chars[start..(start + 10).min(30)].iter().collect();
            assert_eq!(chunk, &expected);
        }

        // 마지막 청크가 텍스트 끝을 포함
        assert!(text.ends_with(chunks.last().map(String::as_str).unwrap_or("")));
    }

    #[test]
    fn test_chunk_overlap_content() {
        let text: String = (0..25).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunker(10, 4).chunk(&text);

        // 각 청크의 앞 4자는 이전 청크의 뒤 4자와 동일
        for pair in chunks.windows(2) {
            let prev_tail: String = pair[0].chars().rev().take(4).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let next_head: String = pair[1].chars().take(4).collect();
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn test_chunk_no_overlap() {
        let text: String = "ab".repeat(10);
        let chunks = chunker(5, 0).chunk(&text);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_chunk_multibyte_boundaries() {
        // 모든 경계가 문자 경계여야 함 (슬라이스가 panic하지 않음)
        let text = "가나다라마바사아자차카타파하".repeat(10);
        let chunks = chunker(13, 5).chunk(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 13);
        }
    }

    #[test]
    fn test_step_guard_against_large_overlap() {
        // 오버랩 >= 청크 크기여도 전진은 보장
        let config = ChunkConfig {
            chunk_characters: 5,
            overlap_characters: 10,
        };
        assert_eq!(config.step(), 1);

        let chunks = FixedSizeChunker::new(config).chunk(&"x".repeat(8));
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_default_constants() {
        let config = ChunkConfig::default();
        assert_eq!(config.chunk_characters, 10_000);
        assert_eq!(config.overlap_characters, 1_000);
        assert_eq!(config.step(), 9_000);
    }
}
