//! Knowledge 모듈 - 청킹 및 벡터 인덱스
//!
//! - Chunker: 고정 크기 텍스트 분할 (10,000자 / 오버랩 1,000자)
//! - VectorIndex: 파일 기반 벡터 인덱스 (코사인 유사도 검색)

mod chunker;
mod index;

// Re-exports
pub use chunker::{
    ChunkConfig, Chunker, FixedSizeChunker, default_chunker, fixed_chunker,
    DEFAULT_CHUNK_CHARACTERS, DEFAULT_OVERLAP_CHARACTERS,
};
pub use index::{
    IndexEntry, IndexError, IndexStats, ScoredChunk, VectorIndex, cosine_similarity,
    default_index_path, get_data_dir, FORMAT_VERSION, INDEX_FILE_NAME,
};
