//! docgenie - PDF 문서 RAG 질의응답 시스템
//!
//! PDF에서 추출한 텍스트를 청킹/임베딩하여 로컬 벡터 인덱스에 저장하고,
//! Gemini API로 질문에 대한 답변을 생성합니다.

pub mod chat;
pub mod cli;
pub mod embedding;
pub mod extractor;
pub mod knowledge;

// Re-exports
pub use chat::{build_prompt, GeminiChat, CHAT_MODEL, PROMPT_TEMPLATE};
pub use embedding::{
    api_key_from_env, has_api_key, resolve_api_key, EmbeddingProvider, GeminiEmbedding,
    EMBEDDING_DIMENSION, EMBEDDING_MODEL,
};
pub use extractor::{collect_pdfs, extract_documents};
pub use knowledge::{
    cosine_similarity, default_chunker, default_index_path, get_data_dir, ChunkConfig, Chunker,
    FixedSizeChunker, IndexEntry, IndexError, IndexStats, ScoredChunk, VectorIndex,
};
