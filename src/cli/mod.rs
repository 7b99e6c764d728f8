//! CLI 모듈
//!
//! docgenie CLI 명령어 정의 및 구현
//!
//! - process: PDF 추출 -> 청킹 -> 임베딩 -> 인덱스 저장
//! - ask: 단일 질문 답변
//! - chat: 대화형 세션 (API 키는 세션 시작 시 1회 입력)
//! - status: 시스템 상태 확인

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::chat::GeminiChat;
use crate::embedding::{
    has_api_key, resolve_api_key, EmbeddingProvider, GeminiEmbedding, EMBEDDING_MODEL,
};
use crate::extractor::{collect_pdfs, extract_documents};
use crate::knowledge::{
    default_chunker, default_index_path, get_data_dir, IndexEntry, IndexError, VectorIndex,
};

/// 검색 시 기본 청크 개수
const DEFAULT_TOP_K: usize = 4;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "docgenie")]
#[command(version, about = "PDF 문서 RAG 질의응답 CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// PDF 문서를 처리하여 벡터 인덱스 생성 (기존 인덱스 덮어쓰기)
    Process {
        /// 처리할 PDF 파일 (여러 번 지정 가능)
        #[arg(short, long)]
        pdf: Vec<PathBuf>,

        /// 처리할 폴더 경로 (재귀, PDF만 수집)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Google AI API 키 (미지정 시 환경변수 사용)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// 인덱싱된 문서에 대해 질문
    Ask {
        /// 질문
        question: String,

        /// 검색할 청크 개수
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// Google AI API 키 (미지정 시 환경변수 사용)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// 대화형 질의응답 세션
    Chat {
        /// Google AI API 키 (미지정 시 환경변수, 없으면 입력 요청)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process { pdf, dir, api_key } => cmd_process(pdf, dir, api_key).await,
        Commands::Ask {
            question,
            top_k,
            api_key,
        } => cmd_ask(&question, top_k, api_key).await,
        Commands::Chat { api_key } => cmd_chat(api_key).await,
        Commands::Status => cmd_status().await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 문서 처리 명령어 (process)
///
/// PDF에서 텍스트를 추출하고 청킹/임베딩하여 벡터 인덱스를 저장합니다.
async fn cmd_process(
    pdf: Vec<PathBuf>,
    dir: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<()> {
    let api_key = resolve_api_key(api_key)?;

    // 1. PDF 수집
    let pdfs = collect_pdfs(&pdf, dir.as_deref())?;
    if pdfs.is_empty() {
        bail!("PDF 파일을 하나 이상 지정해야 합니다 (--pdf 또는 --dir)");
    }

    println!("[*] {} 개 PDF에서 텍스트 추출 중...", pdfs.len());

    // 2. 텍스트 추출 (읽을 수 없는 문서는 빈 텍스트로 처리)
    let text = extract_documents(&pdfs).await?;
    if text.trim().is_empty() {
        println!("[!] 추출된 텍스트가 없습니다. 스캔본 PDF일 수 있습니다.");
    }

    // 3. 청킹
    let chunker = default_chunker();
    let chunks = chunker.chunk(&text);
    println!("[*] 청크 {} 개 생성", chunks.len());

    // 4. 임베딩 및 인덱스 저장
    let embedder = GeminiEmbedding::new(api_key)?;
    let mut index = VectorIndex::new(EMBEDDING_MODEL, embedder.dimension());

    let mut entries = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        print!("\r[*] 임베딩 생성 중... {}/{}", i + 1, chunks.len());
        std::io::stdout().flush().ok();

        let embedding = embedder
            .embed_document(chunk)
            .await
            .with_context(|| format!("청크 {} 임베딩 실패", i + 1))?;

        entries.push(IndexEntry {
            chunk_text: chunk.clone(),
            embedding,
        });
    }
    if !chunks.is_empty() {
        println!();
    }

    index.insert_batch(entries)?;
    index.save_default().context("인덱스 저장 실패")?;

    println!(
        "[OK] 처리 완료: 청크 {} 개 인덱싱됨 -> {}",
        index.len(),
        default_index_path().display()
    );
    println!("     이제 질문할 수 있습니다: docgenie ask \"질문\"");

    Ok(())
}

/// 질문 명령어 (ask)
async fn cmd_ask(question: &str, top_k: usize, api_key: Option<String>) -> Result<()> {
    let api_key = resolve_api_key(api_key)?;
    answer_question(question, &api_key, top_k).await
}

/// 질문 하나를 처리하여 답변 출력
///
/// 인덱스 로드 실패(미생성/손상)는 에러가 아닌 사용자 메시지로 표시합니다.
async fn answer_question(question: &str, api_key: &str, top_k: usize) -> Result<()> {
    // 1. 인덱스 로드
    let index = match VectorIndex::load_default() {
        Ok(index) => index,
        Err(e @ IndexError::NotBuilt) => {
            println!("[!] {}", e);
            return Ok(());
        }
        Err(e @ IndexError::Load(_)) => {
            println!("[!] {}", e);
            println!("    docgenie process로 인덱스를 다시 생성해주세요.");
            return Ok(());
        }
    };

    // 2. 질문 임베딩 및 검색
    let embedder = GeminiEmbedding::new(api_key.to_string())?;
    let query_embedding = embedder.embed_query(question).await.context("질문 임베딩 실패")?;

    let results = index.search(&query_embedding, top_k)?;

    tracing::debug!("Retrieved {} chunks for question", results.len());
    for result in &results {
        tracing::debug!(
            "  [{:.4}] {}",
            result.similarity,
            truncate_text(&result.chunk_text, 80)
        );
    }

    // 3. 답변 생성
    let chunks: Vec<String> = results.into_iter().map(|r| r.chunk_text).collect();

    let chat = GeminiChat::new(api_key.to_string())?;
    let answer = chat.answer(&chunks, question).await.context("답변 생성 실패")?;

    println!("\n답변: {}", answer.trim());

    Ok(())
}

/// 대화형 세션 명령어 (chat)
///
/// API 키는 세션 시작 시 한 번만 확인하며 메모리에만 유지됩니다.
async fn cmd_chat(api_key: Option<String>) -> Result<()> {
    // 키가 플래그/환경변수에 없으면 입력 요청
    let api_key = match resolve_api_key(api_key) {
        Ok(key) => key,
        Err(_) => {
            let key = prompt_line("Google AI API 키를 입력하세요: ")?;
            if key.trim().is_empty() {
                bail!("API 키가 입력되지 않았습니다");
            }
            key.trim().to_string()
        }
    };

    println!("[*] 대화형 세션 시작 (종료: exit / quit)");

    loop {
        let line = match prompt_line("\n질문> ") {
            Ok(line) => line,
            Err(_) => break, // EOF
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        if let Err(e) = answer_question(question, &api_key, DEFAULT_TOP_K).await {
            println!("[!] 오류: {:#}", e);
        }
    }

    println!("[*] 세션 종료");
    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status() -> Result<()> {
    println!("docgenie v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // 데이터 디렉토리
    let data_dir = get_data_dir();
    println!("[*] 데이터 디렉토리: {}", data_dir.display());

    // API 키 상태
    if has_api_key() {
        println!("[OK] API 키: 설정됨");
    } else {
        println!("[!] API 키: 미설정");
        println!("    설정: export GEMINI_API_KEY=your-key");
    }

    // 인덱스 상태
    match VectorIndex::load_default() {
        Ok(index) => {
            let stats = index.stats();
            println!("[OK] 벡터 인덱스: 청크 {} 개", stats.chunk_count);
            println!("     모델: {} ({}차원)", stats.model, stats.dimension);
            println!("     생성: {}", stats.created_at.format("%Y-%m-%d %H:%M"));
        }
        Err(IndexError::NotBuilt) => {
            println!("[!] 벡터 인덱스: 아직 생성되지 않음");
            println!("    생성: docgenie process --pdf 문서.pdf");
        }
        Err(e) => {
            println!("[!] 벡터 인덱스: {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 프롬프트 출력 후 한 줄 입력 받기 (EOF면 에러)
fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        bail!("EOF");
    }
    Ok(line)
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_truncate_unicode() {
        let korean = "안녕하세요 세계";
        let truncated = truncate_text(korean, 5);
        assert_eq!(truncated, "안녕하세요...");
    }

    #[test]
    fn test_cli_parses_process() {
        let cli = Cli::try_parse_from([
            "docgenie", "process", "--pdf", "a.pdf", "--pdf", "b.pdf",
        ])
        .unwrap();

        match cli.command {
            Commands::Process { pdf, dir, api_key } => {
                assert_eq!(pdf.len(), 2);
                assert!(dir.is_none());
                assert!(api_key.is_none());
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_cli_parses_ask_with_default_top_k() {
        let cli = Cli::try_parse_from(["docgenie", "ask", "질문입니다"]).unwrap();

        match cli.command {
            Commands::Ask {
                question, top_k, ..
            } => {
                assert_eq!(question, "질문입니다");
                assert_eq!(top_k, DEFAULT_TOP_K);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["docgenie"]).is_err());
    }
}
