//! ACM Register Extraction Pipeline
//!
//! Converts School Asbestos Management Plan text into structured
//! Asbestos Containing Material (ACM) register records using an LLM.
//!
//! # Overview
//!
//! Management plans bury their register tables inside long, messy
//! documents. The pipeline splits a document into chunks, extracts
//! register rows from each chunk with an LLM, carries building/room
//! header context across chunk boundaries, and merges duplicate rows
//! by confidence before validating the final records.
//!
//! # Architecture
//!
//! ```text
//! Text → Chunker → ChunkExtractor → LLM
//!                        │
//!             ContextTracker (building/room headers)
//!                        │
//!                 Merge + Validate → AcmRecords
//! ```
//!
//! # Key Features
//!
//! - **Lossless Chunking**: Chunks split at page and paragraph
//!   boundaries and concatenate back to the original text
//! - **Context Carrying**: Rows inherit the building/room headers last
//!   seen, even across chunk and failure boundaries
//! - **Retry and Repair**: Transient provider failures back off and
//!   retry; malformed model output gets one repair attempt
//! - **Confidence-Weighted Merge**: Duplicate rows collapse to the
//!   highest-confidence description
//!
//! # Example Usage
//!
//! ```no_run
//! use acmreg_pipeline::{Pipeline, PipelineConfig};
//! use acmreg_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(r#"{"status": "ok", "records": []}"#);
//! let pipeline = Pipeline::new(provider, PipelineConfig::default())?;
//!
//! let output = pipeline.run("# Example Primary School\n...", "doc_001").await?;
//!
//! println!("Status: {:?}", output.status);
//! println!("Records: {}", output.records.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunker;
mod config;
mod context;
mod error;
mod invoker;
mod merge;
mod parser;
mod pipeline;
mod prompt;
mod types;


pub use chunker::Chunker;
pub use config::{HeaderPatterns, PipelineConfig};
pub use context::ContextTracker;
pub use error::{ChunkError, PipelineError};
pub use pipeline::Pipeline;
pub use types::{
    ConfidenceCounts, ExtractionOutput, ExtractionStats, ExtractionStatus, RiskCounts,
};
