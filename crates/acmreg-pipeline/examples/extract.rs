//! Run the extraction pipeline against a document on disk
//!
//! Usage: cargo run --example extract -- <file> [model]
//!
//! Expects an Ollama server on localhost with the named model pulled.

use acmreg_llm::OllamaProvider;
use acmreg_pipeline::{Pipeline, PipelineConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: extract <file> [model]")?;
    let model = args.next().unwrap_or_else(|| "llama3.1".to_string());

    let text = std::fs::read_to_string(&path)?;
    let provider = OllamaProvider::default_endpoint(model);
    let pipeline = Pipeline::new(provider, PipelineConfig::default())?;

    let output = pipeline.run(&text, &path).await?;

    println!("Status: {:?} ({} ms)", output.status, output.elapsed_ms);
    if let Some(message) = &output.error_message {
        println!("Problems: {}", message);
    }

    for record in &output.records {
        println!(
            "[{}] {} / {} | {} | {} | risk {}",
            record.confidence,
            record.building_id,
            record.room_id.as_deref().unwrap_or("-"),
            record.product,
            record.material_description,
            record.risk_status.as_deref().unwrap_or("unknown"),
        );
    }

    println!(
        "{} records from {} chunks, {} duplicates merged, {} dropped",
        output.records.len(),
        output.stats.chunk_count,
        output.stats.duplicates_merged,
        output.stats.validation_drops
    );

    Ok(())
}
