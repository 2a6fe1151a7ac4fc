use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::document::UploadedFile;
use crate::session::Session;

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub async fn handle_upload(file_path: &str, session: &mut Session) -> Result<(), String> {
    let file_path = file_path.trim();
    if file_path.is_empty() {
        println!("📚 Document Commands:");
        println!("  upload <file_path>   - Index a PDF for questions");
        return Ok(());
    }

    let path = Path::new(file_path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| format!("Not a file path: {}", file_path))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", file_path, e))?;

    println!("📄 Processing document: {}", name.bright_yellow());
    let pb = spinner("Processing document...");
    let result = session.upload(UploadedFile::new(name, bytes)).await;
    pb.finish_and_clear();

    let report = result.map_err(|e| format!("Failed to process document: {}", e))?;

    println!(
        "{}",
        format!(
            "✅ Document processed successfully! {} page(s), {} chunk(s) indexed ({} total). Ask your questions below.",
            report.document.pages, report.document.chunks, report.indexed_total
        )
        .bright_green()
    );
    Ok(())
}

pub async fn handle_question(question: &str, session: &mut Session) -> Result<(), String> {
    if !session.is_indexed() {
        println!("{}", "Upload a PDF first: upload <file_path>".yellow());
        return Ok(());
    }

    println!("👤 {}", question.bright_cyan());

    let pb = spinner("Analyzing document...");
    let result = session.ask(question).await;
    pb.finish_and_clear();

    let answer = result.map_err(|e| format!("Failed to get AI response: {}", e))?;

    println!("🤖 {}", answer.text.truecolor(255, 236, 179));
    if !answer.sources.is_empty() {
        println!("{}", "\nSources:".dimmed());
        for source in &answer.sources {
            println!(
                "{}",
                format!(
                    "  • page {} @ {} (score {:.2})",
                    source.chunk.metadata.page, source.chunk.start_index, source.score
                )
                .dimmed()
            );
        }
    }
    println!();
    Ok(())
}

pub fn show_status(session: &Session) -> Result<(), String> {
    let status = session.status();
    match &status.state {
        crate::session::SessionState::Idle => {
            println!("📭 No document indexed yet.");
        }
        crate::session::SessionState::Indexed { documents } => {
            println!("\n📄 Indexed documents:");
            for doc in documents {
                println!(
                    "  • {} - {} page(s), {} chunk(s), indexed {}",
                    doc.filename.bright_yellow(),
                    doc.pages,
                    doc.chunks,
                    doc.indexed_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }
    println!(
        "Chunks in index: {} | Questions answered: {}",
        status.chunks.to_string().cyan(),
        status.turns.to_string().cyan()
    );
    Ok(())
}
