use anyhow::Context;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported document type {0:?}; upload .txt or .pdf")]
    Unsupported(String),
    #[error("document contains no extractable text")]
    Empty,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Extract plain text from an uploaded document, dispatching on the file
/// extension. PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_text(file_name: &str, bytes: Vec<u8>) -> Result<String, ExtractError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" => String::from_utf8_lossy(&bytes).into_owned(),
        "pdf" => {
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .context("pdf extraction task failed")?
                .context("failed to extract text from pdf")?
        }
        _ => return Err(ExtractError::Unsupported(extension)),
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}
