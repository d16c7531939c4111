use async_trait::async_trait;

/// Embedding gateway. Implementations talk to the external embedding
/// service and return `None` on any failure (timeout, connect error,
/// malformed response) so callers can proceed without a vector. There is
/// no retry at this layer.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a document under the document deadline.
    async fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// Embed a search query under the (slightly longer) query deadline.
    async fn embed_query(&self, text: &str) -> Option<Vec<f32>>;

    /// The fixed dimensionality of returned vectors.
    fn dimensions(&self) -> usize;
}

/// Embedding input construction: non-general domains are prefixed so the
/// embedding space separates them.
pub fn build_embedding_input(body: &str, domain: &str) -> String {
    if domain != "general" {
        format!("[{domain}] {body}")
    } else {
        body.to_string()
    }
}
