/// Curation-pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("cluster {id} is not eligible for merge: {reason}")]
    NotMergeable { id: i64, reason: String },
}
