use ambi_core::error::CoreError;
use ambi_db::repositories::TaxonTreeError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<TaxonTreeError> for PipelineError {
    fn from(err: TaxonTreeError) -> Self {
        match err {
            TaxonTreeError::Core(e) => PipelineError::Core(e),
            TaxonTreeError::Db(e) => PipelineError::Db(e),
        }
    }
}
