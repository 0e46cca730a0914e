use crate::domain::background::BackgroundSource;
use crate::infrastructure::error::InfrastructureError;
use std::future::Future;

/// Fetches the raw bytes of a background image. One attempt, no retry.
pub trait ImageLoader {
    fn load<'a>(
        &'a self,
        source: &'a BackgroundSource,
    ) -> impl Future<Output = Result<Vec<u8>, InfrastructureError>> + Send + 'a;
}
