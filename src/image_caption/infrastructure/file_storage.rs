use super::error::InfrastructureError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Read-only access to the bundled assets directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `relative` under the root. Absolute-looking paths are treated
    /// as root-relative; `..` is rejected.
    fn resolve(&self, relative: &str) -> Result<PathBuf, InfrastructureError> {
        let mut resolved = self.root.clone();
        for component in Path::new(relative.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(InfrastructureError::FileStorageError(format!(
                        "path escapes the assets directory: {}",
                        relative
                    )))
                }
            }
        }
        Ok(resolved)
    }

    pub async fn read_image(&self, relative: &str) -> Result<Vec<u8>, InfrastructureError> {
        let path = self.resolve(relative)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(InfrastructureError::AssetNotFound(relative.to_string())),
            Err(e) => Err(InfrastructureError::IoError(e)),
        }
    }
}
