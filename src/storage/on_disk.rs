use std::path::{Component, Path, PathBuf};
use tokio::fs::create_dir_all;
use tokio::io::AsyncWriteExt;

pub(crate) struct OnDiskStorage {
    path: String,
}

impl OnDiskStorage {
    pub(crate) fn create(path: String) -> Self {
        Self { path }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, std::io::Error> {
        let key = Path::new(key);

        if !key
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Object key is not a relative path: {}", key.display()),
            ));
        }

        Ok(Path::new(&self.path).join(key))
    }

    #[cfg(test)]
    pub(crate) async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        let path = self.object_path(key)?;

        match tokio::fs::read(path).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if matches!(error.kind(), std::io::ErrorKind::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub(crate) async fn save(&self, key: &str, value: &[u8]) -> Result<(), std::io::Error> {
        let path = self.object_path(key)?;

        if let Some(parent) = path.parent() {
            create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        file.write_all(value).await?;
        file.flush().await?;

        Ok(())
    }
}
