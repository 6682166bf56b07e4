//! [`Filesystem`] [`Storage`] implementation.

use std::{io, path::PathBuf};

use common::operations::{Delete, Insert};
use tokio::fs;
use tracerr::Traced;
use uuid::Uuid;

use crate::{domain::property::ImageUrl, infra::Storage};

use super::{Error, Upload};

/// [`Storage`] keeping files in a local directory.
#[derive(Clone, Debug)]
pub struct Filesystem {
    /// Directory to put files into.
    dir: PathBuf,

    /// Public URL prefix the files of the `dir` are served under.
    url_prefix: String,
}

impl Filesystem {
    /// Creates a new [`Filesystem`] [`Storage`] putting files into the
    /// provided `dir`, served under the provided `url_prefix`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into();
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Returns the name of the file in the `dir` the provided [`ImageUrl`]
    /// points to, if it's served from this [`Filesystem`].
    fn file_name<'u>(&self, url: &'u ImageUrl) -> Option<&'u str> {
        let (prefix, name) = url.as_ref().rsplit_once('/')?;
        (prefix == self.url_prefix
            && !name.is_empty()
            && name != ".."
            && !name.contains('\\'))
        .then_some(name)
    }
}

impl Storage<Insert<Upload>> for Filesystem {
    type Ok = ImageUrl;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(upload): Insert<Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = format!("{}.{}", Uuid::new_v4(), upload.format.extension());
        let url = format!("{}/{name}", self.url_prefix);
        let url = ImageUrl::new(url.clone())
            .ok_or(Error::InvalidUrl(url))
            .map_err(tracerr::wrap!())?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::write(self.dir.join(&name), &upload.bytes)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        tracing::debug!(
            %url,
            size = upload.bytes.len(),
            original = upload.file_name.as_deref().unwrap_or_default(),
            "image stored",
        );
        Ok(url)
    }
}

impl Storage<Delete<ImageUrl>> for Filesystem {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(url): Delete<ImageUrl>,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(name) = self.file_name(&url) else {
            tracing::debug!(%url, "image is not stored locally, skipping");
            return Ok(());
        };

        match fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                tracing::debug!(%url, "image removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(tracerr::new!(Error::Io(e))),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{Delete, Insert},
        Handler as _,
    };

    use crate::{domain::property::ImageFormat, infra::storage::Upload};

    use super::Filesystem;

    fn upload() -> Upload {
        Upload {
            file_name: Some("front.png".into()),
            format: ImageFormat::Png,
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn stores_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Filesystem::new(dir.path(), "/uploads/");

        let url = storage.execute(Insert(upload())).await.unwrap();
        assert!(url.as_ref().starts_with("/uploads/"));
        assert!(url.as_ref().ends_with(".png"));

        let path = dir.path().join(url.file_name());
        assert_eq!(std::fs::read(&path).unwrap(), upload().bytes);

        storage.execute(Delete(url.clone())).await.unwrap();
        assert!(!path.exists());

        // Removing a missing file is not an error.
        storage.execute(Delete(url)).await.unwrap();
    }

    #[tokio::test]
    async fn ignores_foreign_urls() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Filesystem::new(dir.path(), "/uploads");

        let foreign = crate::domain::property::ImageUrl::new(
            "https://cdn.example.com/a.jpg",
        )
        .unwrap();
        storage.execute(Delete(foreign)).await.unwrap();
    }
}
