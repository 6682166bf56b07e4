//! In-memory [`Storage`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{Delete, Insert};
use tokio::sync::Mutex;
use tracerr::Traced;
use uuid::Uuid;

use crate::{domain::property::ImageUrl, infra::Storage};

use super::{Error, Upload};

/// [`Storage`] keeping files in memory.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored files by their URLs.
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Memory {
    /// Checks whether a file is stored under the provided [`ImageUrl`].
    pub async fn contains(&self, url: &ImageUrl) -> bool {
        self.files.lock().await.contains_key(url.as_ref())
    }

    /// Returns the number of the stored files.
    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    /// Checks whether no files are stored.
    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }
}

impl Storage<Insert<Upload>> for Memory {
    type Ok = ImageUrl;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(upload): Insert<Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        let url = format!(
            "/uploads/{}.{}",
            Uuid::new_v4(),
            upload.format.extension(),
        );
        let url = ImageUrl::new(url.clone())
            .ok_or(Error::InvalidUrl(url))
            .map_err(tracerr::wrap!())?;
        drop(
            self.files
                .lock()
                .await
                .insert(url.as_ref().to_owned(), upload.bytes),
        );
        Ok(url)
    }
}

impl Storage<Delete<ImageUrl>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(url): Delete<ImageUrl>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.files.lock().await.remove(url.as_ref()));
        Ok(())
    }
}
