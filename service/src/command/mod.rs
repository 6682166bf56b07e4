//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod delete_property;
pub mod save_property;
pub mod unsave_property;
pub mod update_property;
pub mod update_property_status;

use common::operations::{Delete, Insert};
use tracerr::Traced;

use crate::{
    domain::property::{Caption, Image, ImageUrl},
    infra::{
        storage::{self, Upload},
        Storage,
    },
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_property::DeleteProperty,
    save_property::SaveProperty, unsave_property::UnsaveProperty,
    update_property::UpdateProperty,
    update_property_status::UpdatePropertyStatus,
};

/// Checks the provided [`Upload`]s against the size limit, returning the
/// size of the first one exceeding it.
fn oversized(uploads: &[Upload], max_size: usize) -> Option<usize> {
    uploads
        .iter()
        .map(|u| u.bytes.len())
        .find(|size| *size > max_size)
}

/// Puts the provided [`Upload`]s into the [`Storage`], captioning them with
/// their original file names.
///
/// Already stored [`Upload`]s are removed if any of them fails.
async fn store_images<St>(
    storage: &St,
    uploads: Vec<Upload>,
) -> Result<Vec<Image>, Traced<storage::Error>>
where
    St: Storage<Insert<Upload>, Ok = ImageUrl, Err = Traced<storage::Error>>
        + Storage<Delete<ImageUrl>, Ok = (), Err = Traced<storage::Error>>,
{
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let caption = upload.file_name.clone().and_then(Caption::new);
        match storage.execute(Insert(upload)).await {
            Ok(url) => stored.push(Image { url, caption }),
            Err(e) => {
                remove_images(storage, stored).await;
                return Err(e).map_err(tracerr::wrap!());
            }
        }
    }
    Ok(stored)
}

/// Removes the provided [`Image`]s from the [`Storage`].
///
/// Failures are only logged, as the [`Image`]s are not referenced anymore.
async fn remove_images<St>(storage: &St, images: Vec<Image>)
where
    St: Storage<Delete<ImageUrl>, Ok = (), Err = Traced<storage::Error>>,
{
    for Image { url, .. } in images {
        if let Err(e) = storage.execute(Delete(url.clone())).await {
            tracing::warn!(%url, "failed to remove image: {e}");
        }
    }
}
