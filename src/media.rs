use rand::distributions::Alphanumeric;
use rand::Rng;
use rocket::fs::TempFile;
use rocket::http::ContentType;
use rocket::tokio::fs;
use std::path::Path;

use crate::error::{Error, Result};

const UPLOAD_DIR: &str = "tickets";

fn extension_for(content_type: Option<&ContentType>) -> Option<&'static str> {
    let content_type = content_type?;
    [
        (ContentType::PNG, "png"),
        (ContentType::JPEG, "jpg"),
        (ContentType::GIF, "gif"),
        (ContentType::WEBP, "webp"),
    ]
    .into_iter()
    .find(|(known, _)| known == content_type)
    .map(|(_, ext)| ext)
}

/// Copies an uploaded ticket image under `root` and returns its path relative
/// to `root`. An empty upload means "no image".
pub async fn store_image(root: &Path, file: &mut TempFile<'_>) -> Result<Option<String>> {
    if file.len() == 0 {
        return Ok(None);
    }

    let ext = extension_for(file.content_type())
        .ok_or(Error::Invalid("Upload a PNG, JPEG, GIF or WebP image."))?;
    let name: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let relative = format!("{}/{}.{}", UPLOAD_DIR, name, ext);

    fs::create_dir_all(root.join(UPLOAD_DIR)).await?;
    file.copy_to(root.join(&relative)).await?;
    tracing::debug!(path = %relative, "stored ticket image");

    Ok(Some(relative))
}

/// Best effort: a leftover file is only logged.
pub async fn remove_image(root: &Path, relative: &str) {
    if let Err(err) = fs::remove_file(root.join(relative)).await {
        tracing::warn!(path = %relative, "failed to remove ticket image: {}", err);
    }
}

/// Passes `saved` through, removing the freshly stored `image` when saving
/// the row that points at it failed.
pub async fn remove_unless_saved<T>(
    root: &Path,
    image: Option<&str>,
    saved: Result<T>,
) -> Result<T> {
    if saved.is_err() {
        if let Some(relative) = image {
            remove_image(root, relative).await;
        }
    }
    saved
}
