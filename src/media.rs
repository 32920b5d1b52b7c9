use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;

use crate::constants::ACCEPTED_IMAGE_EXTENSIONS;
use crate::error::ApiError;

/// Splits a `data:image/<ext>;base64,<payload>` URI into its extension and
/// payload. The extension must be on the accepted list.
pub fn parse_data_uri(data_uri: &str) -> Result<(&str, &str), ApiError> {
    let rest = data_uri
        .strip_prefix("data:image/")
        .ok_or_else(|| ApiError::Validation(String::from("image must be a base64 data URI")))?;
    let (extension, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| ApiError::Validation(String::from("image must be a base64 data URI")))?;

    if !ACCEPTED_IMAGE_EXTENSIONS.contains(&extension) {
        return Err(ApiError::Validation(format!(
            "unsupported image format {extension}"
        )));
    }

    Ok((extension, payload))
}

/// Decodes the data URI and writes it under the media root. Returns the
/// stored path relative to the media root.
pub async fn store_recipe_image(media_root: &Path, data_uri: &str) -> Result<String, ApiError> {
    let (extension, payload) = parse_data_uri(data_uri)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| ApiError::Validation(String::from("image payload is not valid base64")))?;

    let relative = format!("recipes/images/{}.{}", Uuid::new_v4(), extension);
    let target = media_root.join(&relative);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to create media directory: {e}")))?;
    }
    tokio::fs::write(&target, bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to store image: {e}")))?;

    Ok(relative)
}

/// Public URL for a stored media path.
pub fn image_url(path: &str) -> String {
    format!("/media/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accepted_data_uri() {
        let (ext, payload) = parse_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(payload, "aGVsbG8=");
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(matches!(
            parse_data_uri("image/png;base64,aGVsbG8="),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(matches!(
            parse_data_uri("data:image/tiff;base64,aGVsbG8="),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_payload_marker() {
        assert!(matches!(
            parse_data_uri("data:image/png,aGVsbG8="),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn image_url_prefixes_media() {
        assert_eq!(image_url("recipes/images/a.png"), "/media/recipes/images/a.png");
    }
}
