use std::io::{Read, Seek};

use image::GenericImageView;

use super::package::{Package, Relationships};

/// Geometry of an embedded picture after decoding its first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadedImage {
    pub part_name: String,
    pub width: u32,
    pub height: u32,
}

/// Looks up pictures referenced from the document by relationship id.
pub(crate) trait ImageSource {
    /// `None` when the picture cannot be found or decoded; the caller skips it.
    fn load(&mut self, relationship_id: &str) -> Option<LoadedImage>;
}

pub(crate) struct PackageImages<'a, R: Read + Seek> {
    pub package: &'a mut Package<R>,
    pub relationships: Relationships,
}

impl<R: Read + Seek> ImageSource for PackageImages<'_, R> {
    fn load(&mut self, relationship_id: &str) -> Option<LoadedImage> {
        let Some(rel) = self.relationships.get(relationship_id) else {
            log::warn!("Image relationship {relationship_id} not found, skipping image");
            return None;
        };
        if rel.external {
            log::warn!("Image {} is linked externally, skipping", rel.target);
            return None;
        }

        let is_image = self
            .package
            .content_type(&rel.target)
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"));
        if !is_image {
            log::warn!("Part {} is not an image, skipping", rel.target);
            return None;
        }

        let bytes = match self.package.read_part(&rel.target) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("Failed to read image {}: {err}", rel.target);
                return None;
            }
        };

        match image::load_from_memory(&bytes) {
            Ok(decoded) => {
                let (width, height) = decoded.dimensions();
                Some(LoadedImage {
                    part_name: rel.target.clone(),
                    width,
                    height,
                })
            }
            Err(err) => {
                log::warn!("Failed to decode image {}: {err}", rel.target);
                None
            }
        }
    }
}
