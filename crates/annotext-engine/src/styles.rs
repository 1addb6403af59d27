//! Applying named style presets to annotation overlays.

use annotext_config::{DEFAULT_STYLE, StyleSet};

use crate::models::Annotation;
use crate::render::{Overlay, OverlayStyle};

pub trait StyleResolver {
    /// Styles `overlay` with the preset named `type_name`.
    ///
    /// Returns `true` when the built-in default was applied instead, either
    /// because it was asked for or because no such preset exists.
    fn apply_style(&self, annotation: &Annotation, overlay: &mut Overlay, type_name: &str) -> bool;
}

impl StyleResolver for StyleSet {
    fn apply_style(&self, annotation: &Annotation, overlay: &mut Overlay, type_name: &str) -> bool {
        let (preset, used_default) = self.resolve(type_name);
        if used_default {
            if type_name != DEFAULT_STYLE {
                log::debug!(
                    "No style named {type_name:?} for annotation {}, using the default",
                    annotation.id
                );
            }
            overlay.style = OverlayStyle::from_preset(DEFAULT_STYLE, preset);
        } else {
            overlay.style = OverlayStyle::from_preset(type_name, preset);
        }
        used_default
    }
}
