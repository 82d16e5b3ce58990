use std::path::Path;

use crate::audio::AudioExtractor;
use crate::error::SidecarError;
use crate::image::ImageExtractor;
use crate::library::{MediaFile, MediaKind, Metadata, AUDIO_EXTENSIONS, IMAGE_EXTENSIONS};

/// Reads embedded metadata out of one kind of media file.
///
/// `Ok(None)` means the file was readable but carries no metadata.
pub trait Extractor {
    fn extract(&self, path: &Path) -> Result<Option<Metadata>, SidecarError>;
}

struct Route {
    kind: MediaKind,
    extensions: Vec<String>,
    extractor: Box<dyn Extractor>,
}

/// Maps file extensions to extractors. Routes are matched in registration
/// order, so an extension claimed twice belongs to the first route.
pub struct Dispatcher {
    routes: Vec<Route>,
}

impl Dispatcher {
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register<E>(&mut self, kind: MediaKind, extensions: &[&str], extractor: E) -> &mut Self
    where
        E: Extractor + 'static,
    {
        self.routes.push(Route {
            kind,
            extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
            extractor: Box::new(extractor),
        });
        self
    }

    pub fn route(&self, file: &MediaFile) -> Option<(MediaKind, &dyn Extractor)> {
        if file.extension.is_empty() {
            return None;
        }
        self.routes
            .iter()
            .find(|route| route.extensions.iter().any(|ext| *ext == file.extension))
            .map(|route| (route.kind, route.extractor.as_ref()))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher
            .register(MediaKind::Image, IMAGE_EXTENSIONS, ImageExtractor)
            .register(MediaKind::Audio, AUDIO_EXTENSIONS, AudioExtractor);
        dispatcher
    }
}
