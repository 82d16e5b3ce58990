use std::borrow::Cow;
use std::path::Path;

use lofty::prelude::*;
use lofty::probe::Probe;
use serde_yaml::Value;

use crate::dispatch::Extractor;
use crate::error::SidecarError;
use crate::library::Metadata;

/// Pulls artist, album and title out of an audio file's tags. Every other
/// tag is discarded.
pub struct AudioExtractor;

impl Extractor for AudioExtractor {
    fn extract(&self, path: &Path) -> Result<Option<Metadata>, SidecarError> {
        let tagged_file = Probe::open(path)?.read()?;

        let tag = match tagged_file.primary_tag() {
            Some(primary_tag) => Some(primary_tag),
            None => tagged_file.first_tag(),
        };

        let mut metadata = Metadata::new();
        metadata.insert("artist".into(), text(tag.and_then(|t| t.artist())));
        metadata.insert("album".into(), text(tag.and_then(|t| t.album())));
        metadata.insert("title".into(), text(tag.and_then(|t| t.title())));
        Ok(Some(metadata))
    }
}

fn text(value: Option<Cow<'_, str>>) -> Value {
    match value {
        Some(value) => Value::String(value.into_owned()),
        None => Value::Null,
    }
}
