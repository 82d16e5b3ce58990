use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use exif::{Context, Exif, Field, In, Reader};
use log::debug;
use serde_yaml::{Mapping, Value};

use crate::dispatch::Extractor;
use crate::error::SidecarError;
use crate::library::Metadata;

/// Containers that never carry an EXIF block.
const NO_EXIF_SIGNATURES: &[&[u8]] = &[b"GIF87a", b"GIF89a", b"BM"];

const GPS_KEY: &str = "GPSInfo";
const INTEROP_KEY: &str = "InteropInfo";

/// Reads the EXIF block of JPEG, PNG, TIFF, WebP and HEIF/HEIC images.
pub struct ImageExtractor;

impl Extractor for ImageExtractor {
    fn extract(&self, path: &Path) -> Result<Option<Metadata>, SidecarError> {
        let mut reader = BufReader::new(File::open(path)?);

        let head = reader.fill_buf()?;
        if NO_EXIF_SIGNATURES.iter().any(|sig| head.starts_with(sig)) {
            debug!("No EXIF container: {}", path.display());
            return Ok(None);
        }

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let metadata = exif_to_metadata(&exif);
        if metadata.is_empty() {
            return Ok(None);
        }
        Ok(Some(metadata))
    }
}

/// Flattens the primary image's fields into a mapping keyed by tag name.
/// GPS and interoperability tags are nested under their own keys; the
/// thumbnail IFD is skipped.
pub fn exif_to_metadata(exif: &Exif) -> Metadata {
    let mut metadata = Mapping::new();
    let mut gps = Mapping::new();
    let mut interop = Mapping::new();

    for field in exif.fields().filter(|field| field.ifd_num == In::PRIMARY) {
        let key = Value::String(field.tag.to_string());
        let value = field_value(field);
        match field.tag.context() {
            Context::Gps => gps.insert(key, value),
            Context::Interop => interop.insert(key, value),
            _ => metadata.insert(key, value),
        };
    }

    if !gps.is_empty() {
        metadata.insert(GPS_KEY.into(), Value::Mapping(gps));
    }
    if !interop.is_empty() {
        metadata.insert(INTEROP_KEY.into(), Value::Mapping(interop));
    }
    metadata
}

fn field_value(field: &Field) -> Value {
    match &field.value {
        exif::Value::Ascii(lines) => collapse(lines.iter().map(|line| {
            Value::String(String::from_utf8_lossy(line).trim_end_matches('\0').to_string())
        })),
        exif::Value::Byte(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::Short(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::Long(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::SByte(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::SShort(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::SLong(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::Rational(v) => {
            collapse(v.iter().map(|r| Value::String(format!("{}/{}", r.num, r.denom))))
        }
        exif::Value::SRational(v) => {
            collapse(v.iter().map(|r| Value::String(format!("{}/{}", r.num, r.denom))))
        }
        exif::Value::Float(v) => collapse(v.iter().map(|n| Value::from(*n))),
        exif::Value::Double(v) => collapse(v.iter().map(|n| Value::from(*n))),
        _ => Value::String(field.display_value().to_string()),
    }
}

fn collapse(values: impl Iterator<Item = Value>) -> Value {
    let mut values: Vec<Value> = values.collect();
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Sequence(values)
    }
}
