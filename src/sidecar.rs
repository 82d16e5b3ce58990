//! Sidecar documents.
//!
//! A sidecar sits next to the media file it describes, named after it with
//! `.metadata.md` appended, and holds the extracted metadata as YAML front
//! matter:
//!
//! ```text
//! ---
//! origin_metadata:
//!   Make: Acme
//! ---
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tempfile::Builder;

use crate::error::SidecarError;
use crate::library::Metadata;

pub const SIDECAR_SUFFIX: &str = ".metadata.md";
pub const METADATA_KEY: &str = "origin_metadata";
const DELIMITER: &str = "---";
/// Mode for new sidecars before the umask applies, as `fs::write` would use.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

pub fn render(metadata: &Metadata) -> Result<String, SidecarError> {
    let mut document = Mapping::new();
    document.insert(METADATA_KEY.into(), Value::Mapping(metadata.clone()));
    let body = serde_yaml::to_string(&document)?;
    Ok(format!("{DELIMITER}\n{body}{DELIMITER}\n"))
}

/// Writes the sidecar for `media_path`, replacing any previous one.
///
/// The document goes to a temporary file in the same directory first and
/// is renamed into place once synced, so a crash never leaves a truncated
/// sidecar behind. An existing sidecar keeps its permissions; a new one gets
/// the same mode a plainly created file would.
pub fn write_sidecar(media_path: &Path, metadata: &Metadata) -> Result<PathBuf, SidecarError> {
    let target = sidecar_path(media_path);
    let contents = render(metadata)?;

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(NEW_FILE_MODE));
    }
    let mut temp = builder.tempfile_in(parent)?;

    match fs::metadata(&target) {
        Ok(existing) if existing.is_file() => temp.as_file().set_permissions(existing.permissions())?,
        _ => {}
    }

    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    // Dropping the returned temp file deletes it right away.
    temp.persist(&target).map_err(|e| SidecarError::Persist {
        path: target.clone(),
        source: e.error,
    })?;

    Ok(target)
}

/// Parses a sidecar back into the metadata it was rendered from.
pub fn read_sidecar(path: &Path) -> Result<Metadata, SidecarError> {
    let contents = fs::read_to_string(path)?;
    let malformed = || SidecarError::MalformedSidecar(path.to_path_buf());

    // Only the first line and the last line are delimiters; a `---` line in
    // between belongs to a block scalar.
    let yaml = contents
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_prefix('\n'))
        .and_then(|rest| rest.strip_suffix('\n'))
        .and_then(|rest| rest.strip_suffix(DELIMITER))
        .ok_or_else(malformed)?;

    let document: Value = serde_yaml::from_str(yaml)?;
    match document.get(METADATA_KEY) {
        Some(Value::Mapping(metadata)) => Ok(metadata.clone()),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("artist".into(), "X".into());
        metadata.insert("album".into(), Value::Null);
        metadata.insert("title".into(), "Y".into());
        metadata
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("/photos/photo.jpg")),
            PathBuf::from("/photos/photo.jpg.metadata.md")
        );
        assert_eq!(sidecar_path(Path::new("song.mp3")), PathBuf::from("song.mp3.metadata.md"));
    }

    #[test]
    fn test_render() {
        let mut metadata = Metadata::new();
        metadata.insert("Make".into(), "Acme".into());
        assert_eq!(render(&metadata).unwrap(), "---\norigin_metadata:\n  Make: Acme\n---\n");
    }

    #[test]
    fn test_render_nulls() {
        assert_eq!(
            render(&sample()).unwrap(),
            "---\norigin_metadata:\n  artist: X\n  album: null\n  title: Y\n---\n"
        );
    }

    #[test]
    fn test_write_overwrites_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join("song.mp3");
        let target = sidecar_path(&media);
        fs::write(&target, "stale").unwrap();

        let written = write_sidecar(&media, &sample()).unwrap();
        assert_eq!(written, target);
        assert_eq!(read_sidecar(&written).unwrap(), sample());

        // Only the sidecar remains; the temporary file was renamed away.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_delimiter_inside_block_scalar_reads_back() {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join("scan.jpg");
        let mut metadata = Metadata::new();
        metadata.insert("ImageDescription".into(), "front\n---\nback".into());
        metadata.insert("Make".into(), "Acme".into());

        let written = write_sidecar(&media, &metadata).unwrap();
        assert_eq!(read_sidecar(&written).unwrap(), metadata);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_sidecar_mode_matches_plain_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("plain.txt");
        fs::write(&plain, "x").unwrap();

        let written = write_sidecar(&dir.path().join("song.mp3"), &sample()).unwrap();
        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&written), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let media = dir.path().join("song.mp3");
        let target = sidecar_path(&media);
        fs::write(&target, "stale").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        write_sidecar(&media, &sample()).unwrap();
        assert_eq!(fs::metadata(&target).unwrap().permissions().mode() & 0o777, 0o640);
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join("a.wav");
        let blocker = sidecar_path(&media);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep.txt"), "x").unwrap();

        let result = write_sidecar(&media, &sample());
        assert!(matches!(result, Err(SidecarError::Persist { .. })));

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.wav.metadata.md".to_string()]);
    }

    #[test]
    fn test_read_without_delimiters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.md");
        fs::write(&path, "origin_metadata:\n  Make: Acme\n").unwrap();
        assert!(matches!(read_sidecar(&path), Err(SidecarError::MalformedSidecar(_))));
    }

    #[test]
    fn test_read_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "---\ntitle: Something else\n---\n").unwrap();
        assert!(matches!(read_sidecar(&path), Err(SidecarError::MalformedSidecar(_))));
    }
}
