use std::path::{Component, Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::error::MirrorError;

pub const IMAGES_DIR: &str = "assets/images";
pub const SCRIPTS_DIR: &str = "scripts";

/// Characters escaped when a file name is put back into a relative URL.
const FILENAME_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// The resource categories that get mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Script,
}

impl ResourceKind {
    /// Maps an element tag name to its category, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("img") {
            Some(Self::Image)
        } else if tag.eq_ignore_ascii_case("script") {
            Some(Self::Script)
        } else {
            None
        }
    }
}

/// How the on-disk name of a downloaded resource is derived from its effective URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FilenamePolicy {
    /// Last path segment. Distinct URLs sharing it overwrite each other.
    #[default]
    Overwrite,
    /// Every path segment joined with `_`.
    PathQualified,
}

impl FilenamePolicy {
    /// File name on disk for `url`. Path segments are percent-decoded first,
    /// so `/my%20logo.png` is saved as `my logo.png`.
    pub fn filename_for(self, url: &Url) -> Option<String> {
        let segments: Vec<String> = url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();

        let name = match self {
            Self::Overwrite => segments.last()?.clone(),
            Self::PathQualified if segments.is_empty() => return None,
            Self::PathQualified => sanitize_path(&segments.join("_")),
        };

        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return None;
        }
        Some(name)
    }
}

/// Where a mirror run writes its output: the document under `root`, and each
/// resource category in its own directory relative to `root`.
#[derive(Debug, Clone)]
pub struct SaveTarget {
    root: PathBuf,
    images_dir: String,
    scripts_dir: String,
}

impl SaveTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images_dir: IMAGES_DIR.to_string(),
            scripts_dir: SCRIPTS_DIR.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Category directory relative to the output root, `/`-separated.
    pub fn category(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::Image => &self.images_dir,
            ResourceKind::Script => &self.scripts_dir,
        }
    }

    pub fn dir_for(&self, kind: ResourceKind) -> PathBuf {
        let mut path = self.root.clone();
        for segment in self.category(kind).split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }

    /// The attribute value that points at `filename` from a document in the output root.
    /// The file name is percent-encoded so a browser resolves it back to the file on disk.
    pub fn local_reference(&self, kind: ResourceKind, filename: &str) -> String {
        format!(
            "{}/{}",
            self.category(kind),
            utf8_percent_encode(filename, FILENAME_ESCAPES)
        )
    }

    pub fn document_path(&self, output_name: &str) -> Result<PathBuf, MirrorError> {
        validate_output_name(output_name)?;
        Ok(self.root.join(output_name))
    }
}

/// The output name must be a non-empty relative path that stays inside the output root.
pub fn validate_output_name(name: &str) -> Result<(), MirrorError> {
    let invalid = |reason| MirrorError::InvalidOutputName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return Err(invalid("name must be relative"));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(invalid("name must stay inside the output root")),
        }
    }

    if path.file_name().is_none() {
        return Err(invalid("name has no file component"));
    }

    Ok(())
}

pub fn sanitize_path(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}
