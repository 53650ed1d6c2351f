//! Media storage for uploaded files (event codes of conduct and merchandise
//! option images).

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_graphql::{Context, InputObject};
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{RegcoreError, RegcoreResult};

/// Which upload field a file belongs to. Each one is stored under its own
/// date-partitioned prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadField {
    CodeOfConduct,
    OptionImage,
}

impl UploadField {
    pub fn prefix(&self) -> &'static str {
        match self {
            UploadField::CodeOfConduct => "codes_of_conduct",
            UploadField::OptionImage => "price_level",
        }
    }

    /// `<prefix>/YYYY/MM/DD`
    pub fn directory_for(&self, day: Date) -> PathBuf {
        PathBuf::from(self.prefix())
            .join(format!("{:04}", day.year()))
            .join(format!("{:02}", u8::from(day.month())))
            .join(format!("{:02}", day.day()))
    }
}

/// A file sent through the API, with its content encoded as base64
#[derive(InputObject, Clone)]
pub struct FileUpload {
    /// The name of the file; any directories are ignored
    pub path: String,
    /// The base64-encoded content of the file
    pub content: String,
}

impl FileUpload {
    pub fn file_name(&self) -> RegcoreResult<String> {
        Path::new(&self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| RegcoreError::BadUpload(format!("no file name in {:?}", self.path)))
    }

    pub fn decode(&self) -> RegcoreResult<Vec<u8>> {
        base64::decode(&self.content)
            .map_err(|err| RegcoreError::BadUpload(format!("couldn't decode file as base64: {}", err)))
    }
}

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_ctx<'c>(ctx: &Context<'c>) -> &'c Self {
        ctx.data_unchecked::<MediaStore>()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The absolute location of a path previously returned by [`MediaStore::save`].
    pub fn locate(&self, stored: &str) -> PathBuf {
        self.root.join(stored)
    }

    /// Writes the upload under the field's directory for `day` and returns the
    /// stored path relative to the media root. Existing files are never
    /// overwritten; a clashing name gets a random suffix.
    pub fn save(&self, field: UploadField, upload: &FileUpload, day: Date) -> RegcoreResult<String> {
        let file_name = upload.file_name()?;
        let content = upload.decode()?;

        let directory = field.directory_for(day);
        fs::create_dir_all(self.root.join(&directory))?;

        let mut candidate = directory.join(&file_name);
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&candidate))
            {
                Ok(mut file) => {
                    if let Err(err) = file.write_all(&content) {
                        drop(file);
                        self.remove(&candidate);
                        return Err(err.into());
                    }
                    break;
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    candidate = directory.join(Self::with_suffix(&file_name));
                }
                Err(err) => return Err(err.into()),
            }
        }

        let stored = candidate
            .to_str()
            .map(|path| path.replace('\\', "/"))
            .ok_or_else(|| RegcoreError::BadUpload(format!("{} is not valid UTF-8", file_name)))?;
        info!(path = %stored, bytes = content.len(), "stored upload");

        Ok(stored)
    }

    /// Deletes a stored file, logging instead of failing if it can't be removed.
    pub fn remove(&self, stored: impl AsRef<Path>) {
        let path = self.root.join(stored);

        match fs::remove_file(&path) {
            Ok(()) => info!(path = %path.display(), "removed upload"),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to remove upload"),
        }
    }

    fn with_suffix(file_name: &str) -> String {
        let suffix: String = Uuid::new_v4().to_simple().to_string().chars().take(7).collect();

        match file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => {
                format!("{}_{}.{}", stem, suffix, extension)
            }
            _ => format!("{}_{}", file_name, suffix),
        }
    }
}
