//! Content hashing.
//!
//! Derives revisioned destinations from the blake3 digest of a record's
//! final bytes.

use async_trait::async_trait;

use super::{FileRecord, PipelineError, Stage};
use crate::config::{HashPlacement, RevisionConfig};

/// Lowercase hex blake3 digest of `bytes`, truncated to `length`.
pub fn digest(bytes: &[u8], length: usize) -> String {
    let mut hex = hex::encode(blake3::hash(bytes).as_bytes());
    hex.truncate(length);
    hex
}

/// Inject `digest` into `destination`.
///
/// ```text
/// extension:  css/main.css -> css/main.<digest>.css
/// directory:  css/main.css -> css/<digest>/main.css
/// ```
pub fn revisioned_path(
    destination: &str,
    digest: &str,
    placement: HashPlacement,
    separator: &str,
) -> String {
    let (dir, file) = match destination.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, destination),
    };

    let file = match placement {
        HashPlacement::Extension => match file.rfind('.') {
            // Dotfiles like `.htaccess` have no extension.
            Some(dot) if dot > 0 => {
                format!("{}{separator}{digest}{}", &file[..dot], &file[dot..])
            }
            _ => format!("{file}{separator}{digest}"),
        },
        HashPlacement::Directory => format!("{digest}/{file}"),
    };

    match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    }
}

/// Stage computing digests and revisioned destinations.
#[derive(Debug, Clone)]
pub struct Hasher {
    length: usize,
    placement: HashPlacement,
    separator: String,
}

impl Hasher {
    pub fn new(config: &RevisionConfig) -> Self {
        Self {
            length: config.length,
            placement: config.placement,
            separator: config.separator.clone(),
        }
    }

    pub fn hash(&self, record: &mut FileRecord) -> Result<(), PipelineError> {
        if record.contents.is_stream() {
            return Err(PipelineError::streaming("hash", &record.path));
        }

        let Some(object) = record.object.clone() else {
            return Ok(());
        };
        let Some(destination) = record.destination.clone() else {
            return Ok(());
        };
        if !record.revision {
            return Ok(());
        }
        let Some(bytes) = record.contents.as_bytes().filter(|b| !b.is_empty()) else {
            return Ok(());
        };

        let digest = digest(bytes, self.length);
        if record.hash.as_deref() == Some(digest.as_str()) {
            return Ok(());
        }

        let original = record.original_destination.take().unwrap_or(destination);
        let revisioned = revisioned_path(&original, &digest, self.placement, &self.separator);

        crate::debug!("hash"; "{} -> {}", original, revisioned);

        {
            let mut object = object.write();
            object.hash = Some(digest.clone());
            object.original_destination = Some(original.clone());
            object.destination.clone_from(&revisioned);
        }
        record.hash = Some(digest);
        record.original_destination = Some(original);
        record.destination = Some(revisioned);
        Ok(())
    }
}

#[async_trait]
impl Stage for Hasher {
    fn name(&self) -> &'static str {
        "hash"
    }

    async fn process(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        self.hash(&mut record)?;
        Ok(vec![record])
    }
}
