//! Destination tracking.
//!
//! `Apply` moves a record to its object's destination, `Restore` moves it
//! back to where it was read from. Both are idempotent.

use async_trait::async_trait;

use super::{FileRecord, PipelineError, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestinationMode {
    #[default]
    Apply,
    Restore,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DestinationTracker {
    mode: DestinationMode,
}

impl DestinationTracker {
    pub fn apply() -> Self {
        Self {
            mode: DestinationMode::Apply,
        }
    }

    pub fn restore() -> Self {
        Self {
            mode: DestinationMode::Restore,
        }
    }

    pub fn run(&self, record: &mut FileRecord) {
        match self.mode {
            DestinationMode::Apply => apply_destination(record),
            DestinationMode::Restore => restore_destination(record),
        }
    }
}

fn apply_destination(record: &mut FileRecord) {
    if record.object.is_none() {
        return;
    }
    let Some(destination) = record.destination.as_deref() else {
        return;
    };

    if record.source_path.is_none() {
        record.source_path = Some(record.path.clone());
    }
    record.path = record.base.join(destination);
}

fn restore_destination(record: &mut FileRecord) {
    if let Some(source) = &record.source_path {
        record.path.clone_from(source);
    }
}

#[async_trait]
impl Stage for DestinationTracker {
    fn name(&self) -> &'static str {
        "destination"
    }

    async fn process(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        self.run(&mut record);
        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::site::SiteObject;

    fn record() -> FileRecord {
        let mut record = FileRecord::new("/s/styles/main.css", "/s", "body{}");
        record.attach(SiteObject::new("css/main.css").into_ref());
        record
    }

    #[test]
    fn test_apply_sets_path() {
        let mut r = record();
        DestinationTracker::apply().run(&mut r);
        assert_eq!(r.path, PathBuf::from("/s/css/main.css"));
        assert_eq!(r.relative(), PathBuf::from("css/main.css"));
        assert_eq!(r.source(), Path::new("/s/styles/main.css"));
    }

    #[test]
    fn test_restore_reverts_path() {
        let mut r = record();
        DestinationTracker::apply().run(&mut r);
        DestinationTracker::restore().run(&mut r);
        assert_eq!(r.path, PathBuf::from("/s/styles/main.css"));
    }

    #[test]
    fn test_apply_restore_apply_matches_single_apply() {
        let mut once = record();
        DestinationTracker::apply().run(&mut once);

        let mut toggled = record();
        DestinationTracker::apply().run(&mut toggled);
        DestinationTracker::restore().run(&mut toggled);
        DestinationTracker::apply().run(&mut toggled);

        assert_eq!(toggled.path, once.path);
        assert_eq!(toggled.source_path, once.source_path);
        assert_eq!(toggled.destination, once.destination);
    }

    #[test]
    fn test_apply_twice_is_noop() {
        let mut r = record();
        DestinationTracker::apply().run(&mut r);
        let path = r.path.clone();
        DestinationTracker::apply().run(&mut r);
        assert_eq!(r.path, path);
        assert_eq!(r.source(), Path::new("/s/styles/main.css"));
    }

    #[test]
    fn test_restore_without_apply_is_noop() {
        let mut r = record();
        DestinationTracker::restore().run(&mut r);
        assert_eq!(r.path, PathBuf::from("/s/styles/main.css"));
    }

    #[test]
    fn test_record_without_object_untouched() {
        let mut r = FileRecord::new("/s/a.txt", "/s", "x");
        r.destination = Some("b.txt".into());
        DestinationTracker::apply().run(&mut r);
        assert_eq!(r.path, PathBuf::from("/s/a.txt"));
    }
}
