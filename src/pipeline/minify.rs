use async_trait::async_trait;

use super::{Contents, FileRecord, PipelineError, Stage};
use crate::asset::minify::{MinifyLang, is_preminified, minify};

/// Minifies scripts and styles whose object asks for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minify;

#[async_trait]
impl Stage for Minify {
    fn name(&self) -> &'static str {
        "minify"
    }

    async fn process(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, PipelineError> {
        if record.contents.is_stream() {
            return Err(PipelineError::streaming("minify", &record.path));
        }

        let wanted = record.object.as_ref().is_some_and(|o| o.read().minify);
        let source_path = record.source().to_path_buf();
        let lang = MinifyLang::from_path(&source_path);

        let (true, Some(lang), Some(bytes)) = (wanted, lang, record.contents.as_bytes()) else {
            return Ok(vec![record]);
        };
        if is_preminified(&source_path) || bytes.is_empty() {
            return Ok(vec![record]);
        }

        let source = String::from_utf8_lossy(bytes);
        let minified = minify(lang, &source).map_err(|message| PipelineError::Minify {
            path: source_path.clone(),
            message,
        })?;

        crate::debug!(
            "minify";
            "{}: {} -> {} bytes",
            record.relative().display(),
            bytes.len(),
            minified.len()
        );
        record.contents = Contents::from(minified);
        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteObject;

    fn record(path: &str, contents: &str, minify: bool) -> FileRecord {
        let mut object = SiteObject::new("out");
        object.minify = minify;
        let mut record = FileRecord::new(path, "/s", contents);
        record.attach(object.into_ref());
        record
    }

    #[tokio::test]
    async fn test_minifies_when_requested() {
        let out = Minify
            .process(record("/s/styles/a.css", "a {\n  color: red;\n}\n", true))
            .await
            .unwrap();
        assert_eq!(out[0].contents.as_bytes(), Some(&b"a{color:red}"[..]));
    }

    #[tokio::test]
    async fn test_skips_when_not_requested() {
        let source = "a {\n  color: red;\n}\n";
        let out = Minify
            .process(record("/s/styles/a.css", source, false))
            .await
            .unwrap();
        assert_eq!(out[0].contents.as_bytes(), Some(source.as_bytes()));
    }

    #[tokio::test]
    async fn test_skips_preminified() {
        let source = "var a = 1;\n";
        let out = Minify
            .process(record("/s/scripts/lib.min.js", source, true))
            .await
            .unwrap();
        assert_eq!(out[0].contents.as_bytes(), Some(source.as_bytes()));
    }

    #[tokio::test]
    async fn test_syntax_error_fails_record() {
        let err = Minify
            .process(record("/s/scripts/bad.js", "function (", true))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Minify { .. }));
    }
}
