use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::site::SiteObject;

/// What a template sees as `page`.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    /// Source file being rendered.
    #[serde(skip)]
    pub source: PathBuf,
    pub destination: String,
    /// Root-relative URL of the destination (`/m/` for `m/index.html`).
    pub url: String,
    /// Variant key, absent for the default object.
    pub variant: Option<String>,
    pub layout: Option<String>,
    pub data: Map<String, Value>,
}

impl PageContext {
    pub fn new(source: &Path, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        Self {
            source: source.to_path_buf(),
            url: url_for(&destination),
            destination,
            variant: None,
            layout: None,
            data: Map::new(),
        }
    }

    pub fn for_object(source: &Path, object: &SiteObject) -> Self {
        Self {
            variant: object.key.clone(),
            layout: object.layout.clone(),
            data: object.data.clone(),
            ..Self::new(source, object.destination.clone())
        }
    }
}

fn url_for(destination: &str) -> String {
    let trimmed = destination
        .strip_suffix("index.html")
        .unwrap_or(destination)
        .trim_start_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("index.html"), "/");
        assert_eq!(url_for("m/index.html"), "/m/");
        assert_eq!(url_for("about.html"), "/about.html");
    }

    #[test]
    fn test_for_object_copies_descriptor() {
        let mut object = SiteObject::new("m/index.html").with_layout("mobile");
        object.key = Some("mobile".into());
        object.data.insert("title".into(), "Home".into());

        let page = PageContext::for_object(Path::new("/s/documents/index.html"), &object);
        assert_eq!(page.variant.as_deref(), Some("mobile"));
        assert_eq!(page.layout.as_deref(), Some("mobile"));
        assert_eq!(page.url, "/m/");
        assert_eq!(page.data["title"], "Home");

        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("source").is_none());
    }
}
