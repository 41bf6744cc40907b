//! `+++` delimited TOML front matter.
//!
//! ```text
//! +++
//! title = "About"
//! layout = "page"
//! +++
//! <h1>{{ page.data.title }}</h1>
//! ```

const DELIMITER: &str = "+++";

/// Split `source` into its front matter table and the template body.
///
/// A missing closing delimiter means there is no front matter.
pub fn split_front_matter(source: &str) -> Result<(Option<toml::Table>, &str), toml::de::Error> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = strip_delimiter_line(text) else {
        return Ok((None, source));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let table: toml::Table = toml::from_str(&rest[..offset])?;
            return Ok((Some(table), &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Ok((None, source))
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_front_matter() {
        let (table, body) = split_front_matter("<h1>hi</h1>").unwrap();
        assert!(table.is_none());
        assert_eq!(body, "<h1>hi</h1>");
    }

    #[test]
    fn test_front_matter_parsed() {
        let source = "+++\ntitle = \"About\"\nlayout = \"page\"\n+++\n<h1>{{ page.data.title }}</h1>\n";
        let (table, body) = split_front_matter(source).unwrap();
        let table = table.unwrap();
        assert_eq!(table["title"].as_str(), Some("About"));
        assert_eq!(table["layout"].as_str(), Some("page"));
        assert_eq!(body, "<h1>{{ page.data.title }}</h1>\n");
    }

    #[test]
    fn test_crlf_and_bom() {
        let source = "\u{feff}+++\r\ntitle = \"x\"\r\n+++\r\nbody";
        let (table, body) = split_front_matter(source).unwrap();
        assert_eq!(table.unwrap()["title"].as_str(), Some("x"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_unclosed_is_body() {
        let source = "+++\ntitle = \"x\"\n<p>";
        let (table, body) = split_front_matter(source).unwrap();
        assert!(table.is_none());
        assert_eq!(body, source);
    }

    #[test]
    fn test_invalid_toml_errors() {
        assert!(split_front_matter("+++\ntitle = \n+++\n").is_err());
    }
}
