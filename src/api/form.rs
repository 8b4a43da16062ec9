// Form body parsing
// POST/PUT /shows take application/x-www-form-urlencoded or
// multipart/form-data fields

use std::fmt;

/// Show fields as submitted; absent fields stay `None`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShowForm {
    pub name: Option<String>,
    pub episodes_seen: Option<String>,
}

impl ShowForm {
    /// Keep the first value of each known field. Unknown fields are ignored.
    fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut form.name,
                "episodes_seen" => &mut form.episodes_seen,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        form
    }
}

#[derive(Debug)]
pub enum FormError {
    Urlencoded(serde_urlencoded::de::Error),
    Multipart(multer::Error),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Urlencoded(e) => write!(f, "{e}"),
            Self::Multipart(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<serde_urlencoded::de::Error> for FormError {
    fn from(e: serde_urlencoded::de::Error) -> Self {
        Self::Urlencoded(e)
    }
}

impl From<multer::Error> for FormError {
    fn from(e: multer::Error) -> Self {
        Self::Multipart(e)
    }
}

/// Decode a urlencoded body
pub fn parse_show_form(body: &[u8]) -> Result<ShowForm, FormError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
    Ok(ShowForm::from_pairs(pairs))
}

/// Decode a multipart body. File parts are skipped.
pub async fn parse_multipart_form(body: &[u8], boundary: String) -> Result<ShowForm, FormError> {
    let mut multipart = multer::Multipart::with_reader(body, boundary);
    let mut pairs = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        pairs.push((name, field.text().await?));
    }

    Ok(ShowForm::from_pairs(pairs))
}

/// Parse `episodes_seen` the way creation requires: ASCII digits only
pub fn parse_episode_count(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipart_body(boundary: &str, parts: &[(&str, &str)]) -> Vec<u8> {
        let mut body = String::new();
        for (name, value) in parts {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        body.into_bytes()
    }

    #[test]
    fn test_parse_full_form() {
        let form = parse_show_form(b"name=The+Wire&episodes_seen=12").unwrap();
        assert_eq!(form.name.as_deref(), Some("The Wire"));
        assert_eq!(form.episodes_seen.as_deref(), Some("12"));
    }

    #[test]
    fn test_parse_partial_and_empty() {
        let form = parse_show_form(b"name=Dark%21").unwrap();
        assert_eq!(form.name.as_deref(), Some("Dark!"));
        assert!(form.episodes_seen.is_none());

        assert_eq!(parse_show_form(b"").unwrap(), ShowForm::default());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let form = parse_show_form(b"id=4&name=X").unwrap();
        assert_eq!(form.name.as_deref(), Some("X"));
    }

    #[test]
    fn test_repeated_field_keeps_first() {
        let form = parse_show_form(b"name=a&name=b&episodes_seen=1").unwrap();
        assert_eq!(form.name.as_deref(), Some("a"));
        assert_eq!(form.episodes_seen.as_deref(), Some("1"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let form = parse_show_form(b"name=&episodes_seen=").unwrap();
        assert_eq!(form.name.as_deref(), Some(""));
        assert_eq!(form.episodes_seen.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_parse_multipart() {
        let body = multipart_body("XyZ", &[("name", "Dark"), ("episodes_seen", "26"), ("extra", "1")]);
        let form = parse_multipart_form(&body, "XyZ".to_string()).await.unwrap();
        assert_eq!(form.name.as_deref(), Some("Dark"));
        assert_eq!(form.episodes_seen.as_deref(), Some("26"));
    }

    #[tokio::test]
    async fn test_multipart_skips_files() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"name\"; filename=\"n.txt\"\r\n\
                    Content-Type: text/plain\r\n\r\nfrom-file\r\n--b--\r\n";
        let form = parse_multipart_form(body.as_bytes(), "b".to_string()).await.unwrap();
        assert!(form.name.is_none());
    }

    #[tokio::test]
    async fn test_truncated_multipart_fails() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nDark";
        let err = parse_multipart_form(body, "b".to_string()).await.unwrap_err();
        assert!(matches!(err, FormError::Multipart(_)));
    }

    #[test]
    fn test_episode_count() {
        assert_eq!(parse_episode_count("3"), Some(3));
        assert_eq!(parse_episode_count("007"), Some(7));
        assert_eq!(parse_episode_count(""), None);
        assert_eq!(parse_episode_count("-1"), None);
        assert_eq!(parse_episode_count("+1"), None);
        assert_eq!(parse_episode_count("1.5"), None);
        assert_eq!(parse_episode_count("three"), None);
        assert_eq!(parse_episode_count("99999999999999999999999"), None);
    }
}
