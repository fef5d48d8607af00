//! Artifact file name resolution

use regex::Regex;
use std::sync::LazyLock;

/// `<name>.<x>ar` followed by a non-identifier character or end of input.
/// Dots are allowed inside the name so versioned archives (`app-1.2.3.war`) survive.
static ARCHIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_.\-]+\.[A-Za-z](?:ar|AR))(?:$|[^A-Za-z0-9_\-])")
        .expect("archive name pattern is valid")
});

/// Extract the artifact file name from a URL
///
/// Takes everything after the last `/`. When a query string is present the
/// name is recovered by looking for a `.war`/`.jar`/`.ear`-style token; if none
/// is found the naive substring is returned. Never fails, so malformed URLs
/// must be rejected by the caller.
pub fn archive_name_from_url(url: &str) -> String {
    let name = match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };

    if name.find('?').is_some_and(|idx| idx > 0) {
        if let Some(found) = ARCHIVE_NAME.captures(name).and_then(|c| c.get(1)) {
            return found.as_str().to_string();
        }
    }

    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url() {
        assert_eq!(
            archive_name_from_url("https://repo.example.com/releases/app-1.0.war"),
            "app-1.0.war"
        );
        assert_eq!(archive_name_from_url("file:///tmp/build/app.jar"), "app.jar");
        assert_eq!(archive_name_from_url("app.jar"), "app.jar");
    }

    #[test]
    fn test_no_query_keeps_naive_name() {
        assert_eq!(archive_name_from_url("https://host/dist/bundle.zip"), "bundle.zip");
        assert_eq!(archive_name_from_url("https://host/dist/"), "");
    }

    #[test]
    fn test_signed_url() {
        assert_eq!(
            archive_name_from_url("https://host/build/app-1.2.3.war?sig=abc"),
            "app-1.2.3.war"
        );
        assert_eq!(
            archive_name_from_url("https://s3.example.com/bucket/service.JAR?X-Amz-Expires=300"),
            "service.JAR"
        );
        assert_eq!(
            archive_name_from_url("https://host/artifacts/enterprise_app.ear?token=a-b"),
            "enterprise_app.ear"
        );
    }

    #[test]
    fn test_name_inside_query() {
        assert_eq!(
            archive_name_from_url("https://ci.example.com/download?file=web-app.war&build=12"),
            "web-app.war"
        );
    }

    #[test]
    fn test_query_without_archive() {
        assert_eq!(
            archive_name_from_url("https://host/latest?format=zip"),
            "latest?format=zip"
        );
    }

    #[test]
    fn test_leading_question_mark_is_not_a_query() {
        assert_eq!(archive_name_from_url("https://host/?app.war"), "?app.war");
    }
}
