//! File and folder names for exported artifacts

use url::Url;

use crate::utils::constants::MAX_SLUG_CHARS;

/// Slug a post title for use in file names.
///
/// Keeps the first 50 characters, turns anything that is not an ASCII
/// letter or digit into `-`, collapses runs of dashes, trims dashes at
/// both ends and lowercases.
#[must_use]
pub fn sanitize_title(name: &str) -> String {
    let mut slug = String::with_capacity(name.len().min(MAX_SLUG_CHARS));
    for ch in name.chars().take(MAX_SLUG_CHARS) {
        let ch = if ch.is_ascii_alphanumeric() {
            ch.to_ascii_lowercase()
        } else {
            '-'
        };
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }
    slug.trim_matches('-').to_string()
}

/// File extension for a downloaded image, `jpg` when the URL has none
#[must_use]
pub fn image_extension(image_url: &str) -> String {
    let path = match Url::parse(image_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => image_url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let file_name = path.rsplit('/').next().unwrap_or_default();

    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => "jpg".to_string(),
    }
}

/// Milliseconds since the Unix epoch, used to keep export names unique
#[must_use]
pub fn export_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[must_use]
pub fn posts_json_name(timestamp: i64) -> String {
    format!("wordpress-posts-{timestamp}.json")
}

#[must_use]
pub fn posts_csv_name(timestamp: i64) -> String {
    format!("wordpress-posts-{timestamp}.csv")
}

#[must_use]
pub fn logs_json_name(timestamp: i64) -> String {
    format!("wp-crawler-logs-{timestamp}.json")
}

/// `post-<id>-<slug>.csv` for the per-post export
#[must_use]
pub fn post_csv_name(file_id: &str, title: &str) -> String {
    format!("post-{file_id}-{}.csv", sanitize_title(title))
}

/// `post-<id>-<slug>` folder for organized image downloads
#[must_use]
pub fn post_folder_name(file_id: &str, title: &str) -> String {
    format!("post-{file_id}-{}", sanitize_title(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn titles_become_slugs() {
        assert_eq!(sanitize_title("Hello, World!  2024"), "hello-world-2024");
        assert_eq!(sanitize_title("--Already--dashed--"), "already-dashed");
        assert_eq!(sanitize_title("Café au lait"), "caf-au-lait");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn long_titles_are_cut_before_slugging() {
        let title = "a".repeat(49) + " tail that is dropped";
        assert_eq!(sanitize_title(&title), "a".repeat(49));
    }

    #[test]
    fn extensions_come_from_the_path() {
        assert_eq!(image_extension("https://example.com/a/photo.PNG?w=300"), "png");
        assert_eq!(image_extension("https://example.com/uploads/image"), "jpg");
        assert_eq!(image_extension("https://cdn.example.com/x.webp#frag"), "webp");
    }

    #[test]
    fn file_names_follow_export_layout() {
        assert_eq!(post_csv_name("12", "My Post"), "post-12-my-post.csv");
        assert_eq!(posts_json_name(1), "wordpress-posts-1.json");
        assert_eq!(logs_json_name(5), "wp-crawler-logs-5.json");
    }

    proptest! {
        #[test]
        fn slugs_are_filename_safe(title in "\\PC{0,80}") {
            let slug = sanitize_title(&title);
            prop_assert!(slug.len() <= MAX_SLUG_CHARS);
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
