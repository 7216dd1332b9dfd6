//! Path and URL helpers
//!
//! Small string helpers for file names and object URLs.

/// Marker returned when a file name has no dot
pub const NO_EXTENSION: &str = "No extension";

/// Text after the last `.` of a file name, or "No extension" without one
///
/// # Examples
/// * `photo.jpg` -> `jpg`
/// * `archive.tar.gz` -> `gz`
/// * `noext` -> `No extension`
pub fn get_file_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => NO_EXTENSION,
    }
}

/// Append `name=value` to a URL, using `&` when a query string already exists
pub fn append_query_param(url: &str, name: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("photo.jpg"), "jpg");
        assert_eq!(get_file_extension("noext"), "No extension");
        assert_eq!(get_file_extension("archive.tar.gz"), "gz");
        assert_eq!(get_file_extension(".hidden"), "hidden");
        assert_eq!(get_file_extension("trailing."), "");
    }

    #[test]
    fn test_append_query_param() {
        assert_eq!(
            append_query_param("https://b.s3.amazonaws.com/cat.jpg", "retry", "1"),
            "https://b.s3.amazonaws.com/cat.jpg?retry=1"
        );
        assert_eq!(
            append_query_param("https://cdn.example.com/cat.jpg?v=2", "retry", "3"),
            "https://cdn.example.com/cat.jpg?v=2&retry=3"
        );
    }
}
