// File and folder name sanitizing

/// Replaces every character that is not alphanumeric
/// and not in the allowed set with an underscore
///
/// # Arguments
///
/// * `name` - Name to sanitize
/// * `allowed` - Extra characters to keep as they are
pub fn sanitize_file_name(name: &str, allowed: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || allowed.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Like sanitize_file_name, but only keeps ASCII characters,
/// so the result can go in a header value
pub fn ascii_file_name(name: &str, allowed: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || allowed.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Splits a file name into its base name and extension (with the dot)
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(i) => (&name[..i], &name[i..]),
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("PK2025-ANK001", "-_"), "PK2025-ANK001");
        assert_eq!(
            sanitize_file_name("Kaldırma Ekipmanları (Vinç)", "-_ ()"),
            "Kaldırma Ekipmanları (Vinç)"
        );
        assert_eq!(sanitize_file_name("a/b\\c:d", "-_"), "a_b_c_d");
        assert_eq!(sanitize_file_name("photo 1.jpg", ".-_"), "photo_1.jpg");
    }

    #[test]
    fn test_ascii_file_name() {
        assert_eq!(ascii_file_name("vinç fotoğrafı.jpg", ".-_"), "vin__foto_raf_.jpg");
        assert_eq!(ascii_file_name("report\"1\".pdf", ".-_"), "report_1_.pdf");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("photo.jpg"), ("photo", ".jpg"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".env"), (".env", ""));
    }
}
