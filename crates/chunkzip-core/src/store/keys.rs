//! Store key layout for a package's intermediate artifacts.

/// `temp/{slug}/`
pub fn package_prefix(slug: &str) -> String {
    format!("temp/{}/", slug)
}

/// `temp/{slug}/chunk_{index}`
pub fn chunk_key(slug: &str, index: usize) -> String {
    format!("temp/{}/chunk_{}", slug, index)
}

/// `temp/{slug}/files` – the file list frozen at discovery.
pub fn file_list_key(slug: &str) -> String {
    format!("temp/{}/files", slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(chunk_key("akismet", 0), "temp/akismet/chunk_0");
        assert_eq!(chunk_key("akismet", 12), "temp/akismet/chunk_12");
        assert_eq!(file_list_key("akismet"), "temp/akismet/files");
        assert!(chunk_key("a", 1).starts_with(&package_prefix("a")));
    }
}
