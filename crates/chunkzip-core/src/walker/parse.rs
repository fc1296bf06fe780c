//! Parse HTML directory listings into entries.

use regex::Regex;
use std::sync::OnceLock;

/// Kind of a listing entry, decided by the trailing `/` on its href.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One anchor from a listing page, parent link excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<li><a href="([^"]+)">([^<]+)</a></li>"#).expect("static listing regex")
    })
}

/// A name that stays inside its directory: not `.`/`..`, no separators.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Extracts `<li><a href="...">name</a></li>` entries in page order.
///
/// Skips the parent link (`../` href or `..` name). A trailing `/` on the
/// displayed name is dropped. Any other name that is not a plain single
/// path component is skipped with a warning.
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let mut out = Vec::new();
    for cap in anchor_re().captures_iter(html) {
        let href = &cap[1];
        let name = &cap[2];
        if href == "../" || name == ".." {
            continue;
        }
        let kind = if href.ends_with('/') {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let name = name.strip_suffix('/').unwrap_or(name);
        if !is_plain_name(name) {
            tracing::warn!(name, "skipping listing entry with unsafe name");
            continue;
        }
        out.push(ListingEntry {
            name: name.to_string(),
            kind,
        });
    }
    out
}

/// Joins `parent` and `name` with `/` and collapses repeated separators.
pub fn join_path(parent: &str, name: &str) -> String {
    let joined = format!("{}/{}", parent, name);
    let mut out = String::with_capacity(joined.len());
    let mut prev_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}
