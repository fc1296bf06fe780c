//! Remote location of a package on the listing-capable file host.

use url::Url;

use crate::error::WorkerError;

/// Placeholder substituted with the package slug in source URL templates.
pub const SLUG_PLACEHOLDER: &str = "{slug}";

/// Root URL of one package, e.g. `https://cdn.jsdelivr.net/wp/plugins/akismet/trunk`.
#[derive(Debug, Clone)]
pub struct PackageSource {
    slug: String,
    root: Url,
}

impl PackageSource {
    /// Builds the package root from a template containing `{slug}`.
    pub fn from_template(template: &str, slug: &str) -> Result<Self, WorkerError> {
        let raw = template.replace(SLUG_PLACEHOLDER, slug);
        let root = Url::parse(&raw)
            .map_err(|e| WorkerError::Discovery(format!("invalid source url {}: {}", raw, e)))?;
        if root.cannot_be_a_base() {
            return Err(WorkerError::Discovery(format!(
                "source url cannot be a base: {}",
                raw
            )));
        }
        Ok(Self {
            slug: slug.to_string(),
            root,
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// URL of the directory listing for `dir` (`""` or `/sub/dir`), with a
    /// trailing slash.
    pub fn dir_url(&self, dir: &str) -> String {
        let mut url = self.join(dir);
        if let Ok(mut segs) = url.path_segments_mut() {
            segs.pop_if_empty().push("");
        }
        url.into()
    }

    /// URL of the raw file at `path` (`/sub/a.php`).
    pub fn file_url(&self, path: &str) -> String {
        self.join(path).into()
    }

    fn join(&self, path: &str) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut segs) = url.path_segments_mut() {
            segs.pop_if_empty();
            segs.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}
