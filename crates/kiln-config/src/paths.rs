//! Public path and public directory normalization

use kiln_fs::NormalizedPath;
use regex::Regex;
use std::sync::LazyLock;

/// Matches `http://host`, `https://host` and protocol-relative `//host`.
pub static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?:)?//([^/]+)").unwrap());

/// Directory name used when `publicDir` is not configured.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Result of normalizing a `publicPath` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPath {
    pub path: String,
    /// Set when the input was irregular and a prefix was required
    pub warning: Option<String>,
}

impl PublicPath {
    /// Log the warning, if any, and return the normalized path.
    pub fn emit(self) -> String {
        if let Some(warning) = &self.warning {
            tracing::warn!("{warning}");
        }
        self.path
    }
}

/// Normalize a public asset path.
///
/// An empty path is returned as is. Otherwise leading dots are stripped,
/// a trailing slash is ensured, and when
/// `prefix_needed` a leading slash is ensured unless the value is a URL.
/// Without `prefix_needed` a leading slash is removed instead. Any change
/// beyond appending the trailing slash to a URL counts as irregular.
pub fn normalize_public_path(public_path: &str, prefix_needed: bool) -> PublicPath {
    // Empty means asset URLs stay relative to the page
    if public_path.is_empty() {
        return PublicPath {
            path: String::new(),
            warning: None,
        };
    }

    let mut normalized = public_path.to_string();
    let mut irregular = false;

    if normalized.starts_with('.') {
        irregular = true;
        normalized = normalized.trim_start_matches('.').to_string();
    }

    if !normalized.ends_with('/') {
        if !URL_PATTERN.is_match(&normalized) {
            irregular = true;
        }
        normalized.push('/');
    }

    let is_url = URL_PATTERN.is_match(&normalized);
    if normalized.starts_with('/') && !is_url && !prefix_needed {
        normalized.remove(0);
    } else if prefix_needed && !normalized.starts_with('/') && !is_url {
        irregular = true;
        normalized.insert(0, '/');
    }

    let warning = (irregular && prefix_needed).then(|| {
        format!(
            " (!) Irregular 'publicPath' options: '{public_path}', it should only be an absolute path like '/publicPath/', an url or an empty string."
        )
    });

    PublicPath {
        path: normalized,
        warning,
    }
}

/// Resolve the public directory against `root` unless it is absolute.
pub fn normalize_public_dir(root: &NormalizedPath, user_public_dir: Option<&str>) -> NormalizedPath {
    root.join(user_public_dir.unwrap_or(DEFAULT_PUBLIC_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("./a", "/a/", true)]
    #[case("../a/", "/a/", true)]
    #[case("https://cdn.x/y", "https://cdn.x/y/", false)]
    #[case("//cdn.x/assets", "//cdn.x/assets/", false)]
    #[case("/p", "/p/", true)]
    #[case("/p/", "/p/", false)]
    #[case("p/", "/p/", true)]
    #[case("", "", false)]
    fn normalizes_with_prefix(#[case] input: &str, #[case] expected: &str, #[case] warns: bool) {
        let result = normalize_public_path(input, true);
        assert_eq!(result.path, expected);
        assert_eq!(result.warning.is_some(), warns, "warning for {input:?}");
    }

    #[test]
    fn without_prefix_strips_leading_slash_silently() {
        let result = normalize_public_path("/assets/", false);
        assert_eq!(result.path, "assets/");
        assert!(result.warning.is_none());
    }

    #[test]
    fn without_prefix_keeps_urls() {
        let result = normalize_public_path("https://cdn.x/", false);
        assert_eq!(result.path, "https://cdn.x/");
    }

    #[test]
    fn public_dir_defaults_under_root() {
        let root = NormalizedPath::new("/project");
        assert_eq!(normalize_public_dir(&root, None).as_str(), "/project/public");
        assert_eq!(
            normalize_public_dir(&root, Some("static")).as_str(),
            "/project/static"
        );
        assert_eq!(
            normalize_public_dir(&root, Some("/srv/static")).as_str(),
            "/srv/static"
        );
    }
}
