//! Config file dependency tracing
//!
//! Collects the config file and every local module it pulls in, so a
//! change to any of them can invalidate caches and restart the dev server.
//! Only relative specifiers are followed; packages are never traced.

use crate::Result;
use kiln_fs::NormalizedPath;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Extensions tried, in order, for specifiers written without one.
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "mts", "cts", "js", "mjs", "cjs", "json"];

static SPECIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?:import|export)\s[^'";]*?\bfrom\s*['"]([^'"]+)['"]"#,
        r#"|\bimport\s*['"]([^'"]+)['"]"#,
        r#"|\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        r#"|\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
    ))
    .unwrap()
});

/// Trace `entry` and its local imports, returning sorted absolute paths.
pub fn trace_dependencies(entry: &NormalizedPath) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut pending = vec![entry.clone()];

    while let Some(file) = pending.pop() {
        if !seen.insert(file.clone()) {
            continue;
        }
        if file.extension() == Some("json") {
            continue;
        }
        let Some(source) = kiln_fs::io::read_text_if_exists(&file)? else {
            continue;
        };
        let Some(dir) = file.parent() else {
            continue;
        };

        for specifier in local_specifiers(&source) {
            match resolve_local(&dir, specifier) {
                Some(resolved) => pending.push(resolved),
                None => tracing::debug!(%file, specifier, "Could not resolve local import"),
            }
        }
    }

    Ok(seen.into_iter().map(String::from).collect())
}

fn local_specifiers(source: &str) -> impl Iterator<Item = &str> {
    SPECIFIER_PATTERN
        .captures_iter(source)
        .filter_map(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str())
        .filter(|specifier| specifier.starts_with("./") || specifier.starts_with("../"))
}

fn resolve_local(dir: &NormalizedPath, specifier: &str) -> Option<NormalizedPath> {
    let base = dir.join(specifier);
    if base.is_file() {
        return Some(base);
    }

    let with_extension = RESOLVE_EXTENSIONS
        .iter()
        .map(|ext| NormalizedPath::new(format!("{base}.{ext}")));
    let as_index = RESOLVE_EXTENSIONS
        .iter()
        .map(|ext| base.join(&format!("index.{ext}")));

    with_extension.chain(as_index).find(|candidate| candidate.is_file())
}
