//! Persistent cache descriptor

use crate::schema::Toggle;
use crate::schema::compilation::{CacheKeyStrategy, PersistentCacheConfig};
use crate::schema::user::PersistentCacheOptions;
use kiln_fs::NormalizedPath;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_CACHE_NAMESPACE: &str = "kiln-cache";

/// Resolution facts the cache key depends on.
#[derive(Debug, Clone, Copy)]
pub struct CacheInputs<'a> {
    pub root: &'a NormalizedPath,
    pub config_file: Option<&'a NormalizedPath>,
    pub config_file_dependencies: &'a [String],
    pub env_files: &'a [String],
    pub env: &'a BTreeMap<String, String>,
}

/// Expand the user's `persistentCache` option.
///
/// `false` disables the cache. `true` or an absent option yields the full
/// default descriptor; an object keeps its fields and fills the rest.
pub fn normalize_persistent_cache(
    option: Option<&Toggle<PersistentCacheOptions>>,
    inputs: CacheInputs<'_>,
) -> Toggle<PersistentCacheConfig> {
    let options = match option {
        Some(Toggle::Flag(false)) => return Toggle::Flag(false),
        Some(Toggle::Options(options)) => options.clone(),
        Some(Toggle::Flag(true)) | None => PersistentCacheOptions::default(),
    };

    let mut build_dependencies: BTreeSet<String> =
        options.build_dependencies.unwrap_or_default().into_iter().collect();
    if let Some(config_file) = inputs.config_file {
        build_dependencies.insert(config_file.to_string());
    }
    build_dependencies.extend(inputs.config_file_dependencies.iter().cloned());
    build_dependencies.extend(inputs.env_files.iter().cloned());

    let package_json = inputs.root.join("package.json");
    if package_json.is_file() {
        build_dependencies.insert(package_json.to_string());
    }

    let strategy = options.module_cache_key_strategy.unwrap_or_default();
    let mut envs = inputs.env.clone();
    envs.extend(options.envs.unwrap_or_default());

    Toggle::Options(PersistentCacheConfig {
        namespace: options
            .namespace
            .unwrap_or_else(|| DEFAULT_CACHE_NAMESPACE.to_string()),
        cache_dir: options.cache_dir.unwrap_or_else(|| {
            inputs.root.join("node_modules/.kiln/cache").to_string()
        }),
        build_dependencies: build_dependencies.into_iter().collect(),
        module_cache_key_strategy: CacheKeyStrategy {
            timestamp: strategy.timestamp.unwrap_or(true),
            hash: strategy.hash.unwrap_or(true),
        },
        envs,
    })
}
