#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Where the exported collection files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Source {
    /// Bucket holding the exports.
    pub bucket: String,

    /// Path inside the bucket under which every prefix is resolved.
    pub base_path: String,

    /// Prefixes listed below `base_path`, e.g. one per source cluster.
    pub prefixes: Vec<String>,

    /// Overrides the object store location. Defaults to `s3://{bucket}`.
    pub store_url: Option<String>,

    /// Objects requested per listing page.
    pub page_size: usize,

    /// Pattern a file name must match to be counted.
    pub filename_pattern: String,

    /// Files matching `filename_pattern` but not this one are skipped.
    pub data_extension_pattern: Option<String>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            bucket: "NOT_SET".into(),
            base_path: String::new(),
            prefixes: Vec::new(),
            store_url: None,
            page_size: 1000,
            filename_pattern: r"^[\w-]+\.[\w-]+\.[0-9]+\.json\.gz\.enc$".into(),
            data_extension_pattern: None,
        }
    }
}

impl Source {
    /// Every prefix joined onto the base path.
    ///
    /// ```
    /// # use config::Source;
    /// let source = Source {
    ///     base_path: "exports/2024/".into(),
    ///     prefixes: vec!["main".into(), "/replica".into()],
    ///     ..Default::default()
    /// };
    /// assert_eq!(source.full_prefixes(), ["exports/2024/main", "exports/2024/replica"]);
    /// ```
    pub fn full_prefixes(&self) -> Vec<String> {
        let base = self.base_path.trim_end_matches('/');
        self.prefixes
            .iter()
            .map(|prefix| {
                let prefix = prefix.trim_start_matches('/');
                if base.is_empty() {
                    prefix.to_owned()
                } else {
                    format!("{base}/{prefix}")
                }
            })
            .collect()
    }

    pub fn store_url(&self) -> String {
        self.store_url
            .clone()
            .unwrap_or_else(|| format!("s3://{}", self.bucket))
    }
}
