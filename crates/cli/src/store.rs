#![forbid(unsafe_code)]

use crate::error::Error;
use config::Source;
use object_store::{ObjectStore, prefix::PrefixStore};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Open the object store holding the exports.
///
/// The URL comes from `source.store_url`, falling back to `s3://{bucket}`.
/// A path in the URL becomes the root every listed key is relative to.
/// Backend options such as `AWS_REGION` or `AWS_ACCESS_KEY_ID` are read from
/// the environment.
pub fn open(source: &Source) -> Result<Arc<dyn ObjectStore>, Error> {
    let raw = source.store_url();
    let url = Url::parse(&raw).map_err(|source| Error::StoreUrl {
        url: raw.clone(),
        source,
    })?;

    let options = std::env::vars().map(|(key, value)| (key.to_ascii_lowercase(), value));
    let (store, root) = object_store::parse_url_opts(&url, options)?;
    debug!(%url, %root, "opened object store");

    if root.as_ref().is_empty() {
        Ok(Arc::from(store))
    } else {
        Ok(Arc::new(PrefixStore::new(store, root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioner::inventory::{ListRequest, ObjectLister, ObjectStoreLister};

    fn source(url: &str) -> Source {
        Source {
            store_url: Some(url.into()),
            ..Default::default()
        }
    }

    #[test]
    fn memory_store_opens() {
        assert!(open(&source("memory:///")).is_ok());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(matches!(
            open(&source("not a url")),
            Err(Error::StoreUrl { .. })
        ));
    }

    #[tokio::test]
    async fn file_url_path_becomes_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("main")).unwrap();
        std::fs::write(dir.path().join("main/core.toDo.0001.json.gz.enc"), [0u8; 12]).unwrap();
        let url = Url::from_directory_path(dir.path()).unwrap();

        let lister = ObjectStoreLister::new(open(&source(url.as_str())).unwrap());
        let page = lister
            .list(&ListRequest {
                prefix: "main".into(),
                continuation_token: None,
                max_keys: 10,
            })
            .await
            .unwrap();

        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].key, "main/core.toDo.0001.json.gz.enc");
        assert_eq!(page.objects[0].size, 12);
    }
}
