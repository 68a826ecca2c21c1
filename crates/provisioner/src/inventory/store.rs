#![forbid(unsafe_code)]

use crate::inventory::{ListError, ListPage, ListRequest, ObjectLister, ObjectSummary};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::{ObjectMeta, ObjectStore, path::Path};
use std::sync::Arc;
use tracing::trace;

/// Pages through any [`ObjectStore`] (S3, local filesystem, in-memory).
///
/// The last key of a page is the continuation token; the next page starts
/// strictly after it. This relies on the backend listing keys in
/// lexicographic order, which S3 and the in-memory store do.
#[derive(Debug, Clone)]
pub struct ObjectStoreLister {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreLister {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ObjectLister for ObjectStoreLister {
    async fn list(&self, request: &ListRequest) -> Result<ListPage, ListError> {
        let prefix = Path::from(request.prefix.as_str());
        let prefix = (!request.prefix.is_empty()).then_some(&prefix);
        let stream = match request.continuation_token.as_deref() {
            Some(token) => self.store.list_with_offset(prefix, &Path::from(token)),
            None => self.store.list(prefix),
        };

        let max_keys = request.max_keys.max(1);
        // one extra entry tells us whether another page follows
        let mut metas: Vec<ObjectMeta> = stream
            .take(max_keys + 1)
            .try_collect()
            .await
            .map_err(classify)?;

        let is_truncated = metas.len() > max_keys;
        metas.truncate(max_keys);
        let next_token = is_truncated
            .then(|| metas.last().map(|meta| meta.location.to_string()))
            .flatten();

        trace!(prefix = %request.prefix, objects = metas.len(), is_truncated, "listed page");

        Ok(ListPage {
            objects: metas
                .into_iter()
                .map(|meta| ObjectSummary::new(meta.location.to_string(), meta.size as u64))
                .collect(),
            next_token,
            is_truncated,
        })
    }
}

fn classify(err: object_store::Error) -> ListError {
    use object_store::Error as E;
    match &err {
        E::NotFound { .. }
        | E::InvalidPath { .. }
        | E::NotSupported { .. }
        | E::NotImplemented
        | E::PermissionDenied { .. }
        | E::Unauthenticated { .. }
        | E::UnknownConfigurationKey { .. } => ListError::Permanent(err.to_string()),
        _ => ListError::Transient(err.to_string()),
    }
}
