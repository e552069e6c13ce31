//! The file-backed provider: one `content/<kind>/<slug>.md` file per
//! record, re-enumerated and re-decoded on every listing call.

use crate::error::Result;
use crate::provider::Provider;
use crate::record::{self, EntityMeta, Record};
use crate::store::SlugStore;
use std::marker::PhantomData;
use std::path::Path;

pub struct FileProvider<M> {
    store: SlugStore,
    _meta: PhantomData<M>,
}

impl<M: EntityMeta> FileProvider<M> {
    pub fn new(content_root: &Path) -> Self {
        FileProvider {
            store: SlugStore::new(content_root, M::KIND),
            _meta: PhantomData,
        }
    }

    pub fn store(&self) -> &SlugStore {
        &self.store
    }
}

impl<M: EntityMeta> Provider<M> for FileProvider<M> {
    fn slugs(&self) -> Result<Vec<String>> {
        self.store.list_slugs()
    }

    fn exists(&self, slug: &str) -> Result<bool> {
        Ok(self.store.exists(slug))
    }

    fn fetch(&self, slug: &str) -> Result<Record<M>> {
        let raw = self.store.read(slug)?;
        record::decode(slug, &raw)
    }

    fn fetch_all(&self) -> Result<Vec<Record<M>>> {
        let mut records = Vec::new();
        for slug in self.store.list_slugs()? {
            match self.fetch(&slug) {
                Ok(record) => records.push(record),
                Err(e) => {
                    log::warn!("Skipping {}/{slug}: {e}", M::KIND);
                }
            }
        }
        Ok(records)
    }

    fn put(&self, slug: &str, meta: &M, body: &str) -> Result<()> {
        let contents = record::encode(meta, body)?;
        self.store.write(slug, &contents)
    }

    fn remove(&self, slug: &str) -> Result<()> {
        self.store.delete(slug)
    }

    fn rename(&self, old_slug: &str, new_slug: &str, meta: &M, body: &str) -> Result<()> {
        let contents = record::encode(meta, body)?;
        self.store.rename(old_slug, new_slug, &contents)
    }
}
