use std::collections::BTreeMap;
use std::fmt;

use crate::assets::decode::PreparedImage;

/// Handle to a locally-derived image held by a [`LocalImageStore`].
///
/// The handle stays valid until the store releases it; afterwards [`LocalImageStore::resolve`]
/// returns `None` for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalImageRef {
    id: u64,
    url: String,
}

impl LocalImageRef {
    /// Store-unique id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Displayable reference, `local:<file name>#<id>`.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for LocalImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Owner of decoded user-picked images.
///
/// Ids are never reused, so a released handle cannot accidentally resolve to a newer image.
#[derive(Debug, Default)]
pub struct LocalImageStore {
    next_id: u64,
    entries: BTreeMap<u64, PreparedImage>,
}

impl LocalImageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `image` and hand out a fresh reference to it.
    pub fn register(&mut self, name: &str, image: PreparedImage) -> LocalImageRef {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(id, image);
        LocalImageRef {
            id,
            url: format!("local:{name}#{id}"),
        }
    }

    /// Look up a live reference.
    pub fn resolve(&self, r: &LocalImageRef) -> Option<&PreparedImage> {
        self.entries.get(&r.id)
    }

    /// Revoke `r`. Returns `false` if it was already released.
    pub fn release(&mut self, r: &LocalImageRef) -> bool {
        let released = self.entries.remove(&r.id).is_some();
        if released {
            tracing::debug!(reference = %r, "released local image");
        }
        released
    }

    /// Number of outstanding references.
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}
