//! Identity renaming for repeat clones.
//!
//! A clone of a repeat template carries copies of the template's element
//! identities. Before it is inserted every identity gets a per-entry suffix
//! so that clones never collide with the template or with each other.

use lien_carton::{CompactString, FxHashMap};

/// Old identity → new identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Renaming {
    map: FxHashMap<CompactString, CompactString>,
}

impl Renaming {
    #[inline]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|new| new.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn insert(&mut self, old: impl Into<CompactString>, new: impl Into<CompactString>) {
        self.map.insert(old.into(), new.into());
    }
}

/// The suffix a clone for `key` gets
pub fn clone_suffix(key: &str) -> CompactString {
    let mut suffix = CompactString::new("_clone_");
    suffix.push_str(key);
    suffix
}

/// Rename every identity in `ids` by appending `suffix`
pub fn suffix_identities<'a>(
    ids: impl IntoIterator<Item = &'a CompactString>,
    suffix: &str,
) -> Renaming {
    let mut renaming = Renaming::default();
    for id in ids {
        let mut renamed = id.clone();
        renamed.push_str(suffix);
        renaming.insert(id.clone(), renamed);
    }
    renaming
}
