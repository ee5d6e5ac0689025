use std::collections::BTreeMap;

/// Curated nomenclature overrides: checklist binomial → the trait database's
/// accepted name. Record-level and one-directional; consulted only after the
/// direct and binomial passes have both failed.
///
/// The table is injected from config data, so extending it is a data change,
/// never a code change.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: BTreeMap<String, String>,
}

impl SynonymTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, binomial: &str) -> Option<&str> {
        self.entries.get(binomial).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SynonymTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
