use dashmap::DashSet;

use super::types::Fingerprint;

/// Tracks fingerprints that are queued or being processed. Insert and remove
/// are atomic, so a fingerprint can never be admitted twice concurrently.
pub struct InflightSet {
    entries: DashSet<Fingerprint>,
}

impl InflightSet {
    pub fn new() -> Self {
        Self {
            entries: DashSet::new(),
        }
    }

    /// Atomic test-and-insert. Returns false when the fingerprint was
    /// already in flight.
    pub fn try_insert(&self, fingerprint: Fingerprint) -> bool {
        self.entries.insert(fingerprint)
    }

    pub fn remove(&self, fingerprint: &Fingerprint) {
        self.entries.remove(fingerprint);
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InflightSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_insert_of_same_fingerprint_is_rejected() {
        let set = InflightSet::new();
        let fp = Fingerprint::new("acct", "msg");

        assert!(set.try_insert(fp.clone()));
        assert!(!set.try_insert(fp.clone()));
        assert!(set.contains(&fp));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_frees_the_fingerprint_for_reinsertion() {
        let set = InflightSet::new();
        let fp = Fingerprint::new("acct", "msg");

        assert!(set.try_insert(fp.clone()));
        set.remove(&fp);
        assert!(!set.contains(&fp));
        assert!(set.try_insert(fp));
    }
}
