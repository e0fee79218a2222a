use std::fmt;

use crate::snapshot::Snapshot;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotDigest([u8; 32]);

impl SnapshotDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", self.to_hex())
    }
}

fn update_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Domain-separated BLAKE3 hash: "roadmap\0" || version || length-prefixed fields
pub fn snapshot_digest(snapshot: &Snapshot) -> SnapshotDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"roadmap\0");
    hasher.update(&[2u8]); // document format version
    update_str(&mut hasher, &snapshot.roadmap_name);
    hasher.update(&(snapshot.milestones.len() as u64).to_le_bytes());
    for m in &snapshot.milestones {
        update_str(&mut hasher, m.id.as_deref().unwrap_or_default());
        update_str(&mut hasher, &m.title);
        update_str(&mut hasher, &m.purpose);
        update_str(&mut hasher, &m.current_completion_date);
        update_str(&mut hasher, &m.original_completion_date);
        hasher.update(&(m.items.len() as u64).to_le_bytes());
        for i in &m.items {
            update_str(&mut hasher, i.id.as_deref().unwrap_or_default());
            update_str(&mut hasher, &i.text);
            update_str(&mut hasher, &i.status);
        }
    }
    SnapshotDigest(*hasher.finalize().as_bytes())
}
