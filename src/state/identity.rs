use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PASS: AtomicU64 = AtomicU64::new(1);

/// Identifies one analysis pass over one screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PassId(pub u64);

impl PassId {
    /// Allocate a fresh pass id. Only passes are numbered process-wide;
    /// element ordinals restart at zero inside every pass.
    pub fn next() -> Self {
        PassId(NEXT_PASS.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass-{}", self.0)
    }
}

/// Element identity: unique within a pass and never equal to an id from
/// another pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId {
    pub pass: PassId,
    pub ordinal: u32,
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/element-{}", self.pass, self.ordinal)
    }
}

/// Pass-local id allocator.
#[derive(Debug)]
pub struct ElementSequence {
    pass: PassId,
    next: u32,
}

impl ElementSequence {
    pub fn new(pass: PassId) -> Self {
        Self { pass, next: 0 }
    }

    pub fn pass(&self) -> PassId {
        self.pass
    }

    pub fn next_id(&mut self) -> ElementId {
        let id = ElementId {
            pass: self.pass,
            ordinal: self.next,
        };
        self.next += 1;
        id
    }
}

/// SHA-1 over the dimensions and intensity bytes, used to recognize repeated
/// captures of the same screen. Pass the unsmoothed intensity image so the
/// value stays stable across blur settings.
pub fn image_fingerprint(width: u32, height: u32, pixels: &[u8]) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(pixels);
    format!("{:x}", hasher.finalize())
}
