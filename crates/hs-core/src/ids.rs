use core::fmt;

/// External identifier assigned by the static network model.
///
/// Statistics tables are keyed by result-store positions; `ModelId` is the
/// other id scheme, owned by the metadata side. The two only meet inside an
/// id->index map built once per element family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModelId(i64);

impl ModelId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelId({})", self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 0-based position in one of the result store's element axes
/// (node axis, flowline axis or pump axis).
pub type ElementIndex = usize;
