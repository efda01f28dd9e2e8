//! Interface version pair

use serde::{Deserialize, Serialize};
use std::fmt;

/// `AVS_INTERFACE_VERSION` of the headers this binding was written against
pub const INTERFACE_VERSION: i32 = 11;

/// `AVISYNTHPLUS_INTERFACE_BUGFIX_VERSION` of the same headers
pub const INTERFACE_BUGFIX_VERSION: i32 = 0;

/// A (major, bugfix) interface version.
///
/// Ordering is major first, then bugfix, which is the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterfaceVersion {
    /// Interface version (`AVS_INTERFACE_VERSION`)
    pub major: i32,
    /// Bugfix level within the interface version
    #[serde(default)]
    pub bugfix: i32,
}

impl InterfaceVersion {
    /// The version this binding was built against
    pub const CURRENT: InterfaceVersion = InterfaceVersion::new(INTERFACE_VERSION, INTERFACE_BUGFIX_VERSION);

    pub const fn new(major: i32, bugfix: i32) -> Self {
        Self { major, bugfix }
    }

    /// Whether a host at `self` satisfies a request for `requested`.
    ///
    /// A higher major always satisfies; an equal major needs an equal or
    /// higher bugfix.
    pub fn satisfies(&self, requested: &InterfaceVersion) -> bool {
        self >= requested
    }
}

impl Default for InterfaceVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.bugfix)
    }
}
