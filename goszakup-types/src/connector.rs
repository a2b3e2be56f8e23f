//! Upstream client identity usable across crates.

/// Typed key identifying an upstream client, for use in health-flag maps and
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientKey(pub &'static str);

impl ClientKey {
    /// Construct a new typed client key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<ClientKey> for &'static str {
    fn from(k: ClientKey) -> Self {
        k.0
    }
}

impl core::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}
