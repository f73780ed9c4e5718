use std::borrow::Cow;
use std::fmt;

/// Opaque key naming a queued asset.
///
/// Ids are usually declared as constants next to the code that queues them:
///
/// ```
/// use vitrine_engine::assets::AssetId;
///
/// const GLASS: AssetId = AssetId::from_static("texture-glass");
/// assert_eq!(GLASS.as_str(), "texture-glass");
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AssetId(Cow<'static, str>);

impl AssetId {
    #[inline]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for AssetId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn static_and_owned_ids_are_interchangeable_keys() {
        let mut set = HashSet::new();
        set.insert(AssetId::from_static("hdr"));
        assert!(set.contains(&AssetId::new("hdr".to_string())));
    }
}
