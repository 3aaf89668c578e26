//! Three-state optional value.

/// A persisted entry that distinguishes "never set" from "explicitly cleared".
///
/// In the query string an `Unset` field has no key at all, a `Cleared` field
/// is present with an empty value, and a `Value` carries its serialized form.
/// Both `Unset` and `Cleared` resolve to the field's default on the next
/// mount; the distinction matters for what a shared link shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tristate<T> {
    Unset,
    Cleared,
    Value(T),
}

impl<T> Default for Tristate<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Tristate<T> {
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    #[inline]
    pub fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Borrow the carried value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Cleared => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Cleared => None,
        }
    }

    pub fn as_ref(&self) -> Tristate<&T> {
        match self {
            Self::Unset => Tristate::Unset,
            Self::Cleared => Tristate::Cleared,
            Self::Value(value) => Tristate::Value(value),
        }
    }

    pub fn map<U, F>(self, f: F) -> Tristate<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Unset => Tristate::Unset,
            Self::Cleared => Tristate::Cleared,
            Self::Value(value) => Tristate::Value(f(value)),
        }
    }

    /// Fallible `map`, used when encoding values for persistence.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Tristate<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        Ok(match self {
            Self::Unset => Tristate::Unset,
            Self::Cleared => Tristate::Cleared,
            Self::Value(value) => Tristate::Value(f(value)?),
        })
    }
}
