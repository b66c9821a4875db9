//! A three-way optional value: absent, explicitly null, or present.
//!
//! Distinguishes "the field was not supplied" from "the field was supplied
//! as null" — a distinction a plain `Option<T>` cannot make, needed when
//! a request patches some fields and nulls out others (§9).

/// `{Absent, Null, Present(v)}` — do not collapse to `Option<T>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Nullable<T> {
    /// The field was not supplied at all.
    Absent,
    /// The field was supplied and explicitly set to null.
    Null,
    /// The field was supplied with a value.
    Present(T),
}

impl<T> Nullable<T> {
    /// `true` for `Present(_)`.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// `true` for `Absent`.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Collapse to `Option<T>`, treating both `Absent` and `Null` as `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }

    /// Apply a patch described by `self` onto `current`.
    ///
    /// `Absent` leaves `current` unchanged; `Null` clears it; `Present`
    /// replaces it.
    pub fn patch(self, current: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *current = None,
            Self::Present(v) => *current = Some(v),
        }
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Self::Present(v),
            None => Self::Null,
        }
    }
}
