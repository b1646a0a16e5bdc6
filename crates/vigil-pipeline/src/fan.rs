//! Values crossing a mapping boundary.

use std::slice;

/// A value handed across a fan point of the pipeline.
///
/// An `EACH_TO_EACH` stage produces one [`Fan::Each`] per source; an
/// `ALL_TO_EACH` stage gathers every source into a single [`Fan::All`],
/// preserving registration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fan<T> {
    Each(T),
    All(Vec<T>),
}

impl<T> Fan<T> {
    /// Number of carried values: 1 for `Each`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Only an empty `All` is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All(_))
    }

    /// Carried values as a slice, in order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Each(value) => slice::from_ref(value),
            Self::All(values) => values,
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// The single value of an `Each`.
    #[must_use]
    pub fn as_each(&self) -> Option<&T> {
        match self {
            Self::Each(value) => Some(value),
            Self::All(_) => None,
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Each(value) => vec![value],
            Self::All(values) => values,
        }
    }

    /// Apply `f` to every carried value, keeping the variant.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Fan<U> {
        match self {
            Self::Each(value) => Fan::Each(f(value)),
            Self::All(values) => Fan::All(values.into_iter().map(f).collect()),
        }
    }
}

impl<T> IntoIterator for Fan<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Fan<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
