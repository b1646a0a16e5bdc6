//! Optional disposal capability.
//!
//! Components opt into disposal by implementing [`Disposable`] and returning
//! `Some(self)` from the `as_disposable()` method of their component trait.
//! Aggregates (bonds, composite properties, validators) query that capability
//! instead of requiring it, and only dispose what they hold when their
//! deep-dispose flag is set.
//!
//! # Failure Modes
//!
//! A failing `dispose()` is propagated immediately by aggregates; disposals
//! that would have followed it are not attempted.

use crate::error::Result;

/// A component holding registrations or resources that must be released
/// explicitly.
pub trait Disposable {
    /// Release registrations and resources held by this component.
    ///
    /// Calling `dispose()` more than once must be harmless.
    fn dispose(&self) -> Result<()>;
}

/// Dispose `component` if it exposes the disposal capability.
pub fn dispose_if(component: Option<&dyn Disposable>) -> Result<()> {
    match component {
        Some(disposable) => disposable.dispose(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VigilError;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<u32>,
    }

    impl Disposable for Counting {
        fn dispose(&self) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    struct Failing;

    impl Disposable for Failing {
        fn dispose(&self) -> Result<()> {
            Err(VigilError::disposal("failing", "refused"))
        }
    }

    #[test]
    fn dispose_if_skips_missing_capability() {
        assert!(dispose_if(None).is_ok());
    }

    #[test]
    fn dispose_if_forwards() {
        let c = Counting {
            calls: Cell::new(0),
        };
        dispose_if(Some(&c)).unwrap();
        assert_eq!(c.calls.get(), 1);
    }

    #[test]
    fn dispose_if_propagates_errors() {
        let err = dispose_if(Some(&Failing)).unwrap_err();
        assert_eq!(err.kind(), "disposal");
    }
}
