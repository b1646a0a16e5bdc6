//! Pull-based value sources.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use vigil_core::{Disposable, Result, Transformer, dispose_if};

/// Supplies the current value to validate. Queried on every pipeline run.
///
/// Any `Fn() -> T` closure is a data provider.
pub trait DataProvider<T> {
    fn data(&self) -> T;

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

impl<T, F> DataProvider<T> for F
where
    F: Fn() -> T,
{
    fn data(&self) -> T {
        self()
    }
}

/// Data provider whose value passes through a transformer.
///
/// This is how a type change happens before the fan point, e.g. a text field
/// provider turned into a parsed number.
pub struct TransformedDataProvider<I: 'static, O: 'static> {
    provider: Rc<dyn DataProvider<I>>,
    transformer: Rc<dyn Transformer<I, O>>,
    deep_dispose: Cell<bool>,
}

impl<I: 'static, O: 'static> fmt::Debug for TransformedDataProvider<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformedDataProvider")
            .field("deep_dispose", &self.deep_dispose.get())
            .finish_non_exhaustive()
    }
}

impl<I: 'static, O: 'static> TransformedDataProvider<I, O> {
    pub fn new(provider: Rc<dyn DataProvider<I>>, transformer: Rc<dyn Transformer<I, O>>) -> Self {
        Self {
            provider,
            transformer,
            deep_dispose: Cell::new(false),
        }
    }

    /// Whether `dispose()` also disposes the wrapped provider.
    pub fn set_deep_dispose(&self, deep: bool) {
        self.deep_dispose.set(deep);
    }
}

impl<I: 'static, O: 'static> DataProvider<O> for TransformedDataProvider<I, O> {
    fn data(&self) -> O {
        self.transformer.transform(self.provider.data())
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl<I: 'static, O: 'static> Disposable for TransformedDataProvider<I, O> {
    /// Disposes the transformer; with deep dispose, the provider first.
    fn dispose(&self) -> Result<()> {
        if self.deep_dispose.get() {
            dispose_if(self.provider.as_disposable())?;
        }
        dispose_if(self.transformer.as_disposable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn closures_are_providers() {
        let counter = Cell::new(0);
        let provider = || {
            counter.set(counter.get() + 1);
            counter.get()
        };
        assert_eq!(provider.data(), 1);
        assert_eq!(provider.data(), 2);
    }

    #[test]
    fn transformed_provider_converts_on_every_read() {
        let text = Rc::new(RefCell::new(String::from("12")));
        let t = Rc::clone(&text);
        let provider = TransformedDataProvider::new(
            Rc::new(move || t.borrow().clone()),
            Rc::new(|s: String| s.trim().parse::<i64>().ok()),
        );
        assert_eq!(provider.data(), Some(12));
        *text.borrow_mut() = "x".into();
        assert_eq!(provider.data(), None);
    }

    #[test]
    fn deep_dispose_reaches_provider() {
        struct Source {
            disposed: Cell<bool>,
        }
        impl DataProvider<u8> for Source {
            fn data(&self) -> u8 {
                1
            }
            fn as_disposable(&self) -> Option<&dyn Disposable> {
                Some(self)
            }
        }
        impl Disposable for Source {
            fn dispose(&self) -> Result<()> {
                self.disposed.set(true);
                Ok(())
            }
        }

        let source = Rc::new(Source {
            disposed: Cell::new(false),
        });
        let provider = TransformedDataProvider::new(source.clone(), Rc::new(|n: u8| n + 1));
        provider.dispose().unwrap();
        assert!(!source.disposed.get());

        provider.set_deep_dispose(true);
        provider.dispose().unwrap();
        assert!(source.disposed.get());
    }
}
