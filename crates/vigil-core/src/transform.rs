//! Pure, chainable mapping functions.
//!
//! A [`Transformer<I, O>`] maps an input to an output without side effects.
//! Any `Fn(I) -> O` closure is a transformer. Transformers compose with
//! [`TransformerExt::chain`], which produces a new transformer whose output
//! type is the output type of the second step.
//!
//! # Usage
//!
//! ```
//! use vigil_core::{Transformer, TransformerExt};
//!
//! let trim = |s: String| s.trim().to_string();
//! let length = |s: String| s.len();
//! let chained = trim.chain(length);
//! assert_eq!(chained.transform("  abc ".to_string()), 3);
//! ```
//!
//! # Invariants
//!
//! 1. `a.chain(b).transform(x) == b.transform(a.transform(x))`.
//! 2. Transformers never retain the values they map.

use std::fmt;
use std::marker::PhantomData;

use crate::dispose::{Disposable, dispose_if};
use crate::error::Result;

/// A pure function from `I` to `O`.
pub trait Transformer<I, O> {
    /// Map `input` to an output value.
    fn transform(&self, input: I) -> O;

    /// Disposal capability, if this transformer holds anything to release.
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

impl<I, O, F> Transformer<I, O> for F
where
    F: Fn(I) -> O,
{
    fn transform(&self, input: I) -> O {
        self(input)
    }
}

/// Composition helpers available on every transformer.
pub trait TransformerExt<I, O>: Transformer<I, O> + Sized {
    /// Run `self`, then feed its output to `next`.
    fn chain<P, N>(self, next: N) -> Chained<Self, N, O>
    where
        N: Transformer<O, P>,
    {
        Chained::new::<I, P>(self, next)
    }
}

impl<I, O, T: Transformer<I, O>> TransformerExt<I, O> for T {}

// ---------------------------------------------------------------------------
// Chained
// ---------------------------------------------------------------------------

type StepCapabilities<A, B> = for<'a> fn(&'a A, &'a B) -> [Option<&'a dyn Disposable>; 2];

fn step_capabilities<'a, I, M, O, A, B>(
    first: &'a A,
    second: &'a B,
) -> [Option<&'a dyn Disposable>; 2]
where
    A: Transformer<I, M>,
    B: Transformer<M, O>,
{
    [first.as_disposable(), second.as_disposable()]
}

/// Two transformers run back to back; `M` is the intermediate type.
///
/// The chain is disposable when either step is. Disposing it disposes the
/// first step, then the second.
pub struct Chained<A, B, M> {
    first: A,
    second: B,
    capabilities: StepCapabilities<A, B>,
    _mid: PhantomData<fn() -> M>,
}

impl<A, B, M> Chained<A, B, M> {
    /// Compose `first` then `second`.
    pub fn new<I, O>(first: A, second: B) -> Self
    where
        A: Transformer<I, M>,
        B: Transformer<M, O>,
    {
        Self {
            first,
            second,
            capabilities: step_capabilities::<I, M, O, A, B>,
            _mid: PhantomData,
        }
    }

    /// The first step of the chain.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The second step of the chain.
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<I, M, O, A, B> Transformer<I, O> for Chained<A, B, M>
where
    A: Transformer<I, M>,
    B: Transformer<M, O>,
{
    fn transform(&self, input: I) -> O {
        self.second.transform(self.first.transform(input))
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        let [first, second] = (self.capabilities)(&self.first, &self.second);
        if first.is_some() || second.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl<A, B, M> Disposable for Chained<A, B, M> {
    fn dispose(&self) -> Result<()> {
        for step in (self.capabilities)(&self.first, &self.second) {
            dispose_if(step)?;
        }
        Ok(())
    }
}

impl<A, B, M> fmt::Debug for Chained<A, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chained")
            .field("intermediate", &std::any::type_name::<M>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Stock transformers
// ---------------------------------------------------------------------------

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<T> Transformer<T, T> for Identity {
    fn transform(&self, input: T) -> T {
        input
    }
}

/// Applies an element transformer to every element of a `Vec`, keeping order.
#[derive(Debug, Clone, Default)]
pub struct MapEach<T> {
    element: T,
}

impl<T> MapEach<T> {
    /// Wrap an element transformer.
    pub fn new(element: T) -> Self {
        Self { element }
    }
}

impl<I, O, T> Transformer<Vec<I>, Vec<O>> for MapEach<T>
where
    T: Transformer<I, O>,
{
    fn transform(&self, input: Vec<I>) -> Vec<O> {
        input
            .into_iter()
            .map(|item| self.element.transform(item))
            .collect()
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        self.element.as_disposable()
    }
}

/// Formats its input with [`ToString`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToStringTransformer;

impl<T: ToString> Transformer<T, String> for ToStringTransformer {
    fn transform(&self, input: T) -> String {
        input.to_string()
    }
}

/// Logical negation. `None` stays `None` for optional booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegateBooleanTransformer;

impl Transformer<bool, bool> for NegateBooleanTransformer {
    fn transform(&self, input: bool) -> bool {
        !input
    }
}

impl Transformer<Option<bool>, Option<bool>> for NegateBooleanTransformer {
    fn transform(&self, input: Option<bool>) -> Option<bool> {
        input.map(|b| !b)
    }
}
