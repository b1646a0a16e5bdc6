#![forbid(unsafe_code)]

//! Core building blocks shared by every Vigil crate.
//!
//! - [`Transformer`] and its combinators: pure, chainable mapping functions.
//! - [`Disposable`]: the optional disposal capability that aggregates query
//!   through `as_disposable()`.
//! - [`VigilError`] and the crate-wide [`Result`] alias.

pub mod dispose;
pub mod error;
pub mod transform;

pub use dispose::{Disposable, dispose_if};
pub use error::{BoxError, Result, VigilError};
pub use transform::{
    Chained, Identity, MapEach, NegateBooleanTransformer, ToStringTransformer, Transformer,
    TransformerExt,
};
