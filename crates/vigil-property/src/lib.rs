#![forbid(unsafe_code)]

//! Observable properties for Vigil.
//!
//! A property is a value cell whose listeners hear about every effective
//! change. [`SimpleProperty`] is the basic cell; [`Bond`] keeps a slave in
//! sync with a master through a transformer; the composites aggregate
//! (readable) or broadcast (writable) over several sub-properties.
//!
//! Everything here is single-threaded: properties share state through `Rc`
//! and interior mutability and are not `Send`.

pub mod bond;
pub mod composite;
pub mod equality;
pub mod property;
pub mod simple;
pub mod support;

pub use bond::Bond;
pub use composite::{CompositeReadableProperty, CompositeWritableProperty};
pub use equality::{is_nan_value, values_equal};
pub use property::{ReadableProperty, ReadableWritableProperty, WritableProperty};
pub use simple::{ReadOnlyProperty, SimpleProperty};
pub use support::{PropertyListener, PropertySupport};
