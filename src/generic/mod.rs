//! Polymorphic keys.
//!
//! Trees in this crate do not take a key type parameter. Instead every key is
//! a [`GenericKey`], and a tree is created from the name of a key type. The
//! key-type registry turns that name into a [`KeyDescriptor`], the function
//! table used for every later comparison, normalisation and conversion.
//!
//! # Examples
//!
//! ```rust
//! use cslib::generic::{lookup, GenericKey, KeyType};
//!
//! let descriptor = lookup("long");
//! assert_eq!(descriptor.key_type, KeyType::Long);
//!
//! let key = (descriptor.fetch)(GenericKey::from(10));
//! assert_eq!((descriptor.to_string)(&key), "10L");
//! ```

mod format;
mod key;
mod registry;

pub use format::format_general;
pub use key::GenericKey;
pub use registry::{
    CompareFn, FetchFn, KeyDescriptor, KeyType, StoreFn, ToStringFn, compare_natural, compare_real,
    lookup,
};
