//! The key-type registry.
//!
//! A tree is created from the *name* of its key type. The registry maps that
//! name to a [`KeyDescriptor`]: the byte size of the key representation and
//! the functions that compare, normalise, store and print keys of the type.
//! The lookup is pure, so descriptors can be resolved once and shared.
//!
//! Unknown names are not an error. They resolve to [`KeyType::Pointer`],
//! which compares keys by address, so client code may pass the name of any
//! record type and store pointer keys for it.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::format::{format_general, format_long, format_pointer, format_unsigned_long};
use super::key::GenericKey;

// =============================================================================
// Function Table Types
// =============================================================================

/// Three-way comparison of two keys.
pub type CompareFn = fn(&GenericKey, &GenericKey) -> Ordering;

/// Normalises an incoming key to a tree's key representation.
pub type FetchFn = fn(GenericKey) -> GenericKey;

/// Writes the native-endian bytes of a key into a buffer and returns the
/// number of bytes written.
pub type StoreFn = fn(&GenericKey, &mut [u8]) -> usize;

/// Converts a key to its textual form.
pub type ToStringFn = fn(&GenericKey) -> String;

// =============================================================================
// KeyType
// =============================================================================

/// The closed set of key types a tree can be created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyType {
    /// `int` (`i32`)
    Int,
    /// `short` (`i16`)
    Short,
    /// `long` (`i64`)
    Long,
    /// `float` (`f32`)
    Float,
    /// `double` (`f64`)
    Double,
    /// `char`
    Char,
    /// `bool`
    Bool,
    /// `unsigned` (`u32`)
    Unsigned,
    /// `unsigned short` (`u16`)
    UnsignedShort,
    /// `unsigned long` (`u64`)
    UnsignedLong,
    /// `unsigned char` (`u8`)
    UnsignedChar,
    /// `string` or `char *`
    Str,
    /// Any other type: opaque addresses compared by identity.
    Pointer,
}

impl KeyType {
    /// Every key type, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Int,
        Self::Short,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Char,
        Self::Bool,
        Self::Unsigned,
        Self::UnsignedShort,
        Self::UnsignedLong,
        Self::UnsignedChar,
        Self::Str,
        Self::Pointer,
    ];

    /// Resolves a type name.
    ///
    /// Accepts the C spellings (`int`, `unsigned short`, `char *`, `string`,
    /// ...) and the matching Rust spellings (`i32`, `u16`, `&str`, `String`,
    /// ...). Any other name resolves to [`KeyType::Pointer`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::generic::KeyType;
    ///
    /// assert_eq!(KeyType::from_name("unsigned long"), KeyType::UnsignedLong);
    /// assert_eq!(KeyType::from_name("String"), KeyType::Str);
    /// assert_eq!(KeyType::from_name("EventCategory"), KeyType::Pointer);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "int" | "i32" => Self::Int,
            "short" | "i16" => Self::Short,
            "long" | "i64" => Self::Long,
            "float" | "f32" => Self::Float,
            "double" | "f64" => Self::Double,
            "char" => Self::Char,
            "bool" => Self::Bool,
            "unsigned" | "u32" => Self::Unsigned,
            "unsigned short" | "u16" => Self::UnsignedShort,
            "unsigned long" | "u64" => Self::UnsignedLong,
            "unsigned char" | "u8" => Self::UnsignedChar,
            "string" | "char *" | "char*" | "str" | "&str" | "String" => Self::Str,
            _ => Self::Pointer,
        }
    }

    /// Returns the canonical name of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Short => "short",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::Unsigned => "unsigned",
            Self::UnsignedShort => "unsigned short",
            Self::UnsignedLong => "unsigned long",
            Self::UnsignedChar => "unsigned char",
            Self::Str => "string",
            Self::Pointer => "pointer",
        }
    }

    /// Returns the byte size of the key representation.
    ///
    /// Strings and pointers report the size of an address.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int => size_of::<i32>(),
            Self::Short => size_of::<i16>(),
            Self::Long => size_of::<i64>(),
            Self::Float => size_of::<f32>(),
            Self::Double => size_of::<f64>(),
            Self::Char => size_of::<char>(),
            Self::Bool => size_of::<bool>(),
            Self::Unsigned => size_of::<u32>(),
            Self::UnsignedShort => size_of::<u16>(),
            Self::UnsignedLong => size_of::<u64>(),
            Self::UnsignedChar => size_of::<u8>(),
            Self::Str | Self::Pointer => size_of::<usize>(),
        }
    }

    /// Returns the function table for the type.
    #[must_use]
    pub const fn descriptor(self) -> KeyDescriptor {
        let (compare, fetch, to_string): (CompareFn, FetchFn, ToStringFn) = match self {
            Self::Int => (compare_natural, fetch_int, int_to_string),
            Self::Short => (compare_natural, fetch_short, short_to_string),
            Self::Long => (compare_natural, fetch_long, long_to_string),
            Self::Float => (compare_real, fetch_float, float_to_string),
            Self::Double => (compare_real, fetch_double, double_to_string),
            Self::Char => (compare_natural, fetch_char, char_to_string),
            Self::Bool => (compare_natural, fetch_bool, bool_to_string),
            Self::Unsigned => (compare_natural, fetch_unsigned, unsigned_to_string),
            Self::UnsignedShort => (
                compare_natural,
                fetch_unsigned_short,
                unsigned_short_to_string,
            ),
            Self::UnsignedLong => (
                compare_natural,
                fetch_unsigned_long,
                unsigned_long_to_string,
            ),
            Self::UnsignedChar => (
                compare_natural,
                fetch_unsigned_char,
                unsigned_char_to_string,
            ),
            Self::Str => (compare_natural, fetch_identity, string_to_string),
            Self::Pointer => (compare_natural, fetch_identity, pointer_to_string),
        };
        KeyDescriptor {
            key_type: self,
            size: self.size(),
            compare,
            fetch,
            store: store_native,
            to_string,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for KeyType {
    type Err = Infallible;

    /// Same as [`KeyType::from_name`]; never fails.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(name))
    }
}

// =============================================================================
// KeyDescriptor
// =============================================================================

/// Everything a tree needs to handle keys of one type.
///
/// # Examples
///
/// ```rust
/// use cslib::generic::{lookup, GenericKey};
/// use std::cmp::Ordering;
///
/// let descriptor = lookup("short");
/// assert_eq!(descriptor.size, 2);
///
/// // An `i32` argument is narrowed to the tree's representation.
/// let key = (descriptor.fetch)(GenericKey::from(7));
/// assert_eq!(key, GenericKey::from(7_i16));
///
/// let other = (descriptor.fetch)(GenericKey::from(9));
/// assert_eq!((descriptor.compare)(&key, &other), Ordering::Less);
/// assert_eq!((descriptor.to_string)(&key), "7");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct KeyDescriptor {
    /// The resolved key type.
    pub key_type: KeyType,
    /// Byte size of the key representation.
    pub size: usize,
    /// Three-way key comparison.
    pub compare: CompareFn,
    /// Normalisation of incoming keys.
    pub fetch: FetchFn,
    /// Native byte encoding of a key.
    pub store: StoreFn,
    /// Textual form of a key.
    pub to_string: ToStringFn,
}

/// Resolves a key-type name to its descriptor.
///
/// Shorthand for `KeyType::from_name(type_name).descriptor()`.
#[must_use]
pub fn lookup(type_name: &str) -> KeyDescriptor {
    KeyType::from_name(type_name).descriptor()
}

// =============================================================================
// Comparators
// =============================================================================

/// Compares keys with the structural order of [`GenericKey`].
///
/// Used for the integral types, strings (byte-wise, like `strcmp`) and
/// pointers (by address).
#[must_use]
pub fn compare_natural(left: &GenericKey, right: &GenericKey) -> Ordering {
    left.cmp(right)
}

/// Compares floating point keys numerically, so `-0.0 == 0.0`.
///
/// NaN, which has no numeric order, falls back to `total_cmp`.
#[must_use]
pub fn compare_real(left: &GenericKey, right: &GenericKey) -> Ordering {
    match (left, right) {
        (GenericKey::Float(left), GenericKey::Float(right)) => left
            .partial_cmp(right)
            .unwrap_or_else(|| left.total_cmp(right)),
        (GenericKey::Double(left), GenericKey::Double(right)) => left
            .partial_cmp(right)
            .unwrap_or_else(|| left.total_cmp(right)),
        _ => left.cmp(right),
    }
}

// =============================================================================
// Fetch Functions
// =============================================================================

macro_rules! integral_fetch {
    ($($name:ident => $variant:ident as $native:ty),* $(,)?) => {
        $(
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn $name(key: GenericKey) -> GenericKey {
                if let GenericKey::$variant(_) = key {
                    return key;
                }
                match key.integral() {
                    Some(value) => GenericKey::$variant(value as $native),
                    None => key,
                }
            }
        )*
    };
}

integral_fetch! {
    fetch_int => Int as i32,
    fetch_short => Short as i16,
    fetch_long => Long as i64,
    fetch_unsigned => Unsigned as u32,
    fetch_unsigned_short => UnsignedShort as u16,
    fetch_unsigned_long => UnsignedLong as u64,
    fetch_unsigned_char => UnsignedChar as u8,
}

#[allow(clippy::cast_possible_truncation)]
fn fetch_float(key: GenericKey) -> GenericKey {
    if let GenericKey::Float(_) = key {
        return key;
    }
    key.real()
        .map_or(key, |value| GenericKey::Float(value as f32))
}

fn fetch_double(key: GenericKey) -> GenericKey {
    key.real().map_or(key, GenericKey::Double)
}

fn fetch_char(key: GenericKey) -> GenericKey {
    if let GenericKey::Char(_) = key {
        return key;
    }
    let code = key
        .integral()
        .and_then(|value| u32::try_from(value).ok())
        .and_then(char::from_u32);
    code.map_or(key, GenericKey::Char)
}

fn fetch_bool(key: GenericKey) -> GenericKey {
    if let GenericKey::Bool(_) = key {
        return key;
    }
    key.real()
        .map_or(key, |value| GenericKey::Bool(value != 0.0))
}

const fn fetch_identity(key: GenericKey) -> GenericKey {
    key
}

// =============================================================================
// Store Function
// =============================================================================

fn store_native(key: &GenericKey, destination: &mut [u8]) -> usize {
    let mut buffer = [0_u8; 8];
    let bytes: &[u8] = match key {
        GenericKey::Int(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::Short(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::Long(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::Float(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::Double(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::Char(value) => fill(&mut buffer, &u32::from(*value).to_ne_bytes()),
        GenericKey::Bool(value) => fill(&mut buffer, &[u8::from(*value)]),
        GenericKey::Unsigned(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::UnsignedShort(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::UnsignedLong(value) => fill(&mut buffer, &value.to_ne_bytes()),
        GenericKey::UnsignedChar(value) => fill(&mut buffer, &[*value]),
        GenericKey::Str(text) => fill(&mut buffer, &text.as_ptr().addr().to_ne_bytes()),
        GenericKey::Pointer(address) => fill(&mut buffer, &address.to_ne_bytes()),
    };
    let written = bytes.len().min(destination.len());
    destination[..written].copy_from_slice(&bytes[..written]);
    written
}

fn fill<'a>(buffer: &'a mut [u8; 8], bytes: &[u8]) -> &'a [u8] {
    let length = bytes.len().min(buffer.len());
    buffer[..length].copy_from_slice(&bytes[..length]);
    &buffer[..length]
}

// =============================================================================
// To-String Functions
// =============================================================================

// Each converter handles its own variant and defers anything else to the
// converter of the key's own type.

fn int_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Int(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn short_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Short(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn long_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Long(value) => format_long(*value),
        other => other.to_string(),
    }
}

fn float_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Float(value) => format_general(f64::from(*value)),
        other => other.to_string(),
    }
}

fn double_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Double(value) => format_general(*value),
        other => other.to_string(),
    }
}

fn char_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Char(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn bool_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn unsigned_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Unsigned(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn unsigned_short_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::UnsignedShort(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn unsigned_long_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::UnsignedLong(value) => format_unsigned_long(*value),
        other => other.to_string(),
    }
}

fn unsigned_char_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::UnsignedChar(value) => char::from(*value).to_string(),
        other => other.to_string(),
    }
}

fn string_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Str(text) => text.to_string(),
        other => other.to_string(),
    }
}

fn pointer_to_string(key: &GenericKey) -> String {
    match key {
        GenericKey::Pointer(address) => format_pointer(*address),
        other => other.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int", KeyType::Int)]
    #[case("short", KeyType::Short)]
    #[case("long", KeyType::Long)]
    #[case("float", KeyType::Float)]
    #[case("double", KeyType::Double)]
    #[case("char", KeyType::Char)]
    #[case("bool", KeyType::Bool)]
    #[case("unsigned", KeyType::Unsigned)]
    #[case("unsigned short", KeyType::UnsignedShort)]
    #[case("unsigned long", KeyType::UnsignedLong)]
    #[case("unsigned char", KeyType::UnsignedChar)]
    #[case("char *", KeyType::Str)]
    #[case("string", KeyType::Str)]
    #[case("u64", KeyType::UnsignedLong)]
    #[case("&str", KeyType::Str)]
    fn test_from_name_recognises_known_types(#[case] name: &str, #[case] expected: KeyType) {
        assert_eq!(KeyType::from_name(name), expected);
    }

    #[rstest]
    #[case("Event")]
    #[case("")]
    #[case("INT")]
    #[case("unsigned  short")]
    fn test_from_name_falls_back_to_pointer(#[case] name: &str) {
        assert_eq!(KeyType::from_name(name), KeyType::Pointer);
        assert_eq!(name.parse::<KeyType>(), Ok(KeyType::Pointer));
    }

    #[rstest]
    fn test_canonical_names_round_trip() {
        for key_type in KeyType::ALL {
            if key_type != KeyType::Pointer {
                assert_eq!(KeyType::from_name(key_type.name()), key_type);
            }
        }
    }

    #[rstest]
    fn test_descriptor_reports_type_and_size() {
        let descriptor = lookup("unsigned short");
        assert_eq!(descriptor.key_type, KeyType::UnsignedShort);
        assert_eq!(descriptor.size, 2);
        assert_eq!(lookup("string").size, size_of::<usize>());
    }

    #[rstest]
    fn test_fetch_narrows_integers_like_a_c_cast() {
        let fetch = lookup("unsigned char").fetch;
        assert_eq!(fetch(GenericKey::from(300)), GenericKey::UnsignedChar(44));

        let fetch = lookup("short").fetch;
        assert_eq!(fetch(GenericKey::from(70_000)), GenericKey::Short(4464));
    }

    #[rstest]
    fn test_fetch_converts_between_numeric_families() {
        assert_eq!(
            (lookup("double").fetch)(GenericKey::from(3)),
            GenericKey::Double(3.0)
        );
        assert_eq!(
            (lookup("int").fetch)(GenericKey::from(3.75)),
            GenericKey::Int(3)
        );
        assert_eq!(
            (lookup("char").fetch)(GenericKey::from(65)),
            GenericKey::Char('A')
        );
        assert_eq!(
            (lookup("bool").fetch)(GenericKey::from(2)),
            GenericKey::Bool(true)
        );
    }

    #[rstest]
    #[case("float", GenericKey::from(2), GenericKey::Float(2.0))]
    #[case("double", GenericKey::from(0.5_f32), GenericKey::Double(0.5))]
    #[case("bool", GenericKey::from(0), GenericKey::Bool(false))]
    #[case("bool", GenericKey::from(-0.25), GenericKey::Bool(true))]
    #[case("float", GenericKey::from("x"), GenericKey::from("x"))]
    #[case("double", GenericKey::from("x"), GenericKey::from("x"))]
    #[case("bool", GenericKey::from("x"), GenericKey::from("x"))]
    fn test_fetch_into_real_and_bool_types(
        #[case] type_name: &str,
        #[case] key: GenericKey,
        #[case] expected: GenericKey,
    ) {
        assert_eq!((lookup(type_name).fetch)(key), expected);
    }

    #[rstest]
    fn test_fetch_leaves_unconvertible_keys_alone() {
        let key = GenericKey::from("seven");
        assert_eq!((lookup("int").fetch)(key.clone()), key);
        let negative = GenericKey::from(-1);
        assert_eq!((lookup("char").fetch)(negative.clone()), negative);
    }

    #[rstest]
    fn test_compare_real_treats_signed_zeros_as_equal() {
        let compare = lookup("double").compare;
        assert_eq!(
            compare(&GenericKey::from(-0.0_f64), &GenericKey::from(0.0_f64)),
            Ordering::Equal
        );
        assert_eq!(
            compare(&GenericKey::from(1.5_f64), &GenericKey::from(f64::NAN)),
            Ordering::Less
        );
    }

    #[rstest]
    fn test_pointer_keys_compare_by_address() {
        let compare = lookup("Event").compare;
        assert_eq!(
            compare(&GenericKey::Pointer(0x10), &GenericKey::Pointer(0x20)),
            Ordering::Less
        );
    }

    #[rstest]
    fn test_store_writes_native_bytes() {
        let store = lookup("int").store;
        let mut destination = [0_u8; 8];
        let written = store(&GenericKey::from(0x0102_0304), &mut destination);
        assert_eq!(written, 4);
        assert_eq!(&destination[..4], &0x0102_0304_i32.to_ne_bytes());
    }

    #[rstest]
    fn test_store_truncates_to_destination() {
        let store = lookup("long").store;
        let mut destination = [0_u8; 2];
        assert_eq!(store(&GenericKey::from(-1_i64), &mut destination), 2);
        assert_eq!(destination, [0xFF, 0xFF]);
    }

    #[rstest]
    #[case("int", GenericKey::from(-12), "-12")]
    #[case("short", GenericKey::from(5_i16), "5")]
    #[case("long", GenericKey::from(5_i64), "5L")]
    #[case("float", GenericKey::from(2.5_f32), "2.5")]
    #[case("double", GenericKey::from(1e-7_f64), "1e-07")]
    #[case("char", GenericKey::from('q'), "q")]
    #[case("bool", GenericKey::from(true), "true")]
    #[case("unsigned", GenericKey::from(9_u32), "9")]
    #[case("unsigned short", GenericKey::from(9_u16), "9")]
    #[case("unsigned long", GenericKey::from(9_u64), "9L")]
    #[case("unsigned char", GenericKey::from(b'z'), "z")]
    #[case("string", GenericKey::from("name"), "name")]
    #[case("Event", GenericKey::Pointer(0xAB), "0xAB")]
    fn test_to_string_formats(
        #[case] type_name: &str,
        #[case] key: GenericKey,
        #[case] expected: &str,
    ) {
        assert_eq!((lookup(type_name).to_string)(&key), expected);
    }

    #[rstest]
    fn test_to_string_of_foreign_variant_uses_its_own_format() {
        assert_eq!((lookup("int").to_string)(&GenericKey::from("x")), "x");
    }
}
