//! The tagged key representation stored in tree nodes.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::registry::KeyType;
use crate::ReferenceCounter;
use crate::error::KeyConversionError;

// =============================================================================
// GenericKey Definition
// =============================================================================

/// A key value in one of the representations the tree understands.
///
/// Each variant corresponds to one [`KeyType`]. Values are stored by value in
/// tree nodes; string keys are reference counted so copying a key (for
/// example when cloning a tree) never copies the string data.
///
/// `GenericKey` has a total structural order (`Ord`): keys of different
/// variants are ordered by variant, keys of the same variant by value, and
/// floating point values with `total_cmp`. The per-type comparators of the
/// registry refine this order for their own type and fall back to it for
/// anything else.
///
/// # Examples
///
/// ```rust
/// use cslib::generic::{GenericKey, KeyType};
///
/// let key = GenericKey::from(42);
/// assert_eq!(key.key_type(), KeyType::Int);
/// assert_eq!(i32::try_from(&key), Ok(42));
///
/// let name = GenericKey::from("alpha");
/// assert_eq!(name.as_str(), Some("alpha"));
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenericKey {
    /// `int`
    Int(i32),
    /// `short`
    Short(i16),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `char`
    Char(char),
    /// `bool`
    Bool(bool),
    /// `unsigned`
    Unsigned(u32),
    /// `unsigned short`
    UnsignedShort(u16),
    /// `unsigned long`
    UnsignedLong(u64),
    /// `unsigned char`
    UnsignedChar(u8),
    /// `string` / `char *`
    Str(ReferenceCounter<str>),
    /// An opaque address, compared by identity.
    Pointer(usize),
}

impl GenericKey {
    /// Creates a pointer key from the address of `reference`.
    ///
    /// Two pointer keys compare equal exactly when they were created from
    /// the same address.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::generic::GenericKey;
    ///
    /// let record = String::from("event");
    /// let first = GenericKey::from_ptr(&record);
    /// let second = GenericKey::from_ptr(&record);
    /// assert_eq!(first, second);
    /// ```
    #[must_use]
    pub fn from_ptr<T: ?Sized>(reference: &T) -> Self {
        Self::Pointer(std::ptr::from_ref(reference).cast::<()>().addr())
    }

    /// Returns the key type this value belongs to.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        match self {
            Self::Int(_) => KeyType::Int,
            Self::Short(_) => KeyType::Short,
            Self::Long(_) => KeyType::Long,
            Self::Float(_) => KeyType::Float,
            Self::Double(_) => KeyType::Double,
            Self::Char(_) => KeyType::Char,
            Self::Bool(_) => KeyType::Bool,
            Self::Unsigned(_) => KeyType::Unsigned,
            Self::UnsignedShort(_) => KeyType::UnsignedShort,
            Self::UnsignedLong(_) => KeyType::UnsignedLong,
            Self::UnsignedChar(_) => KeyType::UnsignedChar,
            Self::Str(_) => KeyType::Str,
            Self::Pointer(_) => KeyType::Pointer,
        }
    }

    /// Returns the string contents of a `Str` key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(&**text),
            _ => None,
        }
    }

    /// Returns the address held by a `Pointer` key.
    #[must_use]
    pub const fn as_pointer(&self) -> Option<usize> {
        match self {
            Self::Pointer(address) => Some(*address),
            _ => None,
        }
    }

    /// Returns the value of an integral key (integers, `bool`, `char`) or the
    /// truncated value of a floating point key.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn integral(&self) -> Option<i128> {
        match self {
            Self::Int(value) => Some(i128::from(*value)),
            Self::Short(value) => Some(i128::from(*value)),
            Self::Long(value) => Some(i128::from(*value)),
            Self::Unsigned(value) => Some(i128::from(*value)),
            Self::UnsignedShort(value) => Some(i128::from(*value)),
            Self::UnsignedLong(value) => Some(i128::from(*value)),
            Self::UnsignedChar(value) => Some(i128::from(*value)),
            Self::Char(value) => Some(i128::from(u32::from(*value))),
            Self::Bool(value) => Some(i128::from(*value)),
            Self::Float(value) => Some(*value as i128),
            Self::Double(value) => Some(*value as i128),
            Self::Str(_) | Self::Pointer(_) => None,
        }
    }

    /// Returns any numeric key widened to `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn real(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(f64::from(*value)),
            Self::Double(value) => Some(*value),
            other => other.integral().map(|value| value as f64),
        }
    }

    /// Position of the variant in declaration order.
    const fn rank(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Short(_) => 1,
            Self::Long(_) => 2,
            Self::Float(_) => 3,
            Self::Double(_) => 4,
            Self::Char(_) => 5,
            Self::Bool(_) => 6,
            Self::Unsigned(_) => 7,
            Self::UnsignedShort(_) => 8,
            Self::UnsignedLong(_) => 9,
            Self::UnsignedChar(_) => 10,
            Self::Str(_) => 11,
            Self::Pointer(_) => 12,
        }
    }
}

// =============================================================================
// Ordering, Equality and Hashing
// =============================================================================

impl Ord for GenericKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => left.cmp(right),
            (Self::Short(left), Self::Short(right)) => left.cmp(right),
            (Self::Long(left), Self::Long(right)) => left.cmp(right),
            (Self::Float(left), Self::Float(right)) => left.total_cmp(right),
            (Self::Double(left), Self::Double(right)) => left.total_cmp(right),
            (Self::Char(left), Self::Char(right)) => left.cmp(right),
            (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
            (Self::Unsigned(left), Self::Unsigned(right)) => left.cmp(right),
            (Self::UnsignedShort(left), Self::UnsignedShort(right)) => left.cmp(right),
            (Self::UnsignedLong(left), Self::UnsignedLong(right)) => left.cmp(right),
            (Self::UnsignedChar(left), Self::UnsignedChar(right)) => left.cmp(right),
            (Self::Str(left), Self::Str(right)) => left.cmp(right),
            (Self::Pointer(left), Self::Pointer(right)) => left.cmp(right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GenericKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GenericKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GenericKey {}

impl Hash for GenericKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Int(value) => value.hash(state),
            Self::Short(value) => value.hash(state),
            Self::Long(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::Double(value) => value.to_bits().hash(state),
            Self::Char(value) => value.hash(state),
            Self::Bool(value) => value.hash(state),
            Self::Unsigned(value) => value.hash(state),
            Self::UnsignedShort(value) => value.hash(state),
            Self::UnsignedLong(value) => value.hash(state),
            Self::UnsignedChar(value) => value.hash(state),
            Self::Str(value) => value.hash(state),
            Self::Pointer(value) => value.hash(state),
        }
    }
}

impl fmt::Display for GenericKey {
    /// Formats the key with the to-string converter of its own key type.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&(self.key_type().descriptor().to_string)(self))
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! generic_key_conversions {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for GenericKey {
                #[inline]
                fn from(value: $native) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<&GenericKey> for $native {
                type Error = KeyConversionError;

                fn try_from(key: &GenericKey) -> Result<Self, Self::Error> {
                    match key {
                        GenericKey::$variant(value) => Ok(*value),
                        other => Err(KeyConversionError {
                            expected: KeyType::$variant,
                            found: other.key_type(),
                        }),
                    }
                }
            }
        )*
    };
}

generic_key_conversions! {
    i32 => Int,
    i16 => Short,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    bool => Bool,
    u32 => Unsigned,
    u16 => UnsignedShort,
    u64 => UnsignedLong,
    u8 => UnsignedChar,
}

impl From<&str> for GenericKey {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(ReferenceCounter::from(value))
    }
}

impl From<String> for GenericKey {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(ReferenceCounter::from(value))
    }
}

impl From<&String> for GenericKey {
    #[inline]
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ReferenceCounter<str>> for GenericKey {
    #[inline]
    fn from(value: ReferenceCounter<str>) -> Self {
        Self::Str(value)
    }
}

impl<'a> TryFrom<&'a GenericKey> for &'a str {
    type Error = KeyConversionError;

    fn try_from(key: &'a GenericKey) -> Result<Self, Self::Error> {
        key.as_str().ok_or_else(|| KeyConversionError {
            expected: KeyType::Str,
            found: key.key_type(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
