//! Structural call keys derived from argument values
//!
//! Keys are built from typed segments rather than stringified arguments, so
//! differently-typed values that happen to render identically (`1` vs `"1"`)
//! never collide. Positional segments are order sensitive; named segments
//! live in a `BTreeMap` and therefore compare equal regardless of the order
//! they were supplied in.

use std::collections::BTreeMap;
use std::fmt;

/// One typed value atom inside a [`CallKey`].
///
/// Segments of different variants are never equal. Floats are keyed by
/// their IEEE-754 bit pattern: `NaN` memoizes consistently and `0.0` /
/// `-0.0` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySegment {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<KeySegment>),
}

impl KeySegment {
    pub fn float(value: f64) -> Self {
        Self::Float(value.to_bits())
    }

    pub fn bytes(value: impl AsRef<[u8]>) -> Self {
        Self::Bytes(value.as_ref().to_vec())
    }
}

impl fmt::Display for KeySegment {
    /// Diagnostic rendering for logs. Never use this for equality; two
    /// unequal segments may render identically (`1` vs the float `1`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Self::Str(v) => write!(f, "{:?}", v),
            Self::Bytes(v) => write!(f, "bytes({})", v.len()),
            Self::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Conversion from an argument value to its key segment.
pub trait KeyComponent {
    fn to_segment(&self) -> KeySegment;
}

impl<T: KeyComponent + ?Sized> KeyComponent for &T {
    fn to_segment(&self) -> KeySegment {
        (**self).to_segment()
    }
}

impl KeyComponent for bool {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Bool(*self)
    }
}

impl KeyComponent for i8 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Int(i64::from(*self))
    }
}

impl KeyComponent for i16 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Int(i64::from(*self))
    }
}

impl KeyComponent for i32 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Int(i64::from(*self))
    }
}

impl KeyComponent for i64 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Int(*self)
    }
}

impl KeyComponent for isize {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Int(*self as i64)
    }
}

impl KeyComponent for u8 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::UInt(u64::from(*self))
    }
}

impl KeyComponent for u16 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::UInt(u64::from(*self))
    }
}

impl KeyComponent for u32 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::UInt(u64::from(*self))
    }
}

impl KeyComponent for u64 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::UInt(*self)
    }
}

impl KeyComponent for usize {
    fn to_segment(&self) -> KeySegment {
        KeySegment::UInt(*self as u64)
    }
}

impl KeyComponent for f64 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::float(*self)
    }
}

impl KeyComponent for f32 {
    fn to_segment(&self) -> KeySegment {
        KeySegment::float(f64::from(*self))
    }
}

impl KeyComponent for str {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Str(self.to_string())
    }
}

impl KeyComponent for String {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Str(self.clone())
    }
}

/// `None` keys as [`KeySegment::Unit`]; `Some(v)` keys as `v` itself.
impl<T: KeyComponent> KeyComponent for Option<T> {
    fn to_segment(&self) -> KeySegment {
        match self {
            Some(value) => value.to_segment(),
            None => KeySegment::Unit,
        }
    }
}

impl<T: KeyComponent> KeyComponent for [T] {
    fn to_segment(&self) -> KeySegment {
        KeySegment::Seq(self.iter().map(KeyComponent::to_segment).collect())
    }
}

impl<T: KeyComponent, const N: usize> KeyComponent for [T; N] {
    fn to_segment(&self) -> KeySegment {
        self.as_slice().to_segment()
    }
}

impl<T: KeyComponent> KeyComponent for Vec<T> {
    fn to_segment(&self) -> KeySegment {
        self.as_slice().to_segment()
    }
}

/// The full key for one invocation: positional segments in call order plus
/// named segments normalized by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallKey {
    positional: Vec<KeySegment>,
    named: BTreeMap<String, KeySegment>,
}

impl CallKey {
    /// Creates an empty key (the key of a zero-argument call).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional segment. Order is significant.
    pub fn arg(mut self, component: impl KeyComponent) -> Self {
        self.positional.push(component.to_segment());
        self
    }

    /// Appends a positional byte-string segment.
    pub fn arg_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.positional.push(KeySegment::bytes(bytes));
        self
    }

    /// Adds a named segment. Supplying names in a different order yields
    /// the same key; supplying the same name twice keeps the last value.
    pub fn named(mut self, name: impl Into<String>, component: impl KeyComponent) -> Self {
        self.named.insert(name.into(), component.to_segment());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl fmt::Display for CallKey {
    /// Diagnostic rendering: `(4, "x", n=2)`. Not an equality surface.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let mut first = true;
        for segment in &self.positional {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        for (name, segment) in &self.named {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, segment)?;
            first = false;
        }
        write!(f, ")")
    }
}

/// Derives the [`CallKey`] for an argument bundle.
///
/// Blanket implementations cover single components, tuples up to arity
/// four (positional, order preserved), `()` for zero-argument calls, and
/// `CallKey` itself for hand-built keys with named segments. Custom
/// argument structs implement this by building a `CallKey` from their
/// fields.
pub trait MemoArgs {
    fn call_key(&self) -> CallKey;
}

impl<T: KeyComponent> MemoArgs for T {
    fn call_key(&self) -> CallKey {
        CallKey::new().arg(self)
    }
}

impl MemoArgs for () {
    fn call_key(&self) -> CallKey {
        CallKey::new()
    }
}

impl MemoArgs for CallKey {
    fn call_key(&self) -> CallKey {
        self.clone()
    }
}

impl<T1: KeyComponent, T2: KeyComponent> MemoArgs for (T1, T2) {
    fn call_key(&self) -> CallKey {
        CallKey::new().arg(&self.0).arg(&self.1)
    }
}

impl<T1: KeyComponent, T2: KeyComponent, T3: KeyComponent> MemoArgs for (T1, T2, T3) {
    fn call_key(&self) -> CallKey {
        CallKey::new().arg(&self.0).arg(&self.1).arg(&self.2)
    }
}

impl<T1: KeyComponent, T2: KeyComponent, T3: KeyComponent, T4: KeyComponent> MemoArgs
    for (T1, T2, T3, T4)
{
    fn call_key(&self) -> CallKey {
        CallKey::new()
            .arg(&self.0)
            .arg(&self.1)
            .arg(&self.2)
            .arg(&self.3)
    }
}
