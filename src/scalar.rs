//! Numeric scalar types and values.
//!
//! Every value flowing through a compiled mapping is one of three numeric
//! kinds: 32-bit integer, single-precision float, or double-precision float.
//! The kinds form a promotion lattice (`Int32 < Float < Double`): combining
//! two operands resolves to the widest kind present, and the narrower side
//! is cast up.

use core::fmt;

/// Numeric kind of a scalar, ordered by promotion rank.
///
/// `Ord` follows the rank, so `a.max(b)` is the combined type of two
/// operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarType {
    Int32,
    Float,
    Double,
}

impl ScalarType {
    /// The wider of two types.
    #[inline]
    pub fn promote(a: ScalarType, b: ScalarType) -> ScalarType {
        a.max(b)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Int32 => write!(f, "i32"),
            ScalarType::Float => write!(f, "f32"),
            ScalarType::Double => write!(f, "f64"),
        }
    }
}

/// A single numeric value, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int32(i32),
    Float(f32),
    Double(f64),
}

impl Scalar {
    /// The kind of this value.
    #[inline]
    pub fn ty(self) -> ScalarType {
        match self {
            Scalar::Int32(_) => ScalarType::Int32,
            Scalar::Float(_) => ScalarType::Float,
            Scalar::Double(_) => ScalarType::Double,
        }
    }

    /// The zero value of a kind.
    #[inline]
    pub fn zero(ty: ScalarType) -> Scalar {
        match ty {
            ScalarType::Int32 => Scalar::Int32(0),
            ScalarType::Float => Scalar::Float(0.0),
            ScalarType::Double => Scalar::Double(0.0),
        }
    }

    /// Convert to another kind.
    ///
    /// Widening int->float/double is exact; float/double->int truncates
    /// toward zero; float<->double is the standard rounding conversion.
    #[inline]
    pub fn cast(self, to: ScalarType) -> Scalar {
        match to {
            ScalarType::Int32 => Scalar::Int32(self.as_i32()),
            ScalarType::Float => Scalar::Float(self.as_f32()),
            ScalarType::Double => Scalar::Double(self.as_f64()),
        }
    }

    /// Value as `i32`, truncating toward zero if floating.
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            Scalar::Int32(v) => v,
            Scalar::Float(v) => v as i32,
            Scalar::Double(v) => v as i32,
        }
    }

    /// Value as `f32`.
    #[inline]
    pub fn as_f32(self) -> f32 {
        match self {
            Scalar::Int32(v) => v as f32,
            Scalar::Float(v) => v,
            Scalar::Double(v) => v as f32,
        }
    }

    /// Value as `f64`.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int32(v) => v as f64,
            Scalar::Float(v) => v as f64,
            Scalar::Double(v) => v,
        }
    }

    /// Truth value: non-zero is true.
    #[inline]
    pub fn is_truthy(self) -> bool {
        match self {
            Scalar::Int32(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
            Scalar::Double(v) => v != 0.0,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int32(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
        }
    }
}
