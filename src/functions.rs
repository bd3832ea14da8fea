//! Math function catalog.
//!
//! Fixed table of the functions callable from a mapping expression. Each
//! entry knows its arity and which numeric kinds it is implemented for;
//! dispatch is keyed by (function, resolved type). Functions with no
//! integer implementation seed their result type as `Float` during
//! compilation, so integer dispatch for them can never be emitted.
//!
//! `uniform` is the one impure entry: it needs the evaluator's random
//! source and is applied there rather than through [`Func::apply1`]. It is
//! also the one function excluded from constant folding.

use crate::scalar::{Scalar, ScalarType};
use core::fmt;

/// A function of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Abs,
    Acos,
    Acosh,
    Asin,
    Asinh,
    Atan,
    Atan2,
    Atanh,
    Cbrt,
    Ceil,
    Cos,
    Cosh,
    E,
    Exp,
    Exp2,
    Floor,
    Hypot,
    HzToMidi,
    Log,
    Log10,
    Log2,
    Logb,
    Max,
    MidiToHz,
    Min,
    Pi,
    Pow,
    Round,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    Trunc,
    Uniform,
}

impl Func {
    /// Resolve a source identifier to a catalog entry.
    pub fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "abs" => Func::Abs,
            "acos" => Func::Acos,
            "acosh" => Func::Acosh,
            "asin" => Func::Asin,
            "asinh" => Func::Asinh,
            "atan" => Func::Atan,
            "atan2" => Func::Atan2,
            "atanh" => Func::Atanh,
            "cbrt" => Func::Cbrt,
            "ceil" => Func::Ceil,
            "cos" => Func::Cos,
            "cosh" => Func::Cosh,
            "e" => Func::E,
            "exp" => Func::Exp,
            "exp2" => Func::Exp2,
            "floor" => Func::Floor,
            "hypot" => Func::Hypot,
            "hzToMidi" => Func::HzToMidi,
            "log" => Func::Log,
            "log10" => Func::Log10,
            "log2" => Func::Log2,
            "logb" => Func::Logb,
            "max" => Func::Max,
            "midiToHz" => Func::MidiToHz,
            "min" => Func::Min,
            "pi" => Func::Pi,
            "pow" => Func::Pow,
            "round" => Func::Round,
            "sin" => Func::Sin,
            "sinh" => Func::Sinh,
            "sqrt" => Func::Sqrt,
            "tan" => Func::Tan,
            "tanh" => Func::Tanh,
            "trunc" => Func::Trunc,
            "uniform" => Func::Uniform,
            _ => return None,
        })
    }

    /// Source name.
    pub const fn name(self) -> &'static str {
        match self {
            Func::Abs => "abs",
            Func::Acos => "acos",
            Func::Acosh => "acosh",
            Func::Asin => "asin",
            Func::Asinh => "asinh",
            Func::Atan => "atan",
            Func::Atan2 => "atan2",
            Func::Atanh => "atanh",
            Func::Cbrt => "cbrt",
            Func::Ceil => "ceil",
            Func::Cos => "cos",
            Func::Cosh => "cosh",
            Func::E => "e",
            Func::Exp => "exp",
            Func::Exp2 => "exp2",
            Func::Floor => "floor",
            Func::Hypot => "hypot",
            Func::HzToMidi => "hzToMidi",
            Func::Log => "log",
            Func::Log10 => "log10",
            Func::Log2 => "log2",
            Func::Logb => "logb",
            Func::Max => "max",
            Func::MidiToHz => "midiToHz",
            Func::Min => "min",
            Func::Pi => "pi",
            Func::Pow => "pow",
            Func::Round => "round",
            Func::Sin => "sin",
            Func::Sinh => "sinh",
            Func::Sqrt => "sqrt",
            Func::Tan => "tan",
            Func::Tanh => "tanh",
            Func::Trunc => "trunc",
            Func::Uniform => "uniform",
        }
    }

    /// Number of arguments.
    pub const fn arity(self) -> usize {
        match self {
            Func::E | Func::Pi => 0,
            Func::Atan2 | Func::Hypot | Func::Max | Func::Min | Func::Pow => 2,
            _ => 1,
        }
    }

    /// Whether an integer implementation exists.
    ///
    /// Functions without one seed as `Float` at compile time and never
    /// execute in `Int32`.
    pub const fn has_int_impl(self) -> bool {
        matches!(self, Func::Abs | Func::Max | Func::Min)
    }

    /// Apply a zero-arity function in the given type.
    pub fn apply0(self, ty: ScalarType) -> Scalar {
        let v = match self {
            Func::Pi => core::f64::consts::PI,
            Func::E => core::f64::consts::E,
            _ => unreachable!("{} is not zero-arity", self),
        };
        match ty {
            ScalarType::Float => Scalar::Float(v as f32),
            ScalarType::Double => Scalar::Double(v),
            ScalarType::Int32 => unreachable!("{} has no integer implementation", self),
        }
    }

    /// Apply a unary function elementwise-compatible, in the operand's type.
    pub fn apply1(self, x: Scalar) -> Scalar {
        match x {
            Scalar::Int32(x) => Scalar::Int32(self.apply1_i32(x)),
            Scalar::Float(x) => Scalar::Float(self.apply1_f32(x)),
            Scalar::Double(x) => Scalar::Double(self.apply1_f64(x)),
        }
    }

    /// Apply a binary function in the operands' type.
    pub fn apply2(self, x: Scalar, y: Scalar) -> Scalar {
        match x {
            Scalar::Int32(x) => Scalar::Int32(self.apply2_i32(x, y.as_i32())),
            Scalar::Float(x) => Scalar::Float(self.apply2_f32(x, y.as_f32())),
            Scalar::Double(x) => Scalar::Double(self.apply2_f64(x, y.as_f64())),
        }
    }

    fn apply1_i32(self, x: i32) -> i32 {
        match self {
            Func::Abs => x.wrapping_abs(),
            _ => unreachable!("{} has no integer implementation", self),
        }
    }

    fn apply1_f32(self, x: f32) -> f32 {
        match self {
            Func::Abs => x.abs(),
            Func::Acos => x.acos(),
            Func::Acosh => x.acosh(),
            Func::Asin => x.asin(),
            Func::Asinh => x.asinh(),
            Func::Atan => x.atan(),
            Func::Atanh => x.atanh(),
            Func::Cbrt => x.cbrt(),
            Func::Ceil => x.ceil(),
            Func::Cos => x.cos(),
            Func::Cosh => x.cosh(),
            Func::Exp => x.exp(),
            Func::Exp2 => x.exp2(),
            Func::Floor => x.floor(),
            Func::HzToMidi => hz_to_midi(x as f64) as f32,
            Func::Log => x.ln(),
            Func::Log10 => x.log10(),
            Func::Log2 => x.log2(),
            Func::Logb => x.abs().log2().floor(),
            Func::MidiToHz => midi_to_hz(x as f64) as f32,
            Func::Round => x.round(),
            Func::Sin => x.sin(),
            Func::Sinh => x.sinh(),
            Func::Sqrt => x.sqrt(),
            Func::Tan => x.tan(),
            Func::Tanh => x.tanh(),
            Func::Trunc => x.trunc(),
            _ => unreachable!("{} is not unary", self),
        }
    }

    fn apply1_f64(self, x: f64) -> f64 {
        match self {
            Func::Abs => x.abs(),
            Func::Acos => x.acos(),
            Func::Acosh => x.acosh(),
            Func::Asin => x.asin(),
            Func::Asinh => x.asinh(),
            Func::Atan => x.atan(),
            Func::Atanh => x.atanh(),
            Func::Cbrt => x.cbrt(),
            Func::Ceil => x.ceil(),
            Func::Cos => x.cos(),
            Func::Cosh => x.cosh(),
            Func::Exp => x.exp(),
            Func::Exp2 => x.exp2(),
            Func::Floor => x.floor(),
            Func::HzToMidi => hz_to_midi(x),
            Func::Log => x.ln(),
            Func::Log10 => x.log10(),
            Func::Log2 => x.log2(),
            Func::Logb => x.abs().log2().floor(),
            Func::MidiToHz => midi_to_hz(x),
            Func::Round => x.round(),
            Func::Sin => x.sin(),
            Func::Sinh => x.sinh(),
            Func::Sqrt => x.sqrt(),
            Func::Tan => x.tan(),
            Func::Tanh => x.tanh(),
            Func::Trunc => x.trunc(),
            _ => unreachable!("{} is not unary", self),
        }
    }

    fn apply2_i32(self, x: i32, y: i32) -> i32 {
        match self {
            Func::Max => x.max(y),
            Func::Min => x.min(y),
            _ => unreachable!("{} has no integer implementation", self),
        }
    }

    fn apply2_f32(self, x: f32, y: f32) -> f32 {
        match self {
            Func::Atan2 => x.atan2(y),
            Func::Hypot => x.hypot(y),
            Func::Max => x.max(y),
            Func::Min => x.min(y),
            Func::Pow => x.powf(y),
            _ => unreachable!("{} is not binary", self),
        }
    }

    fn apply2_f64(self, x: f64, y: f64) -> f64 {
        match self {
            Func::Atan2 => x.atan2(y),
            Func::Hypot => x.hypot(y),
            Func::Max => x.max(y),
            Func::Min => x.min(y),
            Func::Pow => x.powf(y),
            _ => unreachable!("{} is not binary", self),
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// MIDI note number to frequency in Hz (A4 = note 69 = 440 Hz).
fn midi_to_hz(x: f64) -> f64 {
    440.0 * ((x - 69.0) / 12.0).exp2()
}

/// Frequency in Hz to MIDI note number.
fn hz_to_midi(x: f64) -> f64 {
    69.0 + 12.0 * (x / 440.0).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for name in ["abs", "atan2", "hzToMidi", "midiToHz", "pi", "uniform"] {
            let f = Func::from_name(name).unwrap();
            assert_eq!(f.name(), name);
        }
        assert_eq!(Func::from_name("sinc"), None);
        // lookup is case-sensitive
        assert_eq!(Func::from_name("hztomidi"), None);
    }

    #[test]
    fn midi_conversions() {
        assert!((midi_to_hz(69.0) - 440.0).abs() < 1e-9);
        assert!((midi_to_hz(81.0) - 880.0).abs() < 1e-9);
        assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-9);
        assert!((hz_to_midi(220.0) - 57.0).abs() < 1e-9);
    }

    #[test]
    fn integer_dispatch_limited_to_catalogued_funcs() {
        assert!(Func::Abs.has_int_impl());
        assert!(Func::Min.has_int_impl());
        assert!(Func::Max.has_int_impl());
        assert!(!Func::Sin.has_int_impl());
        assert!(!Func::Uniform.has_int_impl());
        assert_eq!(Func::Abs.apply1(Scalar::Int32(-7)), Scalar::Int32(7));
        assert_eq!(
            Func::Min.apply2(Scalar::Int32(3), Scalar::Int32(-2)),
            Scalar::Int32(-2)
        );
    }

    #[test]
    fn zero_arity_constants() {
        assert_eq!(
            Func::Pi.apply0(ScalarType::Float),
            Scalar::Float(core::f32::consts::PI)
        );
        assert_eq!(
            Func::E.apply0(ScalarType::Double),
            Scalar::Double(core::f64::consts::E)
        );
    }
}
