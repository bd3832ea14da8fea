//! Caller-owned sample-history ring buffers.
//!
//! The surrounding signal layer owns one [`History`] per signal: a fixed
//! -capacity ring of sample vectors of a single numeric type. The engine
//! only reads the input history, and reads-and-appends the output history
//! (self-reference through `y{-n}` enables feedback). The buffer must be
//! at least as deep as the compiled program declares it needs; sizing it
//! is the caller's contract, checked once per evaluation.

use crate::scalar::{Scalar, ScalarType};

/// Ring buffer of vector samples for one signal.
///
/// The write position starts at -1 ("no sample yet"); slots are
/// zero-filled, so reading back past the first pushed sample yields
/// zeros, which is the defined cold-start behavior for feedback terms.
#[derive(Debug, Clone)]
pub struct History {
    ty: ScalarType,
    vector_length: usize,
    /// Sample-major storage, `capacity * vector_length` elements.
    data: Vec<Scalar>,
    position: i32,
}

impl History {
    /// Create a zero-filled history of `capacity` samples, each a vector
    /// of `vector_length` elements of type `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `vector_length` or `capacity` is zero.
    pub fn new(ty: ScalarType, vector_length: usize, capacity: usize) -> History {
        assert!(vector_length > 0, "vector length must be non-zero");
        assert!(capacity > 0, "history capacity must be non-zero");
        History {
            ty,
            vector_length,
            data: vec![Scalar::zero(ty); capacity * vector_length],
            position: -1,
        }
    }

    /// Element type of every sample.
    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        self.ty
    }

    /// Elements per sample.
    #[inline]
    pub fn vector_length(&self) -> usize {
        self.vector_length
    }

    /// Ring capacity in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len() / self.vector_length
    }

    /// Current write position, -1 before the first sample.
    #[inline]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// The sample vector at ring slot `index`.
    #[inline]
    pub fn sample(&self, index: usize) -> &[Scalar] {
        let start = index * self.vector_length;
        &self.data[start..start + self.vector_length]
    }

    /// The most recently written sample, if any.
    pub fn latest(&self) -> Option<&[Scalar]> {
        if self.position < 0 {
            None
        } else {
            Some(self.sample(self.position as usize))
        }
    }

    /// Resolve a (non-positive) history offset from the write position to
    /// a ring slot. `bias` is 0 for input reads and 1 for output reads,
    /// where the about-to-be-written sample is not yet committed.
    #[inline]
    pub(crate) fn ring_index(&self, offset: i32, bias: i32) -> usize {
        let cap = self.capacity() as i32;
        (offset + self.position + bias).rem_euclid(cap) as usize
    }

    /// Append one sample, advancing the write position.
    ///
    /// # Panics
    ///
    /// Panics if `sample` does not match the per-sample vector length.
    pub fn push(&mut self, sample: &[Scalar]) {
        assert_eq!(
            sample.len(),
            self.vector_length,
            "sample length does not match history vector length"
        );
        self.position = (self.position + 1).rem_euclid(self.capacity() as i32);
        let start = self.position as usize * self.vector_length;
        for (slot, value) in self.data[start..start + self.vector_length]
            .iter_mut()
            .zip(sample)
        {
            debug_assert_eq!(value.ty(), self.ty, "sample element of foreign type");
            *slot = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_zeroed() {
        let h = History::new(ScalarType::Float, 2, 3);
        assert_eq!(h.position(), -1);
        assert_eq!(h.latest(), None);
        assert_eq!(h.sample(2), &[Scalar::Float(0.0), Scalar::Float(0.0)]);
    }

    #[test]
    fn push_wraps_around() {
        let mut h = History::new(ScalarType::Int32, 1, 2);
        h.push(&[Scalar::Int32(1)]);
        h.push(&[Scalar::Int32(2)]);
        h.push(&[Scalar::Int32(3)]);
        assert_eq!(h.position(), 0);
        assert_eq!(h.latest(), Some(&[Scalar::Int32(3)][..]));
        assert_eq!(h.sample(1), &[Scalar::Int32(2)]);
    }

    #[test]
    fn ring_index_biases() {
        let mut h = History::new(ScalarType::Int32, 1, 3);
        h.push(&[Scalar::Int32(10)]);
        h.push(&[Scalar::Int32(11)]);
        // position = 1; offset 0 reads the current sample
        assert_eq!(h.ring_index(0, 0), 1);
        assert_eq!(h.ring_index(-1, 0), 0);
        // output-style read: offset -1 with bias 1 is the latest committed
        assert_eq!(h.ring_index(-1, 1), 1);
        // wraps below zero
        assert_eq!(h.ring_index(-2, 0), 2);
    }
}
