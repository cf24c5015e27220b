use fixedbitset::FixedBitSet;

///
/// PresenceVector
///
/// Fixed-length bit vector, one bit per shadow field. A set bit means the
/// document mentioned the field, whatever value it carried.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PresenceVector {
    bits: FixedBitSet,
}

impl PresenceVector {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(len),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.len() == 0
    }

    /// Mark `index` present. Out-of-range indexes are ignored and reported.
    pub fn set(&mut self, index: usize) -> bool {
        self.update(index, true)
    }

    pub fn clear(&mut self, index: usize) -> bool {
        self.update(index, false)
    }

    // the vector never grows; `FixedBitSet::set` panics past the end
    fn update(&mut self, index: usize, on: bool) -> bool {
        if index >= self.bits.len() {
            return false;
        }
        self.bits.set(index, on);

        true
    }

    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    /// Number of present fields.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Present indexes, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_span_word_boundaries() {
        let mut presence = PresenceVector::new(70);
        assert!(presence.set(0));
        assert!(presence.set(64));
        assert!(presence.set(69));
        assert!(!presence.set(70));

        assert_eq!(presence.iter().collect::<Vec<_>>(), vec![0, 64, 69]);
        assert_eq!(presence.count(), 3);

        assert!(presence.clear(64));
        assert!(!presence.is_set(64));
        assert!(!presence.is_set(500));
        assert!(!presence.clear(500));
        assert_eq!(presence.len(), 70);
    }

    #[test]
    fn empty_vector_has_no_bits() {
        let presence = PresenceVector::new(0);

        assert!(presence.is_empty());
        assert_eq!(presence.count(), 0);
    }
}
