//! Local ↔ global index mapping for partitioned field data.

use crate::error::IndexError;

/// Maps each position of a local (possibly permuted, non-contiguous)
/// buffer to a position in the global field.
///
/// Purely a lookup table: `to_global` gathers local values into their
/// global slots, `to_local` scatters the global field back out to local
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalIndices {
    indices: Vec<usize>,
}

impl LocalIndices {
    /// Wrap an index table. `indices[i]` is the global slot of local value `i`.
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Number of local values covered.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The raw index table.
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Gather `local` into `global`. Global slots not covered are left untouched.
    pub fn to_global(&self, local: &[f64], global: &mut [f64]) -> Result<(), IndexError> {
        self.check_local(local.len())?;
        self.check_range(global.len())?;
        for (&idx, &value) in self.indices.iter().zip(local) {
            global[idx] = value;
        }
        Ok(())
    }

    /// Scatter the covered slots of `global` into `local`, replacing its contents.
    pub fn to_local(&self, global: &[f64], local: &mut Vec<f64>) -> Result<(), IndexError> {
        self.check_range(global.len())?;
        local.clear();
        local.extend(self.indices.iter().map(|&idx| global[idx]));
        Ok(())
    }

    fn check_local(&self, len: usize) -> Result<(), IndexError> {
        if len != self.indices.len() {
            return Err(IndexError::LocalSizeMismatch {
                expected: self.indices.len(),
                found: len,
            });
        }
        Ok(())
    }

    fn check_range(&self, len: usize) -> Result<(), IndexError> {
        match self.indices.iter().find(|&&idx| idx >= len) {
            Some(&index) => Err(IndexError::OutOfRange { index, len }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn gather_places_local_values_at_global_slots() {
        let map = LocalIndices::new(vec![3, 0, 2]);
        let mut global = vec![-1.0; 5];
        map.to_global(&[10.0, 11.0, 12.0], &mut global).unwrap();
        assert_eq!(global, vec![11.0, -1.0, 12.0, 10.0, -1.0]);
    }

    #[test]
    fn scatter_reads_global_slots_into_local_order() {
        let map = LocalIndices::new(vec![4, 1]);
        let mut local = vec![99.0; 7];
        map.to_local(&[0.0, 1.0, 2.0, 3.0, 4.0], &mut local).unwrap();
        assert_eq!(local, vec![4.0, 1.0]);
    }

    #[test]
    fn size_mismatch_rejected() {
        let map = LocalIndices::new(vec![0, 1]);
        let mut global = vec![0.0; 2];
        assert_eq!(
            map.to_global(&[1.0], &mut global),
            Err(IndexError::LocalSizeMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn out_of_range_rejected() {
        let map = LocalIndices::new(vec![0, 5]);
        let mut local = Vec::new();
        assert_eq!(
            map.to_local(&[0.0; 3], &mut local),
            Err(IndexError::OutOfRange { index: 5, len: 3 })
        );
    }

    fn arb_permutation() -> impl Strategy<Value = Vec<usize>> {
        (1usize..64).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    }

    proptest! {
        #[test]
        fn permutation_is_a_bijection(perm in arb_permutation()) {
            let map = LocalIndices::new(perm.clone());
            let local: Vec<f64> = (0..perm.len()).map(|i| i as f64 * 0.5).collect();
            let mut global = vec![0.0; perm.len()];
            map.to_global(&local, &mut global).unwrap();
            let mut back = Vec::new();
            map.to_local(&global, &mut back).unwrap();
            prop_assert_eq!(back, local);
        }
    }
}
