//! The symbol frequency counter, the first stage of every Huffman-bearing
//! pipeline.
//!
//! The table is returned as a `Vec` of `(symbol, count)` pairs in order of
//! first appearance rather than as a bare map: the Huffman tree build breaks
//! frequency ties by heap insertion order, so the counter's output order is
//! part of the codec's observable behavior and must be deterministic.

use std::collections::HashMap;
use std::hash::Hash;

/// Tabulates occurrence counts for each distinct symbol in `input`, in order
/// of first appearance. The counts sum to `input.len()`; an empty input
/// yields an empty table.
pub fn count<S>(input: &[S]) -> Vec<(S, u64)>
where
    S: Copy + Eq + Hash,
{
    let mut index: HashMap<S, usize> = HashMap::new();
    let mut table: Vec<(S, u64)> = Vec::new();

    for &symbol in input {
        match index.get(&symbol) {
            Some(&slot) => table[slot].1 += 1,
            None => {
                index.insert(symbol, table.len());
                table.push((symbol, 1));
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sum_to_input_length() {
        let input = [3i32, 3, 7, 3, 9, 7];
        let table = count(&input);
        assert_eq!(table.iter().map(|(_, c)| c).sum::<u64>(), 6);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_first_appearance_order_is_kept() {
        let input = [b'b', b'a', b'b', b'c'];
        let table = count(&input);
        assert_eq!(table, vec![(b'b', 2), (b'a', 1), (b'c', 1)]);
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let table = count::<u8>(&[]);
        assert!(table.is_empty());
    }
}
