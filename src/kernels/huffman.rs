//! This module contains the static Huffman codec: tree construction from a
//! frequency table, per-symbol code derivation, and exact bit-level packing
//! and unpacking against that tree.
//!
//! Codes are not canonical. Ties between equal frequencies are broken by heap
//! insertion order (the frequency counter's first-appearance order), so a
//! code table is only meaningful together with the tree that produced it —
//! which is why the containers persist the tree itself.
//!
//! Bit packing is most-significant-bit first with a zero-padded final byte;
//! the exact valid-bit count travels alongside the packed bytes so the
//! decoder never interprets padding as data.

use bitvec::prelude::*;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::HacError;

/// One Huffman code: a finite bit sequence, MSB-first.
pub type Code = BitVec<u8, Msb0>;

/// A node of the prefix-code tree. Each parent exclusively owns its children;
/// traversal is strictly top-down, so no shared or back references exist.
///
/// Invariants: an internal node's frequency is the sum of its children's;
/// a leaf's frequency is the original count from the frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode<S> {
    Leaf {
        symbol: S,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        left: Box<HuffmanNode<S>>,
        right: Box<HuffmanNode<S>>,
    },
}

impl<S> HuffmanNode<S> {
    pub fn frequency(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { frequency, .. } => *frequency,
            HuffmanNode::Internal { frequency, .. } => *frequency,
        }
    }
}

/// Heap entry wrapping a partial tree. `BinaryHeap` is a max-heap, so the
/// ordering is inverted: the entry with the lowest `(frequency, ticket)`
/// pair compares greatest. The ticket is the insertion counter that makes
/// tie-breaking deterministic.
struct HeapEntry<S> {
    frequency: u64,
    ticket: u64,
    node: HuffmanNode<S>,
}

impl<S> PartialEq for HeapEntry<S> {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.ticket == other.ticket
    }
}

impl<S> Eq for HeapEntry<S> {}

impl<S> Ord for HeapEntry<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .frequency
            .cmp(&self.frequency)
            .then_with(|| other.ticket.cmp(&self.ticket))
    }
}

impl<S> PartialOrd for HeapEntry<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds the prefix-code tree: one leaf per distinct symbol, then repeated
/// merging of the two lowest-frequency nodes until a single root remains.
///
/// Returns `None` for an empty table. A table with exactly one distinct
/// symbol yields a one-node tree; `generate_codes` still assigns it a usable
/// one-bit code.
pub fn build_tree<S>(freqs: &[(S, u64)]) -> Option<HuffmanNode<S>>
where
    S: Copy,
{
    if freqs.is_empty() {
        return None;
    }

    let mut ticket: u64 = 0;
    let mut heap: BinaryHeap<HeapEntry<S>> = BinaryHeap::with_capacity(freqs.len());

    for &(symbol, frequency) in freqs {
        heap.push(HeapEntry {
            frequency,
            ticket,
            node: HuffmanNode::Leaf { symbol, frequency },
        });
        ticket += 1;
    }

    while heap.len() > 1 {
        let (Some(lo), Some(hi)) = (heap.pop(), heap.pop()) else {
            break;
        };
        let frequency = lo.frequency + hi.frequency;
        heap.push(HeapEntry {
            frequency,
            ticket,
            node: HuffmanNode::Internal {
                frequency,
                left: Box::new(lo.node),
                right: Box::new(hi.node),
            },
        });
        ticket += 1;
    }

    heap.pop().map(|entry| entry.node)
}

/// Derives the code table by full traversal from the root: left descent
/// appends 0, right descent appends 1. Prefix-freedom is guaranteed by the
/// tree shape, not enforced separately.
pub fn generate_codes<S>(root: &HuffmanNode<S>) -> HashMap<S, Code>
where
    S: Copy + Eq + Hash,
{
    let mut table = HashMap::new();
    match root {
        // Degenerate single-symbol tree: the lone leaf gets the explicit
        // one-bit code 0 so the encoded stream is never zero-length per symbol.
        HuffmanNode::Leaf { symbol, .. } => {
            table.insert(*symbol, bitvec![u8, Msb0; 0]);
        }
        HuffmanNode::Internal { .. } => {
            let mut prefix = Code::new();
            collect_codes(root, &mut prefix, &mut table);
        }
    }
    table
}

fn collect_codes<S>(node: &HuffmanNode<S>, prefix: &mut Code, table: &mut HashMap<S, Code>)
where
    S: Copy + Eq + Hash,
{
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            table.insert(*symbol, prefix.clone());
        }
        HuffmanNode::Internal { left, right, .. } => {
            prefix.push(false);
            collect_codes(left, prefix, table);
            prefix.pop();

            prefix.push(true);
            collect_codes(right, prefix, table);
            prefix.pop();
        }
    }
}

/// Concatenates each symbol's code into a single MSB-first bit stream and
/// packs it 8 bits per byte, zero-padding the final byte. Returns the packed
/// bytes together with the exact count of meaningful bits.
pub fn encode<S>(symbols: &[S], table: &HashMap<S, Code>) -> Result<(Vec<u8>, u64), HacError>
where
    S: Copy + Eq + Hash + Debug,
{
    let mut bits: Code = BitVec::new();

    for symbol in symbols {
        let code = table.get(symbol).ok_or_else(|| {
            HacError::InternalError(format!("symbol {:?} is missing from the code table", symbol))
        })?;
        bits.extend_from_bitslice(code);
    }

    let valid_bits = bits.len() as u64;
    bits.set_uninitialized(false);
    Ok((bits.into_vec(), valid_bits))
}

/// Walks the tree over exactly `valid_bits` bits (0 = left, 1 = right),
/// emitting a symbol and resetting to the root at each leaf.
///
/// Fails with a malformed-stream error if the bits run out mid-traversal or
/// if `valid_bits` overruns the supplied buffer; padding is never decoded.
pub fn decode<S>(packed: &[u8], valid_bits: u64, root: &HuffmanNode<S>) -> Result<Vec<S>, HacError>
where
    S: Copy,
{
    if valid_bits > packed.len() as u64 * 8 {
        return Err(HacError::MalformedContainer(format!(
            "valid-bit count {} exceeds the {} bits present in the payload",
            valid_bits,
            packed.len() * 8
        )));
    }
    let bits = &packed.view_bits::<Msb0>()[..valid_bits as usize];

    // Degenerate single-symbol tree: the root itself carries the symbol and
    // every valid bit is one occurrence.
    if let HuffmanNode::Leaf { symbol, .. } = root {
        return Ok(vec![*symbol; bits.len()]);
    }

    let mut output = Vec::new();
    let mut node = root;

    for bit in bits.iter().by_vals() {
        let HuffmanNode::Internal { left, right, .. } = node else {
            return Err(HacError::InternalError(
                "decode cursor rested on a leaf between bits".to_string(),
            ));
        };
        node = if bit { &**right } else { &**left };

        if let HuffmanNode::Leaf { symbol, .. } = node {
            output.push(*symbol);
            node = root;
        }
    }

    if !std::ptr::eq(node, root) {
        return Err(HacError::MalformedContainer(
            "bit stream exhausted mid-traversal; valid bits do not form complete codes"
                .to_string(),
        ));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::freq;

    fn codec_for(data: &[u8]) -> (HuffmanNode<u8>, HashMap<u8, Code>) {
        let table = freq::count(data);
        let root = build_tree(&table).expect("non-empty input");
        let codes = generate_codes(&root);
        (root, codes)
    }

    #[test]
    fn test_roundtrip() {
        let data = b"abracadabra, abracadabra";
        let (root, codes) = codec_for(data);

        let (packed, valid_bits) = encode(data, &codes).unwrap();
        let decoded = decode(&packed, valid_bits, &root).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_no_code_is_a_prefix_of_another() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let (_, codes) = codec_for(data);

        let all: Vec<&Code> = codes.values().collect();
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i == j {
                    continue;
                }
                let shorter = a.len().min(b.len());
                assert_ne!(
                    &a[..shorter],
                    &b[..shorter],
                    "one code is a prefix of another"
                );
            }
        }
    }

    #[test]
    fn test_internal_frequencies_sum_children() {
        fn check(node: &HuffmanNode<u8>) {
            if let HuffmanNode::Internal {
                frequency,
                left,
                right,
            } = node
            {
                assert_eq!(*frequency, left.frequency() + right.frequency());
                check(left);
                check(right);
            }
        }
        let (root, _) = codec_for(b"mississippi");
        check(&root);
        assert_eq!(root.frequency(), 11);
    }

    #[test]
    fn test_single_distinct_symbol_gets_a_one_bit_code() {
        let data = [7u8; 5];
        let (root, codes) = codec_for(&data);

        assert!(matches!(root, HuffmanNode::Leaf { symbol: 7, .. }));
        assert_eq!(codes[&7], bitvec![u8, Msb0; 0]);

        let (packed, valid_bits) = encode(&data, &codes).unwrap();
        assert_eq!(valid_bits, 5);
        assert_eq!(decode(&packed, valid_bits, &root).unwrap(), data);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let table = vec![(b'a', 1u64), (b'b', 1), (b'c', 1), (b'd', 1)];
        let first = build_tree(&table).unwrap();
        let second = build_tree(&table).unwrap();
        assert_eq!(first, second);
        assert_eq!(generate_codes(&first), generate_codes(&second));
    }

    #[test]
    fn test_truncated_stream_fails_mid_traversal() {
        // Codes here: 'c' = 0, 'a' = 10, 'b' = 11. Encoding "ab" yields the
        // 4-bit stream 1011; cutting it to 3 bits strands the walk inside
        // the tree.
        let table = vec![(b'a', 1u64), (b'b', 1), (b'c', 1)];
        let root = build_tree(&table).unwrap();
        let codes = generate_codes(&root);

        let (packed, valid_bits) = encode(b"ab", &codes).unwrap();
        assert_eq!(valid_bits, 4);

        let result = decode(&packed, valid_bits - 1, &root);
        assert!(matches!(result, Err(HacError::MalformedContainer(_))));
    }

    #[test]
    fn test_valid_bits_beyond_buffer_is_rejected() {
        let (root, codes) = codec_for(b"aab");
        let (packed, valid_bits) = encode(b"aab", &codes).unwrap();
        let result = decode(&packed, valid_bits + 64, &root);
        assert!(matches!(result, Err(HacError::MalformedContainer(_))));
    }

    #[test]
    fn test_empty_input_encodes_to_empty_stream() {
        let (_, codes) = codec_for(b"xyz");
        let (packed, valid_bits) = encode(&[], &codes).unwrap();
        assert!(packed.is_empty());
        assert_eq!(valid_bits, 0);
    }

    #[test]
    fn test_packing_is_msb_first() {
        // Single symbol 'z' with code 0 repeated 3 times: bits 000 pack to a
        // single zero byte. A two-symbol alphabet makes the orientation
        // observable: codes 0 and 1, stream "1 1 1" must pack to 0b1110_0000.
        let table = vec![(b'x', 2u64), (b'y', 3)];
        let root = build_tree(&table).unwrap();
        let codes = generate_codes(&root);

        let ones: Vec<u8> = vec![
            if codes[&b'x'] == bitvec![u8, Msb0; 1] {
                b'x'
            } else {
                b'y'
            };
            3
        ];
        let (packed, valid_bits) = encode(&ones, &codes).unwrap();
        assert_eq!(valid_bits, 3);
        assert_eq!(packed, vec![0b1110_0000]);
    }
}
