//! Constant-time selection helpers.
//!
//! Every conditional data movement in this crate is expressed through
//! [`subtle::Choice`] masks: table lookups driven by a secret index touch
//! every entry and keep the match by mask, and swaps/moves are mask-and-xor,
//! never branches.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Reads `table[index]` in constant time by scanning the whole table.
///
/// `index` counts from `base`: entry `i` is selected when
/// `index == base + i`. Out-of-range indices return `default`.
pub fn lookup<T: ConditionallySelectable>(
    table: &[T],
    base: u32,
    index: u32,
    default: T,
) -> T {
    let mut acc = default;
    for (i, entry) in table.iter().enumerate() {
        let hit = index.ct_eq(&(base + u32::try_from(i).expect("table fits u32")));
        acc = T::conditional_select(&acc, entry, hit);
    }
    acc
}

/// Swaps `a` and `b` when `choice` is set, in constant time.
pub fn swap<T: ConditionallySelectable>(a: &mut T, b: &mut T, choice: Choice) {
    T::conditional_swap(a, b, choice);
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use subtle::Choice;

    use super::*;

    #[test]
    fn lookup_scans_whole_table() {
        let table = [10u64, 11, 12, 13];
        assert_eq!(lookup(&table, 1, 1, 0), 10);
        assert_eq!(lookup(&table, 1, 4, 0), 13);
        assert_eq!(lookup(&table, 1, 0, 99), 99);
        assert_eq!(lookup(&table, 1, 5, 99), 99);
    }

    #[test]
    fn swap_by_choice() {
        let (mut a, mut b) = (1u64, 2u64);
        swap(&mut a, &mut b, Choice::from(0));
        assert_eq!((a, b), (1, 2));
        swap(&mut a, &mut b, Choice::from(1));
        assert_eq!((a, b), (2, 1));
    }
}
