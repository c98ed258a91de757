//! Range ordering and the offset algebra used whenever a block's text is rewritten.

use crate::model::Mutation;
use std::cmp::Ordering;

/// `offset` ascending, then `length` descending (outer ranges first).
pub fn range_cmp<M: Mutation>(a: &M, b: &M) -> Ordering {
    a.offset()
        .cmp(&b.offset())
        .then_with(|| b.length().cmp(&a.length()))
}

/// Stable sort by [`range_cmp`].
pub fn range_sort<M: Mutation>(ranges: &mut [M]) {
    ranges.sort_by(range_cmp);
}

/// Result of adjusting one range against a text replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjusted<M> {
    One(M),
    Split(M, M),
}

impl<M> Adjusted<M> {
    pub fn append_to(self, out: &mut Vec<M>) {
        match self {
            Adjusted::One(m) => out.push(m),
            Adjusted::Split(a, b) => {
                out.push(a);
                out.push(b);
            }
        }
    }

    pub fn into_first(self) -> M {
        match self {
            Adjusted::One(m) | Adjusted::Split(m, _) => m,
        }
    }
}

/// Re-anchors `mutation` after `[original_offset, original_offset + original_length)` was
/// replaced by `new_length` characters made of a `prefix_length` head, the transformed content
/// and a `suffix_length` tail.
///
/// Ranges that partially overlap a wrapped replacement are split so that neither piece covers
/// the inserted head or tail. Split pieces are never empty.
pub fn update_mutation<M: Mutation>(
    mutation: &M,
    original_offset: usize,
    original_length: usize,
    new_length: usize,
    prefix_length: usize,
    suffix_length: usize,
) -> Adjusted<M> {
    let offset = mutation.offset();
    let length = mutation.length();
    let end = mutation.end();
    let change_end = original_offset + original_length;

    if change_end <= offset {
        return Adjusted::One(mutation.with_span(offset + new_length - original_length, length));
    }

    if original_offset >= offset && change_end <= end {
        return Adjusted::One(mutation.with_span(offset, length + new_length - original_length));
    }

    if offset >= original_offset && end <= change_end && prefix_length > 0 {
        return Adjusted::One(mutation.with_span(offset + prefix_length, length));
    }

    if offset < original_offset && end > original_offset && end <= change_end && prefix_length > 0
    {
        return Adjusted::Split(
            mutation.with_span(offset, original_offset - offset),
            mutation.with_span(original_offset + prefix_length, end - original_offset),
        );
    }

    if offset >= original_offset && offset < change_end && end > change_end && suffix_length > 0 {
        return Adjusted::Split(
            mutation.with_span(offset + prefix_length, change_end - offset),
            mutation.with_span(
                change_end + prefix_length + suffix_length,
                end - change_end,
            ),
        );
    }

    Adjusted::One(mutation.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityRange, InlineStyleRange};

    // `<a href="http://test.com">` and `</a>`.
    const PREFIX: usize = 26;
    const SUFFIX: usize = 4;

    fn style(offset: usize, length: usize) -> InlineStyleRange {
        InlineStyleRange::new(offset, length, "BOLD")
    }

    fn spans(adjusted: Adjusted<InlineStyleRange>) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        adjusted.append_to(&mut out);
        out.into_iter().map(|m| (m.offset, m.length)).collect()
    }

    #[test]
    fn sorts_by_offset_then_longest_first() {
        let mut ranges = vec![
            EntityRange::new(4, 1, "a"),
            EntityRange::new(0, 2, "b"),
            EntityRange::new(0, 5, "c"),
            EntityRange::new(0, 2, "d"),
        ];
        range_sort(&mut ranges);
        let keys: Vec<&str> = ranges.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["c", "b", "d", "a"]);
    }

    #[test]
    fn adjusts_every_case_against_a_wrapped_link() {
        // region [1, 21) becomes PREFIX + 20 + SUFFIX characters
        let new_length = PREFIX + 20 + SUFFIX;
        let cases: &[((usize, usize), &[(usize, usize)])] = &[
            // disjoint, after
            ((24, 5), &[(54, 5)]),
            ((21, 3), &[(51, 3)]),
            // contains the change
            ((0, 25), &[(0, 55)]),
            ((1, 20), &[(1, 50)]),
            // inside the change
            ((5, 10), &[(31, 10)]),
            // prefix overlap
            ((0, 12), &[(0, 1), (27, 11)]),
            // suffix overlap
            ((15, 10), &[(41, 6), (51, 4)]),
            // disjoint, before
            ((0, 1), &[(0, 1)]),
        ];
        for ((offset, length), expected) in cases {
            let got = spans(update_mutation(
                &style(*offset, *length),
                1,
                20,
                new_length,
                PREFIX,
                SUFFIX,
            ));
            assert_eq!(&got, expected, "mutation ({offset}, {length})");
        }
    }

    #[test]
    fn splits_suffix_overlap_past_the_whole_replacement() {
        let got = spans(update_mutation(&style(22, 34), 0, 26, 56, PREFIX, SUFFIX));
        assert_eq!(got, [(48, 4), (56, 30)]);
    }

    #[test]
    fn ranges_ending_before_a_wrapped_region_are_untouched() {
        for (offset, length) in [(0, 2), (0, 5), (3, 2)] {
            let got = spans(update_mutation(&style(offset, length), 5, 8, 8 + 7, 3, 4));
            assert_eq!(got, [(offset, length)]);
        }
    }

    #[test]
    fn split_pieces_preserve_the_original_characters() {
        for (offset, length) in [(0, 12), (3, 7), (12, 10), (6, 14)] {
            let mut pieces = Vec::new();
            update_mutation(&style(offset, length), 5, 10, 10 + PREFIX + SUFFIX, PREFIX, SUFFIX)
                .append_to(&mut pieces);
            assert_eq!(pieces.len(), 2, "expected a split for ({offset}, {length})");
            assert_eq!(pieces[0].length + pieces[1].length, length);
            assert!(pieces[0].end() <= pieces[1].offset);
            assert!(pieces.iter().all(|p| p.length > 0));
        }
    }

    #[test]
    fn plain_substitutions_never_split() {
        // prefix and suffix of zero: escaping one character into five
        let cases = [((0, 3), (0, 7)), ((2, 1), (2, 5)), ((3, 2), (7, 2)), ((0, 2), (0, 2))];
        for ((offset, length), expected) in cases {
            let got = update_mutation(&style(offset, length), 2, 1, 5, 0, 0);
            assert_eq!(got, Adjusted::One(style(expected.0, expected.1)));
        }
    }

    #[test]
    fn zero_length_ranges_at_region_boundaries() {
        // at the start: contained in the region, moved past the head
        let start = update_mutation(&style(5, 0), 5, 3, 3 + PREFIX + SUFFIX, PREFIX, SUFFIX);
        assert_eq!(start, Adjusted::One(style(5 + PREFIX, 0)));

        // at the end: after the region, shifted by the whole delta
        let end = update_mutation(&style(8, 0), 5, 3, 3 + PREFIX + SUFFIX, PREFIX, SUFFIX);
        assert_eq!(end, Adjusted::One(style(8 + PREFIX + SUFFIX, 0)));
    }

    #[test]
    fn range_ending_exactly_at_region_start_is_not_split() {
        let got = update_mutation(&style(2, 3), 5, 3, 3 + PREFIX + SUFFIX, PREFIX, SUFFIX);
        assert_eq!(got, Adjusted::One(style(2, 3)));
    }
}
