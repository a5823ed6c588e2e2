/// Entries shown on every paginated keyboard.
pub const PAGE_SIZE: usize = 10;

/// One window over an ordered list of entries.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub index: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Slices page `page` (zero-based) out of `entries`. A page size of zero is
/// treated as one; a page past the end is empty.
pub fn paginate<T>(entries: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let start = page.saturating_mul(page_size).min(entries.len());
    let end = start.saturating_add(page_size).min(entries.len());
    Page {
        items: &entries[start..end],
        index: page,
        has_prev: start > 0,
        has_next: end < entries.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_concatenate_to_the_full_list() {
        for len in 0..=25 {
            let entries: Vec<usize> = (0..len).collect();
            for page_size in 1..=12 {
                let mut seen = Vec::new();
                let mut page = 0;
                loop {
                    let window = paginate(&entries, page_size, page);
                    seen.extend_from_slice(window.items);
                    if !window.has_next {
                        break;
                    }
                    page += 1;
                }
                assert_eq!(seen, entries, "len={len} page_size={page_size}");
            }
        }
    }

    #[test]
    fn flags_follow_position() {
        let entries: Vec<u8> = (0..23).collect();
        let first = paginate(&entries, 10, 0);
        assert!(!first.has_prev && first.has_next);
        let middle = paginate(&entries, 10, 1);
        assert!(middle.has_prev && middle.has_next);
        assert_eq!(middle.items.first(), Some(&10));
        let last = paginate(&entries, 10, 2);
        assert!(last.has_prev && !last.has_next);
        assert_eq!(last.items.len(), 3);
    }

    #[test]
    fn exact_multiple_has_no_empty_trailing_page() {
        let entries: Vec<u8> = (0..20).collect();
        assert!(!paginate(&entries, 10, 1).has_next);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let entries = [1, 2, 3];
        let page = paginate(&entries, 10, 5);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(paginate::<u8>(&[], 10, 0).items.is_empty());
    }

    #[test]
    fn zero_page_size_does_not_stall() {
        let entries = [1, 2];
        assert_eq!(paginate(&entries, 0, 1).items, &[2]);
    }
}
