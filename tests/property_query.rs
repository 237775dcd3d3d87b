use jaguar::{OrderBy, Page, Query};
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(query: &Query) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    /// Property: The limit is never below one
    #[test]
    fn prop_limit_at_least_one(index in any::<i64>(), size in any::<i64>()) {
        let limit = Page::new(index, size).limit();
        prop_assert!(limit >= 1);
        if size >= 1 {
            prop_assert_eq!(limit, size);
        }
    }

    /// Property: The offset is never negative, and pages before the first
    /// one start at zero
    #[test]
    fn prop_offset_never_negative(index in any::<i64>(), size in any::<i64>()) {
        let offset = Page::new(index, size).offset();
        prop_assert!(offset >= 0);
        if index < 1 {
            prop_assert_eq!(offset, 0);
        }
    }

    /// Property: Consecutive pages are contiguous
    ///
    /// Page n+1 starts exactly where page n ends.
    #[test]
    fn prop_pages_are_contiguous(index in 1i64..10_000, size in 1i64..10_000) {
        let page = Page::new(index, size);
        let next = Page::new(index + 1, size);
        prop_assert_eq!(next.offset(), page.offset() + page.limit());
    }

    /// Property: Equal queries hash equally, so they share a cache entry
    #[test]
    fn prop_equal_queries_hash_equally(
        index in -5i64..50,
        size in -5i64..50,
        column in "[a-z_]{0,8}",
        desc in any::<bool>(),
        group in "[a-z_]{0,8}",
    ) {
        let build = || {
            Query::new()
                .with_page(Page::new(index, size))
                .with_order_by(OrderBy::new(column.clone(), desc))
                .with_group_by(group.clone())
        };
        let a = build();
        let b = build();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(hash_of(&a), hash_of(&b));
    }

    /// Property: Changing the page changes the query identity
    #[test]
    fn prop_page_is_part_of_identity(index in 0i64..1000, size in 1i64..1000) {
        let a = Query::new().with_page(Page::new(index, size));
        let b = Query::new().with_page(Page::new(index + 1, size));
        prop_assert_ne!(a, b);
    }
}
