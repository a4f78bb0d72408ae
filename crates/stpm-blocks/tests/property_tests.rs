//! Property tests for the region codec.

use proptest::prelude::*;
use stpm_blocks::{Marker, begin_token, dedup, find_all, inject, wrap};

fn body_strategy() -> impl Strategy<Value = String> {
    "[a-z{}:; \n]{0,40}"
}

fn marker_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,10}"
}

proptest! {
    #[test]
    fn injection_is_idempotent(prefix in body_strategy(), name in marker_strategy(), body in body_strategy()) {
        let marker = Marker::new(name).unwrap();
        let once = inject(&prefix, &marker, &body);
        let twice = inject(&once.content, &marker, &body);

        prop_assert_eq!(&once.content, &twice.content);
        prop_assert_eq!(find_all(&twice.content, &marker).len(), 1);
    }

    #[test]
    fn injection_is_idempotent_past_dangling_start(
        before in body_strategy(),
        after in body_strategy(),
        name in marker_strategy(),
        body in body_strategy(),
    ) {
        let marker = Marker::new(name).unwrap();
        let prefix = format!("{before}\n{}\n{after}", begin_token(&marker));

        let once = inject(&prefix, &marker, &body);
        let twice = inject(&once.content, &marker, &body);

        prop_assert_eq!(&once.content, &twice.content);
        prop_assert_eq!(twice.orphans.len(), 1);
        prop_assert_eq!(find_all(&twice.content, &marker).len(), 1);
    }

    #[test]
    fn dedup_converges(name in marker_strategy(), bodies in prop::collection::vec("[a-z]{1,8}", 2..5)) {
        let marker = Marker::new(name).unwrap();
        let content: String = bodies.iter().map(|b| wrap(b, &marker)).collect();

        let repaired = dedup(&content);
        let regions = find_all(&repaired.content, &marker);
        prop_assert_eq!(regions.len(), 1);
        prop_assert_eq!(&regions[0].body, &bodies[0]);
        prop_assert_eq!(repaired.total_removed(), bodies.len() - 1);

        let again = dedup(&repaired.content);
        prop_assert_eq!(&again.content, &repaired.content);
        prop_assert!(!again.changed());
    }
}
