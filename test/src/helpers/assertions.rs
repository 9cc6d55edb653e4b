/// Assert that authority and replica track the same number of references
#[macro_export]
macro_rules! assert_tracked {
    ($session:expr, $count:expr) => {
        assert_eq!(
            $session.source.tracked_count(),
            $count,
            "authority should track {} references",
            $count
        );
        assert_eq!(
            $session.target.tracked_count(),
            $count,
            "replica should track {} references",
            $count
        );
    };
}

/// Assert that two replica handles point at the same object
#[macro_export]
macro_rules! assert_same_object {
    ($left:expr, $right:expr) => {
        assert!(
            $left.ptr_eq(&$right),
            "expected both handles to reference the same replica object"
        );
    };
}
