use std::fmt;

pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F> {
        f: F,
    }
    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.f)(formatter)
        }
    }
    DisplayFn { f }
}

/// Borrow two distinct elements of a slice mutably at the same time.
pub fn get_two_mut<T>(slice: &mut [T], x: usize, y: usize) -> (&mut T, &mut T) {
    assert!(x != y, "the two indices must be distinct");
    if x < y {
        let (a, b) = slice.split_at_mut(y);
        (&mut a[x], &mut b[0])
    } else {
        let (a, b) = slice.split_at_mut(x);
        (&mut b[0], &mut a[y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_two_mut() {
        let mut values = vec!["a", "b", "c", "d"];
        assert!(matches!(get_two_mut(&mut values, 0, 1), t if *t.0=="a" && *t.1=="b"));
        assert!(matches!(get_two_mut(&mut values, 1, 0), t if *t.0=="b" && *t.1=="a"));
        assert!(matches!(get_two_mut(&mut values, 0, 2), t if *t.0=="a" && *t.1=="c"));
        assert!(matches!(get_two_mut(&mut values, 3, 2), t if *t.0=="d" && *t.1=="c"));
    }

    #[test]
    fn test_display_fn() {
        let shown = display_fn(|f| write!(f, "{}-{}", 1, 2)).to_string();
        assert_eq!(shown, "1-2");
    }
}
