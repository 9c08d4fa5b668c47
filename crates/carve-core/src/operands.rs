//! Positional operand sources for [`View::apply`](crate::View::apply) and
//! [`View::mutate`](crate::View::mutate).
//!
//! An [`Operands`] value is either `()` (no auxiliary data) or a tuple of
//! one to six [`IntoIterator`] sources. Its cursor yields one tuple per
//! position, taking one item from every source, so a single `apply` covers
//! every arity:
//!
//! ```
//! use carve_core::View;
//!
//! let u = [1.0, 2.0];
//! let v = [10.0, 20.0];
//! let mut out = [0.0_f64; 2];
//! let view = View::new(&mut out);
//!
//! view.apply((), |()| 4.0);
//! view.mutate((&u,), |(a,)| a * 2.0);
//! view.mutate((&u, &v), |(a, b)| a + b);
//! assert_eq!(view.to_vec(), vec![4.0 + 2.0 + 11.0, 4.0 + 4.0 + 22.0]);
//! ```

use std::iter::{self, Repeat};

/// An ordered set of auxiliary sequences consumed in lockstep.
pub trait Operands {
    /// One position's worth of items, as a tuple.
    type Item;
    /// Iterator over the zipped positions.
    type Cursor: Iterator<Item = Self::Item>;

    /// Start iterating the sources from their first position.
    fn into_cursor(self) -> Self::Cursor;
}

/// No auxiliary sources: every position yields `()`.
impl Operands for () {
    type Item = ();
    type Cursor = Repeat<()>;

    fn into_cursor(self) -> Self::Cursor {
        iter::repeat(())
    }
}

/// Cursor over a tuple of iterators, advancing all of them together.
///
/// Ends as soon as any source runs out.
#[derive(Clone, Debug)]
pub struct Zipped<I>(I);

macro_rules! tuple_operands {
    ($($src:ident . $idx:tt),+) => {
        impl<$($src: IntoIterator),+> Operands for ($($src,)+) {
            type Item = ($(<$src as IntoIterator>::Item,)+);
            type Cursor = Zipped<($(<$src as IntoIterator>::IntoIter,)+)>;

            fn into_cursor(self) -> Self::Cursor {
                Zipped(($(self.$idx.into_iter(),)+))
            }
        }

        impl<$($src: Iterator),+> Iterator for Zipped<($($src,)+)> {
            type Item = ($(<$src as Iterator>::Item,)+);

            fn next(&mut self) -> Option<Self::Item> {
                Some(($(self.0.$idx.next()?,)+))
            }
        }
    };
}

tuple_operands!(U.0);
tuple_operands!(U.0, V.1);
tuple_operands!(U.0, V.1, W.2);
tuple_operands!(U.0, V.1, W.2, X.3);
tuple_operands!(U.0, V.1, W.2, X.3, Y.4);
tuple_operands!(U.0, V.1, W.2, X.3, Y.4, Z.5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_operands_never_end() {
        assert_eq!(().into_cursor().take(5).count(), 5);
    }

    #[test]
    fn tuple_cursor_zips_positionally() {
        let a = [1, 2, 3];
        let b = vec![10, 20, 30];
        let got: Vec<_> = (&a, &b).into_cursor().map(|(x, y)| x + y).collect();
        assert_eq!(got, vec![11, 22, 33]);
    }

    #[test]
    fn tuple_cursor_stops_at_shortest_source() {
        let a = [1, 2, 3];
        let b = [1];
        assert_eq!((&a, &b).into_cursor().count(), 1);
    }

    #[test]
    fn six_sources_yield_six_tuples() {
        let s = [1u32, 2];
        let mut cursor = (&s, &s, &s, &s, &s, &s).into_cursor();
        assert_eq!(cursor.next(), Some((&1, &1, &1, &1, &1, &1)));
        assert_eq!(cursor.next(), Some((&2, &2, &2, &2, &2, &2)));
        assert_eq!(cursor.next(), None);
    }
}
