/// Build a per-slot list for the combinators.
///
/// Each element becomes `Some(element)`, and an underscore leaves its slot
/// empty, which the combinators treat as pass-through.
///
/// ```
/// # use cpsfn::{slots, Func};
/// let list: Vec<Option<i32>> = slots![1, _, 3];
/// assert_eq!(list, vec![Some(1), None, Some(3)]);
/// let empty: Vec<Option<Func>> = slots![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! slots {
    (@acc [$($out:expr),*]) => {
        ::std::vec![$($out),*]
    };
    (@acc [$($out:expr),*] _ $(, $($rest:tt)*)?) => {
        $crate::slots!(@acc [$($out,)* ::std::option::Option::None] $($($rest)*)?)
    };
    (@acc [$($out:expr),*] $head:expr $(, $($rest:tt)*)?) => {
        $crate::slots!(@acc [$($out,)* ::std::option::Option::Some($head)] $($($rest)*)?)
    };
    ($($items:tt)*) => {
        $crate::slots!(@acc [] $($items)*)
    };
}

/// Apply operators to a CPS function from left to right.
///
/// `pipe!(cps, f, g)` is `g(f(cps))`.
///
/// ```
/// # use cpsfn::{args, filter, map, of, pipe, slots, Callback, Func, Predicate, Value};
/// let result = pipe!(
///     of(args![20]),
///     map(slots![Func::new(|args| Ok(Value::from(args.int(0)? + 1)))]),
///     filter(slots![Predicate::new(|args| Ok(args.int(0)? > 0))]),
/// );
/// result.call(Callback::new(|args| {
///     assert_eq!(args, args![21]);
///     Ok(())
/// })).unwrap();
/// ```
#[macro_export]
macro_rules! pipe {
    ($a:expr, $b:expr $(,)?) => { $b($a) };
    ($a:expr, $b:expr, $($rest:expr),* $(,)?) => {
        $crate::pipe!($b($a), $($rest),*)
    };
}
