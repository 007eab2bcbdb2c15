//! Dynamically typed values carried by emissions.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{CallbackResult, Error};


/// A value passed to a callback.
///
/// Callbacks accept any number of arguments of any kind, so arguments are
/// dynamically typed. Functions are values too, which is what allows `ap` to
/// combine a stream of functions with a stream of values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The empty value.
    Unit,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(Arc<str>),
    /// A list of values.
    List(Vec<Value>),
    /// A function.
    Func(Func),
}

impl Value {
    /// Name of the kind of value, used in error messages.
    pub fn kind(&self) -> &'static str {
        match *self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Func(_) => "function",
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::TypeMismatch { expected, found: self.kind() }
    }

    /// The integer inside this value.
    pub fn as_int(&self) -> CallbackResult<i64> {
        match *self {
            Value::Int(n) => Ok(n),
            _ => Err(self.mismatch("int")),
        }
    }

    /// The number inside this value. Integers are widened.
    pub fn as_float(&self) -> CallbackResult<f64> {
        match *self {
            Value::Float(x) => Ok(x),
            Value::Int(n) => Ok(n as f64),
            _ => Err(self.mismatch("float")),
        }
    }

    /// The boolean inside this value.
    pub fn as_bool(&self) -> CallbackResult<bool> {
        match *self {
            Value::Bool(b) => Ok(b),
            _ => Err(self.mismatch("bool")),
        }
    }

    /// The string inside this value.
    pub fn as_str(&self) -> CallbackResult<&str> {
        match *self {
            Value::Str(ref s) => Ok(&**s),
            _ => Err(self.mismatch("str")),
        }
    }

    /// The list inside this value.
    pub fn as_list(&self) -> CallbackResult<&[Value]> {
        match *self {
            Value::List(ref items) => Ok(items.as_slice()),
            _ => Err(self.mismatch("list")),
        }
    }

    /// The function inside this value.
    pub fn as_func(&self) -> CallbackResult<&Func> {
        match *self {
            Value::Func(ref f) => Ok(f),
            _ => Err(Error::NotCallable { found: self.kind() }),
        }
    }

    /// Apply this value as a function.
    ///
    /// ```
    /// # use cpsfn::{args, Func, Value};
    /// let double = Value::from(Func::new(|args| Ok(Value::from(args.int(0)? * 2))));
    /// assert_eq!(double.call(args![21]), Ok(Value::Int(42)));
    /// assert!(Value::Int(3).call(args![1]).is_err());
    /// ```
    pub fn call(&self, args: Args) -> CallbackResult<Value> {
        self.as_func()?.call(args)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Value { Value::Unit }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value { Value::Bool(b) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value { Value::Int(n as i64) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value { Value::Int(n) }
}

impl From<f64> for Value {
    fn from(x: f64) -> Value { Value::Float(x) }
}

impl<'a> From<&'a str> for Value {
    fn from(s: &'a str) -> Value { Value::Str(s.into()) }
}

impl From<String> for Value {
    fn from(s: String) -> Value { Value::Str(s.into()) }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value { Value::List(items) }
}

impl From<Func> for Value {
    fn from(f: Func) -> Value { Value::Func(f) }
}


/// The arguments of a single emission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    /// An empty argument tuple.
    pub fn new() -> Args {
        Args(vec![])
    }

    /// An argument tuple holding exactly one value.
    pub fn one<V: Into<Value>>(value: V) -> Args {
        Args(vec![value.into()])
    }

    /// The argument at `index`.
    pub fn arg(&self, index: usize) -> CallbackResult<&Value> {
        self.0.get(index).ok_or(Error::MissingArgument { index })
    }

    /// The integer argument at `index`.
    pub fn int(&self, index: usize) -> CallbackResult<i64> {
        self.arg(index)?.as_int()
    }

    /// The numeric argument at `index`.
    pub fn float(&self, index: usize) -> CallbackResult<f64> {
        self.arg(index)?.as_float()
    }

    /// Append an argument.
    pub fn push<V: Into<Value>>(&mut self, value: V) {
        self.0.push(value.into());
    }

    /// Append all arguments of another tuple.
    pub fn concat(mut self, other: Args) -> Args {
        self.0.extend(other.0);
        self
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Args {
    type Target = [Value];
    fn deref(&self) -> &[Value] { &self.0 }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Args { Args(values) }
}

impl std::iter::FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Args {
        Args(iter.into_iter().collect())
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}


/// A function value.
///
/// Takes the whole argument tuple of an emission and returns a single value.
#[derive(Clone)]
pub struct Func(Arc<dyn Fn(Args) -> CallbackResult<Value> + Send + Sync + 'static>);

impl Func {
    /// Wrap a closure into a function value.
    pub fn new<F>(f: F) -> Func
        where F: Fn(Args) -> CallbackResult<Value> + Send + Sync + 'static,
    {
        Func(Arc::new(f))
    }

    /// Apply the function.
    pub fn call(&self, args: Args) -> CallbackResult<Value> {
        (self.0)(args)
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Func) -> bool {
        Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Func({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}


/// Build an [`Args`] tuple, converting every element with `Value::from`.
///
/// ```
/// # use cpsfn::{args, Value};
/// let a = args![1, "two", 3.0];
/// assert_eq!(a[1], Value::from("two"));
/// assert_eq!(args![].len(), 0);
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        $crate::Args::from(::std::vec![$($crate::Value::from($value)),*])
    };
}
