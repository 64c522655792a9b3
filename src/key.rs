// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A dynamically typed table key, so one table can mix integer, float,
/// string and tuple keys.
///
/// Floats compare by value with `-0.0 == 0.0` and every NaN equal to every
/// other NaN, which keeps `Eq` and `Hash` consistent.
#[derive(Debug, Clone)]
pub enum Key {
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Key>),
}

fn canonical_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Int(l), Key::Int(r)) => l == r,
            (Key::Float(l), Key::Float(r)) => canonical_bits(*l) == canonical_bits(*r),
            (Key::Str(l), Key::Str(r)) => l == r,
            (Key::Tuple(l), Key::Tuple(r)) => l == r,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Int(i) => i.hash(state),
            Key::Float(f) => canonical_bits(*f).hash(state),
            Key::Str(s) => s.hash(state),
            Key::Tuple(items) => items.hash(state),
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Float(x) => write!(f, "{x:?}"),
            Key::Str(s) => write!(f, "{s}"),
            Key::Tuple(items) => {
                write!(f, "(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Integers first, then floats; anything else is kept as a string.
impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Key::Int(i));
        }
        if let Ok(f) = s.parse::<f64>() {
            return Ok(Key::Float(f));
        }
        Ok(Key::Str(s.to_string()))
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<f64> for Key {
    fn from(v: f64) -> Self {
        Key::Float(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Str(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Str(v)
    }
}

impl From<Vec<Key>> for Key {
    fn from(v: Vec<Key>) -> Self {
        Key::Tuple(v)
    }
}

impl<A, B> From<(A, B)> for Key
where
    A: Into<Key>,
    B: Into<Key>,
{
    fn from((a, b): (A, B)) -> Self {
        Key::Tuple(vec![a.into(), b.into()])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    use super::Key;

    #[test]
    fn parse_prefers_numbers() {
        assert_eq!("42".parse::<Key>().unwrap(), Key::Int(42));
        assert_eq!("-7".parse::<Key>().unwrap(), Key::Int(-7));
        assert_eq!("2.5".parse::<Key>().unwrap(), Key::Float(2.5));
        assert_eq!("key1".parse::<Key>().unwrap(), Key::from("key1"));
    }

    #[test]
    fn variants_never_compare_equal() {
        assert_ne!(Key::Int(1), Key::Float(1.0));
        assert_ne!(Key::Int(1), Key::from("1"));
        assert_ne!(Key::from((1i64, 2i64)), Key::from((2i64, 1i64)));
    }

    #[test]
    fn float_equality_is_consistent_with_hash() {
        let state = RandomState::new();
        let zero = Key::Float(0.0);
        let negative_zero = Key::Float(-0.0);
        assert_eq!(zero, negative_zero);
        assert_eq!(state.hash_one(&zero), state.hash_one(&negative_zero));
        let nan = Key::Float(f64::NAN);
        let other_nan = Key::Float(-f64::NAN);
        assert_eq!(nan, other_nan);
        assert_eq!(state.hash_one(&nan), state.hash_one(&other_nan));
    }

    #[test]
    fn display() {
        assert_eq!(Key::from((1i64, "a")).to_string(), "(1, a)");
        assert_eq!(Key::Tuple(vec![Key::Int(1)]).to_string(), "(1,)");
        assert_eq!(Key::Float(2.0).to_string(), "2.0");
    }
}
