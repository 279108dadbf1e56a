//! `Capture` for standard library, chrono, bytes and serde_json types.

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::BuildHasher;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::capture::{Capture, MapShape, Shape, TypeDesc};
use crate::events::Scalar;

macro_rules! capture_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Capture for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(Scalar::from(*self))
                }
            }
        )*
    };
}

capture_scalar! {
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    NaiveDateTime, NaiveDate, NaiveTime, Duration,
    DateTime<Utc>, DateTime<FixedOffset>, DateTime<Local>,
}

macro_rules! capture_display_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Capture for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(Scalar::Other(self.to_string()))
                }
            }
        )*
    };
}

capture_display_scalar! { IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr }

impl Capture for PathBuf {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Other(self.display().to_string()))
    }
}

impl Capture for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }
}

impl Capture for &'static str {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }
}

impl Capture for Cow<'static, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }
}

impl Capture for Box<str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }
}

impl Capture for Arc<str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }
}

impl Capture for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Null
    }
}

impl<T: Capture> Capture for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(inner) => Shape::Transparent(inner),
            None => Shape::Null,
        }
    }
}

macro_rules! capture_transparent {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Capture> Capture for $wrapper<T> {
                fn shape(&self) -> Shape<'_> {
                    Shape::Transparent(&**self)
                }
            }
        )*
    };
}

capture_transparent!(Box, Arc, Rc);

macro_rules! capture_seq {
    ($($coll:ident),*) => {
        $(
            impl<T: Capture> Capture for $coll<T> {
                fn shape(&self) -> Shape<'_> {
                    Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
                }
            }
        )*
    };
}

capture_seq!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: Capture, S: BuildHasher + 'static> Capture for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
    }
}

impl<T: Capture, const N: usize> Capture for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
    }
}

impl<T: Capture> Capture for Box<[T]> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
    }
}

impl<T: Capture> Capture for &'static [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
    }
}

impl Capture for bytes::Bytes {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
    }
}

impl Capture for bytes::BytesMut {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(Box::new(self.iter().map(|v| v as &dyn Capture)))
    }
}

impl<K: Capture, V: Capture, S: BuildHasher + 'static> Capture for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(MapShape {
            key_type: K::describe(),
            standard: true,
            entries: Box::new(self.iter().map(|(k, v)| (k as &dyn Capture, v as &dyn Capture))),
        })
    }
}

impl<K: Capture, V: Capture> Capture for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(MapShape {
            key_type: K::describe(),
            standard: true,
            entries: Box::new(self.iter().map(|(k, v)| (k as &dyn Capture, v as &dyn Capture))),
        })
    }
}

impl<K: Capture, V: Capture, S: BuildHasher + 'static> Capture for indexmap::IndexMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(MapShape {
            key_type: K::describe(),
            standard: true,
            entries: Box::new(self.iter().map(|(k, v)| (k as &dyn Capture, v as &dyn Capture))),
        })
    }
}

macro_rules! capture_tuple {
    ($(($($name:ident . $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: Capture),+> Capture for ($($name,)+) {
                fn shape(&self) -> Shape<'_> {
                    Shape::Tuple(vec![$(&self.$idx as &dyn Capture),+])
                }
            }
        )*
    };
}

capture_tuple! {
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
    (A.0, B.1, C.2, D.3, E.4),
    (A.0, B.1, C.2, D.3, E.4, F.5),
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6),
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7),
}

macro_rules! capture_fn {
    ($(($($arg:ident),*)),* $(,)?) => {
        $(
            impl<R: 'static, $($arg: 'static),*> Capture for fn($($arg),*) -> R {
                fn shape(&self) -> Shape<'_> {
                    Shape::Function
                }
            }
        )*
    };
}

capture_fn! { (), (A), (A, B), (A, B, C) }

impl Capture for TypeDesc {
    fn shape(&self) -> Shape<'_> {
        Shape::TypeInfo
    }

    fn display(&self) -> String {
        self.full_name().to_string()
    }
}

impl Capture for serde_json::Value {
    fn shape(&self) -> Shape<'_> {
        use serde_json::Value;

        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Shape::Scalar(if let Some(i) = n.as_i64() {
                Scalar::I64(i)
            } else if let Some(u) = n.as_u64() {
                Scalar::U64(u)
            } else {
                Scalar::F64(n.as_f64().unwrap_or(f64::NAN))
            }),
            Value::String(s) => Shape::Str(s),
            Value::Array(items) => Shape::Seq(Box::new(items.iter().map(|v| v as &dyn Capture))),
            Value::Object(map) => Shape::Map(MapShape {
                key_type: TypeDesc::of::<String>(),
                standard: true,
                entries: Box::new(map.iter().map(|(k, v)| (k as &dyn Capture, v as &dyn Capture))),
            }),
        }
    }
}

/// Types accepted as dictionary keys without registration.
pub(crate) fn builtin_scalar_types() -> HashSet<TypeId> {
    [
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static str>(),
        TypeId::of::<Cow<'static, str>>(),
        TypeId::of::<Box<str>>(),
        TypeId::of::<Arc<str>>(),
        TypeId::of::<NaiveDateTime>(),
        TypeId::of::<NaiveDate>(),
        TypeId::of::<NaiveTime>(),
        TypeId::of::<Duration>(),
        TypeId::of::<DateTime<Utc>>(),
        TypeId::of::<DateTime<FixedOffset>>(),
        TypeId::of::<DateTime<Local>>(),
        TypeId::of::<IpAddr>(),
        TypeId::of::<Ipv4Addr>(),
        TypeId::of::<Ipv6Addr>(),
        TypeId::of::<SocketAddr>(),
        TypeId::of::<PathBuf>(),
    ]
    .into_iter()
    .collect()
}
