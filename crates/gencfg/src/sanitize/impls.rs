//! [`Sanitize`] for standard library types.

use super::{Field, Sanitize, Sanitizer};
use crate::SanitizeError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use std::hash::{BuildHasher, Hash};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

impl Sanitize for String {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        sanitizer.apply_text(field, self)
    }
}

impl Sanitize for PathBuf {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        // paths that are not UTF-8 cannot go through the string operations
        let Some(text) = self.to_str() else {
            return sanitizer.apply_other(field);
        };
        let mut text = text.to_string();
        sanitizer.apply_text(field, &mut text)?;
        *self = PathBuf::from(text);
        Ok(())
    }
}

macro_rules! impl_sanitize_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sanitize for $ty {
                fn sanitize(
                    &mut self,
                    field: &Field<'_>,
                    sanitizer: &Sanitizer,
                ) -> Result<(), SanitizeError> {
                    sanitizer.apply_other(field)
                }
            }
        )*
    };
}

impl_sanitize_leaf!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    Duration, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        match self {
            Some(value) => value.sanitize(field, sanitizer),
            None => Ok(()),
        }
    }
}

impl<T: Sanitize + ?Sized> Sanitize for Box<T> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        (**self).sanitize(field, sanitizer)
    }
}

impl<T: Sanitize> Sanitize for [T] {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        for (index, item) in self.iter_mut().enumerate() {
            item.sanitize(field, sanitizer)
                .map_err(|source| SanitizeError::Index {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

impl<T: Sanitize, const N: usize> Sanitize for [T; N] {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        self.as_mut_slice().sanitize(field, sanitizer)
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        self.as_mut_slice().sanitize(field, sanitizer)
    }
}

/// Values are updated in place through `iter_mut`.
fn sanitize_entries<'a, K, V, I>(
    entries: I,
    field: &Field<'_>,
    sanitizer: &Sanitizer,
) -> Result<(), SanitizeError>
where
    K: Display + 'a,
    V: Sanitize + 'a,
    I: Iterator<Item = (&'a K, &'a mut V)>,
{
    for (key, value) in entries {
        value
            .sanitize(field, sanitizer)
            .map_err(|source| SanitizeError::Key {
                key: key.to_string(),
                source: Box::new(source),
            })?;
    }
    Ok(())
}

impl<K: Display, V: Sanitize, S: BuildHasher> Sanitize for HashMap<K, V, S> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        sanitize_entries(self.iter_mut(), field, sanitizer)
    }
}

impl<K: Display, V: Sanitize> Sanitize for BTreeMap<K, V> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        sanitize_entries(self.iter_mut(), field, sanitizer)
    }
}

// Set elements cannot be changed in place; they are taken out, sanitized
// and inserted again, so two values cleaning to the same text merge.
impl<T: Sanitize + Eq + Hash, S: BuildHasher> Sanitize for HashSet<T, S> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        let mut items: Vec<T> = self.drain().collect();
        let result = items.as_mut_slice().sanitize(field, sanitizer);
        self.extend(items);
        result
    }
}

impl<T: Sanitize + Ord> Sanitize for BTreeSet<T> {
    fn sanitize(&mut self, field: &Field<'_>, sanitizer: &Sanitizer) -> Result<(), SanitizeError> {
        let mut items: Vec<T> = std::mem::take(self).into_iter().collect();
        let result = items.as_mut_slice().sanitize(field, sanitizer);
        self.extend(items);
        result
    }
}
