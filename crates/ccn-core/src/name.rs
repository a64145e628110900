//! Hierarchical binary names.
//!
//! A [`Name`] is an ordered sequence of opaque byte-string [`Component`]s.
//! Names are immutable values: every "modifying" helper returns a new name.
//! Ordering is component-wise unsigned byte comparison, with a name that is a
//! strict prefix of another sorting first.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// URI scheme accepted (and ignored) in front of a name.
pub const URI_SCHEME: &str = "ccnx:";

/// One opaque binary name component.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Component(Bytes);

impl Component {
    /// Wraps owned bytes without copying.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Copies a byte slice into a component.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First byte, used by the segment/version marker checks.
    pub fn marker(&self) -> Option<u8> {
        self.0.first().copied()
    }

    fn write_escaped(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let bytes = self.as_bytes();
        if bytes.iter().all(|b| *b == b'.') {
            out.write_str("...")?;
        }
        for b in bytes {
            if is_unreserved(*b) {
                out.write_char(char::from(*b))?;
            } else {
                write!(out, "%{b:02X}")?;
            }
        }
        Ok(())
    }

    fn parse_escaped(text: &str) -> Result<Self, CoreError> {
        let raw = text.as_bytes();
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'%' {
                let hex = raw
                    .get(i + 1..i + 3)
                    .ok_or_else(|| CoreError::InvalidUri(text.to_string()))?;
                let hex =
                    std::str::from_utf8(hex).map_err(|_| CoreError::InvalidUri(text.to_string()))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| CoreError::InvalidUri(text.to_string()))?;
                out.push(byte);
                i += 3;
            } else {
                out.push(raw[i]);
                i += 1;
            }
        }

        if out.iter().all(|b| *b == b'.') {
            // All-dot components carry three extra dots; "." and ".." are not components.
            if out.len() < 3 {
                return Err(CoreError::InvalidUri(text.to_string()));
            }
            out.truncate(out.len() - 3);
        }
        Ok(Self(Bytes::from(out)))
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

impl AsRef<[u8]> for Component {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Self::from_slice(value.as_bytes())
    }
}

impl From<&[u8]> for Component {
    fn from(value: &[u8]) -> Self {
        Self::from_slice(value)
    }
}

impl From<Vec<u8>> for Component {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_escaped(f)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({self})")
    }
}

impl Serialize for Component {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

struct ComponentVisitor;

impl<'de> Visitor<'de> for ComponentVisitor {
    type Value = Component;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a byte string name component")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Component::from_slice(v))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Component::from(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(b) = seq.next_element::<u8>()? {
            out.push(b);
        }
        Ok(Component::from(out))
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_byte_buf(ComponentVisitor)
    }
}

/// Immutable hierarchical name.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// The empty name, rendered as `/`.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, C>(components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a URI such as `/ccnx.org/test/%F8%01` (an optional `ccnx:` scheme is accepted).
    pub fn from_uri(uri: &str) -> Result<Self, CoreError> {
        let path = uri.strip_prefix(URI_SCHEME).unwrap_or(uri);
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if !path.starts_with('/') {
            return Err(CoreError::InvalidUri(uri.to_string()));
        }
        let components = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(Component::parse_escaped)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    /// Appends plain (unescaped) string components to `base`.
    pub fn from_native<'a>(base: &Name, children: impl IntoIterator<Item = &'a str>) -> Self {
        base.append(children.into_iter().map(Component::from))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn last_component(&self) -> Option<&Component> {
        self.components.last()
    }

    /// New name with one extra trailing component.
    pub fn child(&self, component: impl Into<Component>) -> Self {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend_from_slice(&self.components);
        components.push(component.into());
        Self { components }
    }

    /// New name with all of `components` appended.
    pub fn append<I, C>(&self, components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        let mut out = self.components.clone();
        out.extend(components.into_iter().map(Into::into));
        Self { components: out }
    }

    /// The first `count` components (the whole name when `count >= len`).
    pub fn prefix(&self, count: usize) -> Self {
        let count = count.min(self.components.len());
        Self {
            components: self.components[..count].to_vec(),
        }
    }

    /// This name with its last component removed (the root stays the root).
    pub fn cut_last(&self) -> Self {
        self.prefix(self.components.len().saturating_sub(1))
    }

    /// Whether every component of `self` leads `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.components.len() >= self.components.len()
            && other.components[..self.components.len()] == self.components[..]
    }

    /// Renders the escaped URI form.
    pub fn to_uri(&self) -> String {
        self.to_string()
    }
}

impl<C: Into<Component>> FromIterator<C> for Name {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl FromStr for Name {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            f.write_str("/")?;
            component.write_escaped(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}
