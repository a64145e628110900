use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use ccn_core::{Component, Name, PublisherKey};

use crate::content::ContentObject;
use crate::error::CodecError;

/// Which end of the matching set an interest prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildSelector {
    #[default]
    Leftmost,
    Rightmost,
}

/// Exclusion filter applied to the component right after the interest prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclude {
    /// Everything ordered at or below this component is excluded.
    pub through: Option<Component>,
    pub components: BTreeSet<Component>,
}

impl Exclude {
    /// Excludes every component up to and including `component`.
    pub fn through(component: Component) -> Self {
        Self {
            through: Some(component),
            components: BTreeSet::new(),
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.insert(component);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.through.is_none() && self.components.is_empty()
    }

    pub fn excludes(&self, component: &Component) -> bool {
        if self.through.as_ref().is_some_and(|bound| component <= bound) {
            return true;
        }
        self.components.contains(component)
    }
}

/// A pull request for data units under a name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interest {
    pub name: Name,
    pub min_suffix_components: Option<usize>,
    pub max_suffix_components: Option<usize>,
    pub child_selector: ChildSelector,
    pub exclude: Exclude,
    /// Only accept units signed by this publisher.
    pub publisher: Option<PublisherKey>,
}

impl Interest {
    /// Matches anything at or below `name`.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            min_suffix_components: None,
            max_suffix_components: None,
            child_selector: ChildSelector::Leftmost,
            exclude: Exclude::default(),
            publisher: None,
        }
    }

    /// Matches only a unit named exactly `name`.
    pub fn exact(name: Name) -> Self {
        Self::new(name).with_max_suffix_components(0)
    }

    pub fn with_min_suffix_components(mut self, min: usize) -> Self {
        self.min_suffix_components = Some(min);
        self
    }

    pub fn with_max_suffix_components(mut self, max: usize) -> Self {
        self.max_suffix_components = Some(max);
        self
    }

    pub fn with_child_selector(mut self, selector: ChildSelector) -> Self {
        self.child_selector = selector;
        self
    }

    pub fn with_exclude(mut self, exclude: Exclude) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_publisher(mut self, publisher: PublisherKey) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        if let (Some(min), Some(max)) = (self.min_suffix_components, self.max_suffix_components) {
            if min > max {
                return Err(CodecError::InvalidInterest(
                    "min suffix components exceeds max",
                ));
            }
        }
        Ok(())
    }

    /// Whether `name` falls under this interest's prefix, suffix bounds and exclusion.
    pub fn matches_name(&self, name: &Name) -> bool {
        if !self.name.is_prefix_of(name) {
            return false;
        }
        let suffix = name.len() - self.name.len();
        if self.min_suffix_components.is_some_and(|min| suffix < min) {
            return false;
        }
        if self.max_suffix_components.is_some_and(|max| suffix > max) {
            return false;
        }
        match name.component(self.name.len()) {
            Some(next) => !self.exclude.excludes(next),
            None => true,
        }
    }

    pub fn matches(&self, object: &ContentObject) -> bool {
        if let Some(publisher) = &self.publisher {
            if &object.signed_info.publisher != publisher {
                return false;
            }
        }
        self.matches_name(&object.name)
    }

    /// Picks the preferred match among `candidates` according to the child selector.
    pub fn select<'a, I>(&self, candidates: I) -> Option<&'a ContentObject>
    where
        I: IntoIterator<Item = &'a ContentObject>,
    {
        let matching = candidates.into_iter().filter(|c| self.matches(c));
        match self.child_selector {
            ChildSelector::Leftmost => matching.min_by(|a, b| a.name.cmp(&b.name)),
            ChildSelector::Rightmost => matching.max_by(|a, b| a.name.cmp(&b.name)),
        }
    }
}

/// Encodes an `Interest` as CBOR after validation.
pub fn encode_interest_cbor(interest: &Interest) -> Result<Vec<u8>, CodecError> {
    interest.validate()?;
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(interest, &mut bytes)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(bytes)
}

pub fn decode_interest_cbor(bytes: &[u8]) -> Result<Interest, CodecError> {
    let interest: Interest =
        ciborium::de::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    interest.validate()?;
    Ok(interest)
}
