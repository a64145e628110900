//! Mutable, versioned application objects over immutable content.
//!
//! A [`NetworkObject`] wraps a [`TrackedValue`] and binds it to a name. Each
//! successful `save` publishes the value as a new version of that name,
//! `update` fetches the newest version (or a specific one), and `save_as_gone`
//! publishes a tombstone version. A single instance is not meant to be
//! mutated from several threads at once.

use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;
use tracing::{debug, info};

use ccn_codec::{ContentObject, ContentType};
use ccn_core::versioning::{is_versioned, version_as_timestamp, version_name, version_root};
use ccn_core::{CcnTime, Name};
use ccn_crypto::SigningError;

use crate::flow::{FlowController, FlowError};
use crate::library::Library;
use crate::marshal::{CborCodec, MarshalError, PayloadCodec};
use crate::reader::{ReadError, StreamContent};
use crate::tracked::TrackedValue;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObjectError {
    #[error("cannot retrieve or save without a name")]
    Unnamed,
    #[error("cannot save past versions as gone: {0}")]
    AlreadyVersioned(Name),
    #[error("no value to save")]
    NoValue,
    #[error("marshal error: {0}")]
    Marshal(#[from] MarshalError),
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("flow error: {0}")]
    Flow(#[from] FlowError),
}

impl From<SigningError> for ObjectError {
    fn from(err: SigningError) -> Self {
        Self::Flow(FlowError::Signing(err))
    }
}

impl ObjectError {
    /// Precondition violations, as opposed to network or payload failures.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Unnamed | Self::AlreadyVersioned(_) | Self::NoValue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Nothing fetched or saved yet.
    Unbound,
    Clean,
    Dirty,
    /// Last resolution was a tombstone.
    Gone,
}

pub struct NetworkObject<E, C = CborCodec> {
    library: Library,
    value: TrackedValue<E>,
    name: Option<Name>,
    bound: bool,
    gone: bool,
    flow: FlowController,
    codec: PhantomData<fn() -> C>,
}

impl<E, C> NetworkObject<E, C>
where
    C: PayloadCodec<E>,
{
    /// An unnamed object with no value.
    pub fn new(library: &Library) -> Self {
        Self::build(library, None, TrackedValue::empty())
    }

    /// An object that remembers `name` but has fetched nothing yet.
    pub fn named(library: &Library, name: Name) -> Self {
        Self::build(library, Some(name), TrackedValue::empty())
    }

    /// An object holding an initial, unsaved value.
    pub fn with_value(library: &Library, name: Option<Name>, data: E) -> Self {
        Self::build(library, name, TrackedValue::with_value(data))
    }

    /// Builds an object from a unit already retrieved, reading the rest of
    /// its stream.
    pub fn from_content(library: &Library, first: ContentObject) -> Result<Self, ObjectError> {
        let mut object = Self::new(library);
        object.update_from(first)?;
        Ok(object)
    }

    fn build(library: &Library, name: Option<Name>, value: TrackedValue<E>) -> Self {
        Self {
            library: library.clone(),
            value,
            name,
            bound: false,
            gone: false,
            flow: library.flow_controller(),
            codec: PhantomData,
        }
    }

    /// Fetches the latest version of the remembered name.
    pub fn update(&mut self) -> Result<(), ObjectError> {
        let name = self.name.as_ref().ok_or(ObjectError::Unnamed)?;
        let root = version_root(name);
        self.update_name(&root)
    }

    /// Fetches the stream at `name`: that version if `name` is versioned,
    /// otherwise the latest one.
    pub fn update_name(&mut self, name: &Name) -> Result<(), ObjectError> {
        info!(name = %name, "updating object");
        let read = self.library.reader().read(name);
        self.absorb(read)
    }

    /// Reads the stream that starts at (or contains) `first`.
    pub fn update_from(&mut self, first: ContentObject) -> Result<(), ObjectError> {
        info!(name = %first.name, "updating object from content");
        let read = self.library.reader().read_from(first);
        self.absorb(read)
    }

    fn absorb(&mut self, read: Result<StreamContent, ReadError>) -> Result<(), ObjectError> {
        match read {
            Ok(stream) => {
                let data = C::decode(&stream.content)?;
                self.flow.add_namespace(&stream.name)?;
                self.value.replace_clean(data);
                info!(name = %stream.name, segments = stream.segments, "object updated");
                self.name = Some(stream.name);
                self.bound = true;
                self.gone = false;
                Ok(())
            }
            Err(ReadError::Gone { name }) => {
                info!(name = %name, "object is gone");
                self.value.mark_clean();
                self.name = Some(name);
                self.bound = true;
                self.gone = true;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Saves as a new version of the bound root. Returns whether anything
    /// was published.
    pub fn save(&mut self) -> Result<bool, ObjectError> {
        let name = self.name.as_ref().ok_or(ObjectError::Unnamed)?;
        let root = version_root(name);
        self.save_to(&root)
    }

    /// Publishes the value under `name`, versioning it unless it already is.
    /// Does nothing when the value is clean.
    pub fn save_to(&mut self, name: &Name) -> Result<bool, ObjectError> {
        if !self.value.is_dirty() {
            debug!(name = %name, "object is clean, skipping save");
            return Ok(false);
        }
        let data = self.value.data().ok_or(ObjectError::NoValue)?;
        let payload = C::encode(data)?;
        let target = version_name(name);

        self.flow.add_namespace(&version_root(name))?;
        let units = self
            .library
            .segmenter()
            .segment(&target, &payload, ContentType::Data)?;
        let segments = units.len();
        self.flow.put_all(units)?;

        self.value.mark_saved(saved_at(&target));
        info!(name = %target, segments, bytes = payload.len(), "object saved");
        self.name = Some(target);
        self.bound = true;
        self.gone = false;
        Ok(true)
    }

    /// Publishes a tombstone as a new version of the unversioned `name`.
    pub fn save_as_gone(&mut self, name: &Name) -> Result<(), ObjectError> {
        if is_versioned(name) {
            return Err(ObjectError::AlreadyVersioned(name.clone()));
        }
        let target = version_name(name);
        let unit = self.library.segmenter().gone(&target)?;
        self.flow.add_namespace(name)?;
        self.flow.put(unit)?;

        self.value.mark_saved(saved_at(&target));
        info!(name = %target, "tombstone published");
        self.name = Some(target);
        self.bound = true;
        self.gone = true;
        Ok(())
    }

    /// Tombstones the unversioned root of the bound name.
    pub fn save_root_as_gone(&mut self) -> Result<(), ObjectError> {
        let name = self.name.as_ref().ok_or(ObjectError::Unnamed)?;
        let root = version_root(name);
        self.save_as_gone(&root)
    }
}

impl<E, C> NetworkObject<E, C> {
    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    /// Version of the bound name, once something was fetched or saved.
    pub fn version(&self) -> Option<CcnTime> {
        if !self.bound {
            return None;
        }
        self.name
            .as_ref()
            .and_then(|name| version_as_timestamp(name).ok())
    }

    pub fn state(&self) -> ObjectState {
        if self.gone {
            ObjectState::Gone
        } else if self.value.is_dirty() {
            ObjectState::Dirty
        } else if self.bound {
            ObjectState::Clean
        } else {
            ObjectState::Unbound
        }
    }

    pub fn is_gone(&self) -> bool {
        self.gone
    }

    pub fn is_dirty(&self) -> bool {
        self.value.is_dirty()
    }

    pub fn is_available(&self) -> bool {
        self.value.is_available()
    }

    pub fn last_saved(&self) -> Option<CcnTime> {
        self.value.last_saved()
    }

    pub fn data(&self) -> Option<&E> {
        self.value.data()
    }

    pub fn set_data(&mut self, data: E) {
        self.value.set_data(data);
    }

    pub fn data_mut(&mut self) -> Option<&mut E> {
        self.value.data_mut()
    }

    /// Namespaces this object may publish under.
    pub fn namespaces(&self) -> Vec<Name> {
        self.flow.namespaces()
    }
}

fn saved_at(target: &Name) -> CcnTime {
    version_as_timestamp(target).unwrap_or_else(|_| CcnTime::now())
}

impl<E: PartialEq, C> PartialEq for NetworkObject<E, C> {
    fn eq(&self, other: &Self) -> bool {
        self.value.data() == other.value.data() && self.name == other.name
    }
}

impl<E: fmt::Debug, C> fmt::Debug for NetworkObject<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkObject")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("data", &self.value.data())
            .finish()
    }
}
