use ccn_core::CcnTime;

/// A value plus the bookkeeping needed to know whether it must be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedValue<E> {
    data: Option<E>,
    dirty: bool,
    last_saved: Option<CcnTime>,
}

impl<E> TrackedValue<E> {
    pub fn empty() -> Self {
        Self {
            data: None,
            dirty: false,
            last_saved: None,
        }
    }

    /// An initial value counts as an unsaved change.
    pub fn with_value(data: E) -> Self {
        Self {
            data: Some(data),
            dirty: true,
            last_saved: None,
        }
    }

    pub fn data(&self) -> Option<&E> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: E) {
        self.data = Some(data);
        self.dirty = true;
    }

    /// Mutable access; assumed to modify the value.
    pub fn data_mut(&mut self) -> Option<&mut E> {
        if self.data.is_some() {
            self.dirty = true;
        }
        self.data.as_mut()
    }

    /// Installs a value read from the network; it is clean by definition.
    pub fn replace_clean(&mut self, data: E) {
        self.data = Some(data);
        self.dirty = false;
    }

    pub fn mark_saved(&mut self, at: CcnTime) {
        self.dirty = false;
        self.last_saved = Some(at);
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_available(&self) -> bool {
        self.data.is_some()
    }

    pub fn last_saved(&self) -> Option<CcnTime> {
        self.last_saved
    }
}

impl<E> Default for TrackedValue<E> {
    fn default() -> Self {
        Self::empty()
    }
}
