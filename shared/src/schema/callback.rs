use std::any::type_name;

/// When a post-synchronization callback fires on a replica
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackMode {
    /// Once, after the object was constructed and all of its members applied
    Constructed,
    /// After construction, and again after every read that changed the object
    EveryUpdate,
}

/// A zero-argument hook run on a replica after members are applied
pub struct SyncCallback<T> {
    name: String,
    mode: CallbackMode,
    parameters: Vec<&'static str>,
    pub(crate) handler: Box<dyn Fn(&mut T)>,
}

impl<T> SyncCallback<T> {
    pub fn new(name: &str, mode: CallbackMode, handler: impl Fn(&mut T) + 'static) -> Self {
        Self {
            name: name.to_string(),
            mode,
            parameters: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Declares a parameter of type `P`. Replicas cannot supply callback
    /// arguments, so a type declaring one fails validation.
    pub fn with_parameter<P: 'static>(mut self) -> Self {
        self.parameters.push(type_name::<P>());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> CallbackMode {
        self.mode
    }

    pub fn parameters(&self) -> &[&'static str] {
        &self.parameters
    }

    pub(crate) fn info(&self) -> CallbackInfo {
        CallbackInfo {
            name: self.name.clone(),
            mode: self.mode,
            parameter_count: self.parameters.len(),
        }
    }
}

/// Erased description of a type's callback
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackInfo {
    pub name: String,
    pub mode: CallbackMode,
    pub parameter_count: usize,
}
