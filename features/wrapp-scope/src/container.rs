use std::{collections::HashMap, fmt::Debug, marker::PhantomData, rc::Rc};

use crate::types::{Injectable, Instance, TypeInfo};

/// A statically declared key of the shape `S`, resolving to a `T`
///
/// Keys are usually declared as associated consts on the shape's marker type:
///
/// ```rust
/// use wrapp_scope::container::Key;
///
/// struct AppDeps;
/// impl AppDeps {
///     const GREETING: Key<AppDeps, String> = Key::new("greeting");
/// }
/// ```
pub struct Key<S, T> {
    name: &'static str,
    _marker: PhantomData<fn() -> (S, T)>,
}
impl<S, T> Key<S, T> {
    pub const fn new(name: &'static str) -> Self {
        Key {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
impl<S, T: 'static> Key<S, T> {
    fn id(&self) -> KeyId {
        KeyId {
            name: self.name,
            value: TypeInfo::of::<T>(),
        }
    }
}
// Manual impls, the marker types need not be Clone
impl<S, T> Clone for Key<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<S, T> Copy for Key<S, T> {}
impl<S, T> Debug for Key<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// Name and value type of a key
///
/// Two keys with the same name but different value types never collide.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct KeyId {
    name: &'static str,
    value: TypeInfo,
}

/// A partial assignment of keys for a container of shape `S`
///
/// Keys which are not part of the assignment are left untouched by [Container::set].
pub struct Deps<S> {
    entries: HashMap<KeyId, Option<Instance>>,
    _shape: PhantomData<fn() -> S>,
}
impl<S> Default for Deps<S> {
    fn default() -> Self {
        Self::new()
    }
}
impl<S> Deps<S> {
    pub fn new() -> Self {
        Deps {
            entries: HashMap::new(),
            _shape: PhantomData,
        }
    }

    /// Assigns an existing shared instance
    pub fn with<T: Injectable>(mut self, key: Key<S, T>, instance: Rc<T>) -> Self {
        self.entries.insert(key.id(), Some(Instance::new(instance)));
        self
    }

    /// Assigns an instance, moving it behind an `Rc`
    pub fn with_value<T: Injectable>(self, key: Key<S, T>, value: T) -> Self {
        self.with(key, Rc::new(value))
    }

    /// Explicitly assigns "no value", overwriting whatever the key held before
    pub fn absent<T: Injectable>(mut self, key: Key<S, T>) -> Self {
        self.entries.insert(key.id(), None);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keyed store of service instances
///
/// The container only references its services, constructing and tearing them down is up to the caller.
pub struct Container<S> {
    instances: HashMap<KeyId, Option<Instance>>,
    _shape: PhantomData<fn() -> S>,
}
impl<S> Debug for Container<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Container");
        for (id, instance) in &self.instances {
            let val = if instance.is_some() { "set" } else { "absent" };
            map.field(id.name, &val);
        }
        map.finish()
    }
}
impl<S> Default for Container<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Container<S> {
    pub fn new() -> Self {
        Container {
            instances: HashMap::new(),
            _shape: PhantomData,
        }
    }

    /// Merges the given assignment into the container
    ///
    /// Keys present in `deps` overwrite, all other keys keep their value.
    pub fn set(&mut self, deps: Deps<S>) {
        tracing::debug!("Setting {} entries on container", deps.len());
        self.instances.extend(deps.entries);
    }

    /// Returns the instance stored under `key`, if any
    pub fn get<T: Injectable>(&self, key: Key<S, T>) -> Option<Rc<T>> {
        let instance = self.instances.get(&key.id())?.as_ref()?;
        match instance.downcast() {
            Ok(instance) => Some(instance),
            Err(actual_type) => {
                // KeyId includes the value type, so this is unreachable through the public API
                tracing::error!(
                    "Key '{}' holds '{}' instead of '{}'",
                    key.name(),
                    actual_type,
                    std::any::type_name::<T>()
                );
                None
            }
        }
    }

    /// Returns true if `key` currently holds a value
    pub fn contains<T: Injectable>(&self, key: Key<S, T>) -> bool {
        matches!(self.instances.get(&key.id()), Some(Some(_)))
    }

    /// Number of keys holding a value
    pub fn len(&self) -> usize {
        self.instances.values().filter(|i| i.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
