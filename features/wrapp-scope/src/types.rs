use std::{
    any::{Any, TypeId},
    rc::Rc,
};

/// Boxed error returned by fallible listeners
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Scopes live on a single thread, so anything stored only needs a static lifetime
pub trait Injectable: 'static {}
impl<T: 'static> Injectable for T {}

/// A stored service instance
#[derive(Clone)]
pub struct Instance {
    pub(crate) info: TypeInfo,
    pub(crate) instance: Rc<dyn Any>,
}

impl Instance {
    pub(crate) fn new<T: Injectable>(instance: Rc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Rc<T>, &'static str> {
        match Rc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

/// Name and id of a stored type
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub(crate) type_name: &'static str,
    pub(crate) type_id: TypeId,
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
