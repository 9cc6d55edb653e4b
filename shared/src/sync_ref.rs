use std::{
    any::{type_name, Any, TypeId},
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

/// Shared handle to an object taking part in replication. Two handles are
/// equal only if they point at the same object.
pub struct SyncRef<T>(Rc<RefCell<T>>);

impl<T> SyncRef<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for SyncRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PartialEq for SyncRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for SyncRef<T> {}

impl<T: fmt::Debug> fmt::Debug for SyncRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("SyncRef").field(&*value).finish(),
            Err(_) => f.write_str("SyncRef(<borrowed>)"),
        }
    }
}

/// Identity of a tracked object, stable for as long as a handle is alive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefKey(usize);

/// Type-erased [`SyncRef`], as held by reference pools
#[derive(Clone)]
pub struct AnyRef {
    inner: Rc<dyn Any>,
    object_type: TypeId,
    type_name: &'static str,
}

impl AnyRef {
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_ref(&SyncRef::new(value))
    }

    pub fn from_ref<T: 'static>(reference: &SyncRef<T>) -> Self {
        let inner: Rc<dyn Any> = reference.0.clone();
        Self {
            inner,
            object_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// `TypeId` of the referenced object, not of the handle
    pub fn object_type(&self) -> TypeId {
        self.object_type
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.object_type == TypeId::of::<T>()
    }

    pub fn downcast<T: 'static>(&self) -> Option<SyncRef<T>> {
        self.inner.clone().downcast::<RefCell<T>>().ok().map(SyncRef)
    }

    pub fn downcast_cell<T: 'static>(&self) -> Option<&RefCell<T>> {
        self.inner.downcast_ref::<RefCell<T>>()
    }

    pub fn key(&self) -> RefKey {
        RefKey(Rc::as_ptr(&self.inner) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &AnyRef) -> bool {
        self.key() == other.key()
    }
}

impl<T: 'static> From<&SyncRef<T>> for AnyRef {
    fn from(reference: &SyncRef<T>) -> Self {
        Self::from_ref(reference)
    }
}

impl fmt::Debug for AnyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyRef<{}>({:#x})", self.type_name, self.key().0)
    }
}
