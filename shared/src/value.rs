use std::{
    any::{type_name, Any},
    fmt::Debug,
};

/// A plain value that can be carried by a member and written through a
/// [`FieldCodec`](crate::FieldCodec). Host types implement this and register
/// a codec on the protocol.
pub trait SyncValue: Any + Clone + PartialEq + Debug {}

macro_rules! impl_sync_value {
    ($($ty:ty),*) => {
        $(impl SyncValue for $ty {})*
    };
}

impl_sync_value!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, String);

/// Object-safe view of a [`SyncValue`]
pub trait DynValue: Debug {
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> BoxedValue;
    fn dyn_eq(&self, other: &dyn DynValue) -> bool;
    fn value_type_name(&self) -> &'static str;
}

pub type BoxedValue = Box<dyn DynValue>;

impl<T: SyncValue> DynValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> BoxedValue {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn DynValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl Clone for BoxedValue {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

impl PartialEq for dyn DynValue {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

/// Downcasts an erased value into a concrete one
pub fn downcast_value<T: SyncValue>(value: &dyn DynValue) -> Option<T> {
    value.as_any().downcast_ref::<T>().cloned()
}
