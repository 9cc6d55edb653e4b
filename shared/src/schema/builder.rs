use std::{
    any::{type_name, TypeId},
    collections::HashSet,
    cell::RefCell,
};

use crate::{
    mutator::PropertyMutator,
    policy::SyncPolicy,
    sync_ref::{AnyRef, SyncRef},
    types::MemberIndex,
    value::{downcast_value, SyncValue},
};

use super::{
    callback::CallbackInfo, ConstructorArgs, ConstructorError, ConstructorParam, MemberDescriptor,
    MemberKind, MemberValue, ObjectSchema, SchemaError, SyncCallback,
};

type Getter<T> = Box<dyn Fn(&T) -> MemberValue>;
// returns false when handed a value of the wrong kind or type
type Setter<T> = Box<dyn Fn(&mut T, MemberValue) -> bool>;
type Construct<T> = Box<dyn Fn(&mut ConstructorArgs) -> Result<T, ConstructorError>>;
type InstallMutator<T> = Box<dyn Fn(&mut T, PropertyMutator)>;

struct Accessor<T> {
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

struct Constructor<T> {
    params: Vec<ConstructorParam>,
    construct: Construct<T>,
}

/// Explicit registration of a type's synchronized members, in wire order.
///
/// ```ignore
/// let player = SchemaBuilder::<Player>::new("Player")
///     .value("x", SyncPolicy::Interpolated, |p| p.x, |p, v| p.x = v)
///     .get_only_value("name", |p| p.name.clone())
///     .constructor(vec![ConstructorParam::member("name")], |args| {
///         Ok(Player::new(args.value("name")?))
///     });
/// ```
pub struct SchemaBuilder<T> {
    name: String,
    descriptors: Vec<MemberDescriptor>,
    accessors: Vec<Accessor<T>>,
    constructor: Option<Constructor<T>>,
    callback: Option<SyncCallback<T>>,
    change_notification: Option<InstallMutator<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// `name` identifies the type on the wire and must be unique within a
    /// protocol
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptors: Vec::new(),
            accessors: Vec::new(),
            constructor: None,
            callback: None,
            change_notification: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value<V: SyncValue>(
        self,
        name: &str,
        policy: SyncPolicy,
        get: impl Fn(&T) -> V + 'static,
        set: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        let setter: Setter<T> = Box::new(move |object, value| match value {
            MemberValue::Value(value) => match downcast_value::<V>(value.as_ref()) {
                Some(value) => {
                    set(object, value);
                    true
                }
                None => false,
            },
            MemberValue::Reference(_) => false,
        });
        self.push_value::<V>(name, policy, get, Some(setter))
    }

    /// A value member without a setter, populated only through the constructor
    pub fn get_only_value<V: SyncValue>(self, name: &str, get: impl Fn(&T) -> V + 'static) -> Self {
        self.push_value::<V>(name, SyncPolicy::Construction, get, None)
    }

    pub fn reference<R: 'static>(
        self,
        name: &str,
        policy: SyncPolicy,
        get: impl Fn(&T) -> Option<SyncRef<R>> + 'static,
        set: impl Fn(&mut T, Option<SyncRef<R>>) + 'static,
    ) -> Self {
        let setter: Setter<T> = Box::new(move |object, value| match value {
            MemberValue::Reference(None) => {
                set(object, None);
                true
            }
            MemberValue::Reference(Some(reference)) => match reference.downcast::<R>() {
                Some(reference) => {
                    set(object, Some(reference));
                    true
                }
                None => false,
            },
            MemberValue::Value(_) => false,
        });
        self.push_reference::<R>(name, policy, get, Some(setter))
    }

    /// A reference member without a setter, populated only through the
    /// constructor
    pub fn get_only_reference<R: 'static>(
        self,
        name: &str,
        get: impl Fn(&T) -> Option<SyncRef<R>> + 'static,
    ) -> Self {
        self.push_reference::<R>(name, SyncPolicy::Construction, get, None)
    }

    /// Designates the constructor replicas rebuild the type with
    pub fn constructor(
        mut self,
        params: Vec<ConstructorParam>,
        construct: impl Fn(&mut ConstructorArgs) -> Result<T, ConstructorError> + 'static,
    ) -> Self {
        self.constructor = Some(Constructor {
            params,
            construct: Box::new(construct),
        });
        self
    }

    pub fn on_synchronized(mut self, callback: SyncCallback<T>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Hands each tracked instance a [`PropertyMutator`] on the authority.
    /// Diff passes then only inspect members the instance flagged.
    pub fn change_notification(mut self, install: impl Fn(&mut T, PropertyMutator) + 'static) -> Self {
        self.change_notification = Some(Box::new(install));
        self
    }

    fn push_value<V: SyncValue>(
        mut self,
        name: &str,
        policy: SyncPolicy,
        get: impl Fn(&T) -> V + 'static,
        setter: Option<Setter<T>>,
    ) -> Self {
        let kind = MemberKind::Value {
            value_type: TypeId::of::<V>(),
            type_name: type_name::<V>(),
        };
        self.descriptors
            .push(MemberDescriptor::new(name, policy, kind, setter.is_some()));
        self.accessors.push(Accessor {
            getter: Box::new(move |object| MemberValue::Value(Box::new(get(object)))),
            setter,
        });
        self
    }

    fn push_reference<R: 'static>(
        mut self,
        name: &str,
        policy: SyncPolicy,
        get: impl Fn(&T) -> Option<SyncRef<R>> + 'static,
        setter: Option<Setter<T>>,
    ) -> Self {
        let kind = MemberKind::Reference {
            object_type: TypeId::of::<R>(),
            type_name: type_name::<R>(),
        };
        self.descriptors
            .push(MemberDescriptor::new(name, policy, kind, setter.is_some()));
        self.accessors.push(Accessor {
            getter: Box::new(move |object| {
                MemberValue::Reference(get(object).as_ref().map(AnyRef::from_ref))
            }),
            setter,
        });
        self
    }

    /// Marks constructor members and freezes the registration
    pub(crate) fn build(mut self) -> TypeSchema<T> {
        if let Some(constructor) = &self.constructor {
            let names: HashSet<&str> = constructor
                .params
                .iter()
                .filter_map(|param| match param {
                    ConstructorParam::Member(name) => Some(name.as_str()),
                    ConstructorParam::Dependency(_) => None,
                })
                .collect();
            for descriptor in self.descriptors.iter_mut() {
                descriptor.constructor_arg = names.contains(descriptor.name());
            }
        }

        TypeSchema {
            name: self.name,
            descriptors: self.descriptors,
            accessors: self.accessors,
            constructor: self.constructor,
            callback: self.callback,
            change_notification: self.change_notification,
        }
    }
}

impl<T: Default + 'static> SchemaBuilder<T> {
    /// Rebuilds the type through `Default`, then applies every member
    pub fn default_constructor(self) -> Self {
        self.constructor(Vec::new(), |_| Ok(T::default()))
    }
}

/// A validated-on-use registration, erased behind [`ObjectSchema`]
pub(crate) struct TypeSchema<T> {
    name: String,
    descriptors: Vec<MemberDescriptor>,
    accessors: Vec<Accessor<T>>,
    constructor: Option<Constructor<T>>,
    callback: Option<SyncCallback<T>>,
    change_notification: Option<InstallMutator<T>>,
}

impl<T: 'static> TypeSchema<T> {
    fn cell<'o>(&self, object: &'o AnyRef) -> Result<&'o RefCell<T>, SchemaError> {
        object
            .downcast_cell::<T>()
            .ok_or_else(|| SchemaError::ObjectTypeMismatch {
                type_name: self.name.clone(),
                found: object.type_name(),
            })
    }

    fn accessor(&self, index: MemberIndex) -> Result<(&MemberDescriptor, &Accessor<T>), SchemaError> {
        let position = usize::from(index);
        match (self.descriptors.get(position), self.accessors.get(position)) {
            (Some(descriptor), Some(accessor)) => Ok((descriptor, accessor)),
            _ => Err(SchemaError::MemberIndexOutOfRange {
                type_name: self.name.clone(),
                index: position,
            }),
        }
    }

    fn borrowed(&self) -> SchemaError {
        SchemaError::ObjectBorrowed {
            type_name: self.name.clone(),
        }
    }
}

impl<T: 'static> ObjectSchema for TypeSchema<T> {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn members(&self) -> &[MemberDescriptor] {
        &self.descriptors
    }

    fn constructor_params(&self) -> Option<&[ConstructorParam]> {
        self.constructor
            .as_ref()
            .map(|constructor| constructor.params.as_slice())
    }

    fn callback(&self) -> Option<CallbackInfo> {
        self.callback.as_ref().map(SyncCallback::info)
    }

    fn has_change_notification(&self) -> bool {
        self.change_notification.is_some()
    }

    fn get(&self, object: &AnyRef, index: MemberIndex) -> Result<MemberValue, SchemaError> {
        let (_, accessor) = self.accessor(index)?;
        let object = self.cell(object)?.try_borrow().map_err(|_| self.borrowed())?;
        Ok((accessor.getter)(&*object))
    }

    fn set(&self, object: &AnyRef, index: MemberIndex, value: MemberValue) -> Result<(), SchemaError> {
        let (descriptor, accessor) = self.accessor(index)?;
        let Some(setter) = &accessor.setter else {
            return Err(SchemaError::SetterNotFound {
                type_name: self.name.clone(),
                member: descriptor.name().to_string(),
            });
        };
        let mut object = self
            .cell(object)?
            .try_borrow_mut()
            .map_err(|_| self.borrowed())?;
        if setter(&mut *object, value) {
            Ok(())
        } else {
            Err(SchemaError::MemberTypeMismatch {
                type_name: self.name.clone(),
                member: descriptor.name().to_string(),
                expected: descriptor.kind().type_name(),
            })
        }
    }

    fn construct(&self, args: &mut ConstructorArgs) -> Result<AnyRef, ConstructorError> {
        let Some(constructor) = &self.constructor else {
            return Err(ConstructorError::NoConstructor);
        };
        let object = (constructor.construct)(args)?;
        Ok(AnyRef::new(object))
    }

    fn install_mutator(&self, object: &AnyRef, mutator: PropertyMutator) -> Result<(), SchemaError> {
        let Some(install) = &self.change_notification else {
            return Ok(());
        };
        let mut object = self
            .cell(object)?
            .try_borrow_mut()
            .map_err(|_| self.borrowed())?;
        install(&mut *object, mutator);
        Ok(())
    }

    fn invoke_callback(&self, object: &AnyRef) -> Result<(), SchemaError> {
        let Some(callback) = &self.callback else {
            return Ok(());
        };
        let mut object = self
            .cell(object)?
            .try_borrow_mut()
            .map_err(|_| self.borrowed())?;
        (callback.handler)(&mut *object);
        Ok(())
    }
}
