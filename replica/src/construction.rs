use std::collections::{HashMap, HashSet};

use log::debug;

use synchrony_shared::{
    AnyRef, ConstructorArgs, ConstructorError, ConstructorParam, DependencyProvider, MemberIndex,
    MemberValue, ReferenceId, ResolvedSchema, ResolvedShape, WireValue,
};

use crate::{
    error::TargetError,
    frame_reader::{DecodedEntry, DecodedPayload},
    reference_pool::TargetReferencePool,
};

/// Constructs the objects a frame adds, each after the objects its
/// constructor arguments reference.
///
/// Objects currently under construction are kept on a chain. Reaching an
/// identifier that is already on the chain means the constructor arguments
/// form a cycle, which is reported with every link of the chain.
pub(crate) struct ConstructionResolver<'f> {
    entries: &'f [DecodedEntry],
    /// Identifier to entry index, for every entry that needs constructing
    pending: HashMap<ReferenceId, usize>,
    dependencies: &'f dyn DependencyProvider,
    chain: Vec<(ReferenceId, String)>,
    constructed: HashSet<ReferenceId>,
}

impl<'f> ConstructionResolver<'f> {
    pub fn new(
        entries: &'f [DecodedEntry],
        pending: HashMap<ReferenceId, usize>,
        dependencies: &'f dyn DependencyProvider,
    ) -> Self {
        Self {
            entries,
            pending,
            dependencies,
            chain: Vec::new(),
            constructed: HashSet::new(),
        }
    }

    /// Registers every pending object with `pool`, returning their
    /// identifiers
    pub fn construct_all(
        mut self,
        pool: &mut TargetReferencePool,
    ) -> Result<HashSet<ReferenceId>, TargetError> {
        let mut order: Vec<(usize, ReferenceId)> =
            self.pending.iter().map(|(id, index)| (*index, *id)).collect();
        order.sort();

        for (_, id) in order {
            if !self.constructed.contains(&id) {
                self.construct(id, pool)?;
            }
        }
        Ok(self.constructed)
    }

    fn construct(
        &mut self,
        id: ReferenceId,
        pool: &mut TargetReferencePool,
    ) -> Result<AnyRef, TargetError> {
        let Some(index) = self.pending.get(&id).copied() else {
            return Err(TargetError::UnknownReference { id });
        };
        let entries = self.entries;
        let entry = &entries[index];
        let type_name = entry.shape.type_name().to_string();

        if let Some(position) = self.chain.iter().position(|(chained, _)| *chained == id) {
            let mut chain = self.chain[position..].to_vec();
            chain.push((id, type_name));
            return Err(TargetError::ConstructorCycle { chain });
        }

        self.chain.push((id, type_name));
        let object = match &entry.shape {
            ResolvedShape::Object(schema) => {
                let members: &[(MemberIndex, WireValue)] = match &entry.payload {
                    DecodedPayload::Object(members) => members,
                    DecodedPayload::Map { .. } => &[],
                };
                self.construct_object(id, schema, members, pool)?
            }
            ResolvedShape::Map(schema) => schema.new_map(),
        };
        self.chain.pop();

        debug!("Constructed {} as {}", entry.shape.type_name(), id);
        pool.register(id, object.clone());
        self.constructed.insert(id);
        Ok(object)
    }

    fn construct_object(
        &mut self,
        id: ReferenceId,
        schema: &ResolvedSchema,
        members: &[(MemberIndex, WireValue)],
        pool: &mut TargetReferencePool,
    ) -> Result<AnyRef, TargetError> {
        let type_name = || schema.type_name().to_string();
        let Some(params) = schema.constructor_params() else {
            return Err(TargetError::ConstructorFailed {
                type_name: type_name(),
                source: ConstructorError::NoConstructor,
            });
        };

        let mut args = ConstructorArgs::new();
        for param in params {
            match param {
                ConstructorParam::Member(name) => {
                    let Some(index) = schema.member_index(name) else {
                        return Err(TargetError::UnknownMember {
                            type_name: type_name(),
                            member: name.clone(),
                        });
                    };
                    // left to the constructor to report as missing
                    let Some((_, value)) = members.iter().find(|(member, _)| *member == index)
                    else {
                        continue;
                    };
                    let value = match value {
                        WireValue::Value(value) => MemberValue::Value(value.clone()),
                        WireValue::Reference(None) => MemberValue::Reference(None),
                        WireValue::Reference(Some(reference)) => {
                            MemberValue::Reference(Some(self.reference(*reference, id, pool)?))
                        }
                    };
                    args.insert_member(name, value);
                }
                ConstructorParam::Dependency(key) => {
                    let Some(dependency) = self.dependencies.resolve(key) else {
                        return Err(TargetError::DependencyNotFound {
                            type_name: type_name(),
                            dependency: key.type_name(),
                        });
                    };
                    args.insert_dependency(*key, dependency);
                }
            }
        }

        schema
            .construct(&mut args)
            .map_err(|source| TargetError::ConstructorFailed {
                type_name: type_name(),
                source,
            })
    }

    fn reference(
        &mut self,
        id: ReferenceId,
        referrer: ReferenceId,
        pool: &mut TargetReferencePool,
    ) -> Result<AnyRef, TargetError> {
        if let Some(object) = pool.resolve(&id) {
            return Ok(object.clone());
        }
        if self.pending.contains_key(&id) {
            return self.construct(id, pool);
        }
        Err(TargetError::UnresolvedReference { id, referrer })
    }
}
