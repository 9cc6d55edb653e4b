use std::rc::Rc;

use synchrony_shared::{
    AnyRef, MemberIndex, MemberValue, MutReceiver, PropertyMutator, ResolvedSchema, WireValue,
};

use crate::{error::SourceError, reference_pool::SourceReferencePool};

use super::{reference_id, Payload, SourceSynchronizer};

pub(crate) struct ObjectSourceSynchronizer {
    schema: Rc<ResolvedSchema>,
    last_sent: Vec<Option<WireValue>>,
    receiver: Option<MutReceiver>,
}

impl ObjectSourceSynchronizer {
    /// Installs a change-notification mutator on `object` if its type
    /// registered one
    pub fn new(schema: Rc<ResolvedSchema>, object: &AnyRef) -> Result<Self, SourceError> {
        let member_count = schema.member_count();
        let receiver = if schema.has_change_notification() {
            let receiver = MutReceiver::new(u8::try_from(member_count).unwrap_or(u8::MAX));
            schema.install_mutator(object, PropertyMutator::new(receiver.clone()))?;
            Some(receiver)
        } else {
            None
        };

        Ok(Self {
            schema,
            last_sent: vec![None; member_count],
            receiver,
        })
    }

    fn wire_value(
        &self,
        object: &AnyRef,
        index: MemberIndex,
        pool: &SourceReferencePool,
    ) -> Result<WireValue, SourceError> {
        match self.schema.get(object, index)? {
            MemberValue::Value(value) => Ok(WireValue::Value(value)),
            MemberValue::Reference(None) => Ok(WireValue::Reference(None)),
            MemberValue::Reference(Some(reference)) => {
                let id = reference_id(pool, self.schema.type_name(), &reference)?;
                Ok(WireValue::Reference(Some(id)))
            }
        }
    }

    fn clear_mask(&self) {
        if let Some(receiver) = &self.receiver {
            receiver.clear_mask();
        }
    }

    fn payload(&self, members: Vec<(MemberIndex, WireValue)>) -> Payload {
        Payload::Object {
            schema: self.schema.clone(),
            members,
        }
    }
}

impl SourceSynchronizer for ObjectSourceSynchronizer {
    fn children(&self, object: &AnyRef) -> Result<Vec<AnyRef>, SourceError> {
        let mut children = Vec::new();
        for index in self.schema.indices() {
            if let MemberValue::Reference(Some(reference)) = self.schema.get(object, index)? {
                children.push(reference);
            }
        }
        Ok(children)
    }

    fn snapshot(&mut self, object: &AnyRef, pool: &SourceReferencePool) -> Result<Payload, SourceError> {
        let mut members = Vec::with_capacity(self.last_sent.len());
        for index in self.schema.indices() {
            let value = self.wire_value(object, index, pool)?;
            self.last_sent[usize::from(index)] = Some(value.clone());
            members.push((index, value));
        }
        self.clear_mask();
        Ok(self.payload(members))
    }

    fn changes(&mut self, object: &AnyRef, pool: &SourceReferencePool) -> Result<Payload, SourceError> {
        let candidates: Vec<MemberIndex> = match &self.receiver {
            Some(receiver) => receiver.mask().set_indices(),
            None => self.schema.indices().collect(),
        };

        let mut members = Vec::new();
        for index in candidates {
            let position = usize::from(index);
            if position >= self.last_sent.len() {
                continue;
            }
            let value = self.wire_value(object, index, pool)?;
            if self.last_sent[position].as_ref() == Some(&value) {
                continue;
            }
            self.last_sent[position] = Some(value.clone());
            members.push((index, value));
        }
        self.clear_mask();
        Ok(self.payload(members))
    }
}
