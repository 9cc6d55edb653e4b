use std::{cmp::Ordering, rc::Rc};

use synchrony_shared::{AnyRef, BoxedValue, MapSchema, ReferenceId};

use crate::{error::SourceError, reference_pool::SourceReferencePool};

use super::{reference_id, Payload, SourceSynchronizer};

pub(crate) struct MapSourceSynchronizer {
    schema: Rc<dyn MapSchema>,
    last_sent: Vec<(BoxedValue, ReferenceId)>,
}

impl MapSourceSynchronizer {
    pub fn new(schema: Rc<dyn MapSchema>) -> Self {
        Self {
            schema,
            last_sent: Vec::new(),
        }
    }

    fn current(
        &self,
        object: &AnyRef,
        pool: &SourceReferencePool,
    ) -> Result<Vec<(BoxedValue, ReferenceId)>, SourceError> {
        let mut entries = Vec::new();
        for (key, value) in self.schema.entries(object)? {
            let id = reference_id(pool, self.schema.type_name(), &value)?;
            entries.push((key, id));
        }
        Ok(entries)
    }
}

impl SourceSynchronizer for MapSourceSynchronizer {
    fn children(&self, object: &AnyRef) -> Result<Vec<AnyRef>, SourceError> {
        let entries = self.schema.entries(object)?;
        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }

    fn snapshot(&mut self, object: &AnyRef, pool: &SourceReferencePool) -> Result<Payload, SourceError> {
        let current = self.current(object, pool)?;
        self.last_sent = current.clone();
        Ok(Payload::Map {
            schema: self.schema.clone(),
            inserts: current,
            removals: Vec::new(),
        })
    }

    fn changes(&mut self, object: &AnyRef, pool: &SourceReferencePool) -> Result<Payload, SourceError> {
        let current = self.current(object, pool)?;

        // both lists are in key order, so one merge pass finds the differences
        let mut inserts = Vec::new();
        let mut removals = Vec::new();
        let (mut sent, mut now) = (0, 0);
        while sent < self.last_sent.len() || now < current.len() {
            let order = match (self.last_sent.get(sent), current.get(now)) {
                (Some((sent_key, _)), Some((key, _))) => {
                    self.schema.compare_keys(sent_key.as_ref(), key.as_ref())?
                }
                (Some(_), None) => Ordering::Less,
                (None, _) => Ordering::Greater,
            };
            match order {
                Ordering::Less => {
                    removals.push(self.last_sent[sent].0.clone());
                    sent += 1;
                }
                Ordering::Greater => {
                    inserts.push(current[now].clone());
                    now += 1;
                }
                Ordering::Equal => {
                    if self.last_sent[sent].1 != current[now].1 {
                        inserts.push(current[now].clone());
                    }
                    sent += 1;
                    now += 1;
                }
            }
        }

        self.last_sent = current;
        Ok(Payload::Map {
            schema: self.schema.clone(),
            inserts,
            removals,
        })
    }
}
