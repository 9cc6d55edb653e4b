use std::{rc::Rc, time::Duration};

use synchrony_shared::{
    AnyRef, Instant, MemberIndex, MemberSlot, MemberValue, ResolvedSchema, ResolvedShape, Tick,
    WireValue,
};

use crate::{
    error::TargetError,
    frame_reader::DecodedPayload,
    policy::{Decision, MemberState},
};

use super::{ApplyContext, ApplyKind, TargetSynchronizer};

pub(crate) struct ObjectTargetSynchronizer {
    schema: Rc<ResolvedSchema>,
    states: Vec<MemberState>,
}

impl ObjectTargetSynchronizer {
    pub fn new(schema: Rc<ResolvedSchema>) -> Self {
        let states = vec![MemberState::default(); schema.member_count()];
        Self { schema, states }
    }

    fn can_interpolate(&self, index: MemberIndex) -> bool {
        self.schema
            .slot(index)
            .and_then(MemberSlot::codec)
            .is_some_and(|codec| codec.can_interpolate())
    }

    fn member_value(value: &WireValue, context: &ApplyContext) -> Result<MemberValue, TargetError> {
        match value {
            WireValue::Value(value) => Ok(MemberValue::Value(value.clone())),
            WireValue::Reference(id) => Ok(MemberValue::Reference(context.resolve(*id)?)),
        }
    }
}

impl TargetSynchronizer for ObjectTargetSynchronizer {
    fn shape(&self) -> ResolvedShape {
        ResolvedShape::Object(self.schema.clone())
    }

    fn apply(
        &mut self,
        object: &AnyRef,
        payload: &DecodedPayload,
        kind: ApplyKind,
        context: &ApplyContext,
    ) -> Result<bool, TargetError> {
        let DecodedPayload::Object(members) = payload else {
            return Ok(false);
        };

        let mut touched = false;
        for (index, value) in members {
            let index = *index;
            let position = usize::from(index);
            let smoothing = context.smoothing && self.can_interpolate(index);
            let (Some(descriptor), Some(state)) =
                (self.schema.members().get(position), self.states.get_mut(position))
            else {
                return Err(TargetError::MemberIndexOutOfRange {
                    type_name: self.schema.type_name().to_string(),
                    index,
                });
            };

            // already consumed by the constructor
            if kind == ApplyKind::Constructed && descriptor.is_constructor_arg() {
                state.mark_set(context.tick);
                continue;
            }

            match state.decide(descriptor.policy(), context.tick, smoothing) {
                Decision::Discard => {}
                Decision::Assign => {
                    let value = Self::member_value(value, context)?;
                    self.schema.set(object, index, value)?;
                    touched = true;
                }
                Decision::Interpolate => match (self.schema.get(object, index)?, value) {
                    (MemberValue::Value(source), WireValue::Value(target)) => {
                        state.begin_interpolation(source, target.clone(), context.now);
                        touched = true;
                    }
                    (_, value) => {
                        let value = Self::member_value(value, context)?;
                        self.schema.set(object, index, value)?;
                        touched = true;
                    }
                },
            }
        }
        Ok(touched)
    }

    fn update(&mut self, object: &AnyRef, now: Instant, update_rate: Duration) -> Result<bool, TargetError> {
        let mut moved = false;
        for index in self.schema.indices() {
            let Some(state) = self.states.get_mut(usize::from(index)) else {
                continue;
            };
            let Some(interpolation) = state.interpolation() else {
                continue;
            };
            let Some(codec) = self.schema.slot(index).and_then(MemberSlot::codec) else {
                state.finish_interpolation();
                continue;
            };

            let factor = interpolation.factor(now, update_rate);
            if factor >= 1.0 {
                let target = interpolation.target.clone();
                self.schema.set(object, index, MemberValue::Value(target))?;
                state.finish_interpolation();
            } else {
                let value = codec.interpolate(
                    interpolation.source.as_ref(),
                    interpolation.target.as_ref(),
                    factor,
                )?;
                self.schema.set(object, index, MemberValue::Value(value))?;
            }
            moved = true;
        }
        Ok(moved)
    }

    fn stamp(&mut self, member: &str, tick: Tick) -> Result<(), TargetError> {
        let state = self
            .schema
            .member_index(member)
            .and_then(|index| self.states.get_mut(usize::from(index)))
            .ok_or_else(|| TargetError::UnknownMember {
                type_name: self.schema.type_name().to_string(),
                member: member.to_string(),
            })?;
        state.stamp(tick);
        Ok(())
    }
}
