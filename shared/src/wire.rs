use crate::{types::ReferenceId, value::BoxedValue};

/// A member value as it travels on the wire: plain values as themselves,
/// references as the identifier of the referenced object
#[derive(Clone, Debug)]
pub enum WireValue {
    Value(BoxedValue),
    Reference(Option<ReferenceId>),
}

impl PartialEq for WireValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WireValue::Value(a), WireValue::Value(b)) => a.dyn_eq(b.as_ref()),
            (WireValue::Reference(a), WireValue::Reference(b)) => a == b,
            _ => false,
        }
    }
}
