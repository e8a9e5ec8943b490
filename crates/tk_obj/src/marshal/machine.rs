use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use tk_reflect::{Reflect, ReflectRef, Scalar, TypeInfo};
use tk_token::Token;

use crate::atlas::{StructMap, Transform};
use crate::error::Error;
use crate::resolve::{Resolution, Strategy};
use crate::slab::{Outcome, Row};
use crate::view::{self, desync, kind_mismatch};

// -----------------------------------------------------------------------------
// Machine

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Key,
    Value,
}

/// Marshal-side state for one value, chosen by its strategy.
enum Machine<'a> {
    Scalar,
    Struct {
        map: &'a StructMap,
        index: usize,
        phase: Phase,
    },
    Sequence {
        element: fn() -> TypeInfo,
        index: usize,
        opened: bool,
    },
    Map {
        value: fn() -> TypeInfo,
        index: usize,
        phase: Phase,
    },
    Dynamic,
    Transform(&'a Transform),
}

impl<'a> Machine<'a> {
    fn new(strategy: Strategy<'a>) -> Self {
        match strategy {
            Strategy::Scalar => Self::Scalar,
            Strategy::Struct(map) => Self::Struct {
                map,
                index: 0,
                phase: Phase::Open,
            },
            Strategy::Transform(transform) => Self::Transform(transform),
            Strategy::Sequence { element, .. } => Self::Sequence {
                element,
                index: 0,
                opened: false,
            },
            Strategy::Map { value } => Self::Map {
                value,
                index: 0,
                phase: Phase::Open,
            },
            Strategy::Dynamic => Self::Dynamic,
        }
    }
}

// -----------------------------------------------------------------------------
// MarshalRow

/// One level of an in-progress marshal.
///
/// `levels` indirections are followed before the machine sees the value;
/// an absent level is written as a single null token.
pub(super) struct MarshalRow<'a> {
    levels: usize,
    machine: Result<Machine<'a>, Error>,
    // Sorted keys of the map being walked are `keys[..key_count]`; the
    // strings past that stay allocated for the next map.
    keys: Vec<String>,
    key_count: usize,
    surrogate: Option<Box<dyn Reflect>>,
}

impl<'a> Row<'a> for MarshalRow<'a> {
    fn new(resolution: Resolution<'a>) -> Self {
        Self {
            levels: resolution.levels,
            machine: resolution.strategy.map(Machine::new),
            keys: Vec::new(),
            key_count: 0,
            surrogate: None,
        }
    }

    fn reset(&mut self, resolution: Resolution<'a>) {
        self.levels = resolution.levels;
        self.machine = resolution.strategy.map(Machine::new);
        self.key_count = 0;
        self.surrogate = None;
    }
}

impl MarshalRow<'_> {
    /// Writes the next token of `value` or asks for a child.
    pub(super) fn step(&mut self, value: &dyn Reflect, token: &mut Token) -> Result<Outcome, Error> {
        let Self {
            levels,
            machine,
            keys,
            key_count,
            surrogate,
        } = self;

        // An absent level ends the row before its strategy matters.
        let Some(value) = view::pointee(value, *levels) else {
            *token = Token::Null;
            return Ok(Outcome::Done);
        };

        let machine = match machine {
            Ok(machine) => machine,
            Err(err) => return Err(err.clone()),
        };

        match machine {
            Machine::Scalar => {
                write_scalar(value, token);
                Ok(Outcome::Done)
            }
            Machine::Struct { map, index, phase } => match phase {
                Phase::Open => {
                    *token = Token::MapOpen;
                    *phase = Phase::Key;
                    Ok(Outcome::Continue)
                }
                Phase::Key => match map.fields().get(*index) {
                    Some(field) => {
                        token.set_str(field.name());
                        *phase = Phase::Value;
                        Ok(Outcome::Continue)
                    }
                    None => {
                        *token = Token::MapClose;
                        Ok(Outcome::Done)
                    }
                },
                Phase::Value => Ok(Outcome::Recurse(map.fields()[*index].type_info())),
            },
            Machine::Sequence {
                element,
                index,
                opened,
            } => {
                if !*opened {
                    *opened = true;
                    *token = Token::ArrOpen;
                    return Ok(Outcome::Continue);
                }
                if *index < view::as_sequence(value).len() {
                    Ok(Outcome::Recurse((*element)()))
                } else {
                    *token = Token::ArrClose;
                    Ok(Outcome::Done)
                }
            }
            Machine::Map {
                value: value_type,
                index,
                phase,
            } => match phase {
                Phase::Open => {
                    *key_count = 0;
                    view::as_map(value).for_each_key(&mut |key| {
                        match keys.get_mut(*key_count) {
                            Some(slot) => {
                                slot.clear();
                                slot.push_str(key);
                            }
                            None => keys.push(String::from(key)),
                        }
                        *key_count += 1;
                    });
                    keys[..*key_count].sort_unstable();
                    *token = Token::MapOpen;
                    *phase = Phase::Key;
                    Ok(Outcome::Continue)
                }
                Phase::Key => match keys[..*key_count].get(*index) {
                    Some(key) => {
                        token.set_str(key);
                        *phase = Phase::Value;
                        Ok(Outcome::Continue)
                    }
                    None => {
                        *token = Token::MapClose;
                        Ok(Outcome::Done)
                    }
                },
                Phase::Value => Ok(Outcome::Recurse((*value_type)())),
            },
            Machine::Dynamic => match view::as_dynamic(value).inner() {
                Some(inner) => Ok(Outcome::Recurse(inner.reflect_type_info())),
                None => {
                    *token = Token::Null;
                    Ok(Outcome::Done)
                }
            },
            Machine::Transform(transform) => {
                let converted = transform.to_surrogate(value)?;
                let surrogate_type = converted.reflect_type_info();
                *surrogate = Some(converted);
                Ok(Outcome::Recurse(surrogate_type))
            }
        }
    }

    /// The child this row is currently walking.
    pub(super) fn select<'r>(&'r self, value: &'r dyn Reflect) -> &'r dyn Reflect {
        let Ok(machine) = &self.machine else {
            desync()
        };
        let Some(value) = view::pointee(value, self.levels) else {
            desync()
        };

        let child = match machine {
            Machine::Struct { map, index, .. } => {
                view::as_struct(value).field_at(map.fields()[*index].member())
            }
            Machine::Sequence { index, .. } => view::as_sequence(value).get(*index),
            Machine::Map { index, .. } => view::as_map(value).get(&self.keys[*index]),
            Machine::Dynamic => view::as_dynamic(value).inner(),
            Machine::Transform(_) => self.surrogate.as_deref(),
            Machine::Scalar => None,
        };
        child.unwrap_or_else(|| desync())
    }

    /// Advances past the child that just finished.
    ///
    /// Returns `true` when that child completed this row's value too.
    pub(super) fn child_done(&mut self) -> bool {
        match &mut self.machine {
            Ok(Machine::Struct { index, phase, .. } | Machine::Map { index, phase, .. }) => {
                *index += 1;
                *phase = Phase::Key;
                false
            }
            Ok(Machine::Sequence { index, .. }) => {
                *index += 1;
                false
            }
            Ok(Machine::Dynamic) => true,
            Ok(Machine::Transform(_)) => {
                self.surrogate = None;
                true
            }
            Ok(Machine::Scalar) | Err(_) => desync(),
        }
    }
}

fn write_scalar(value: &dyn Reflect, token: &mut Token) {
    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => match scalar {
            Scalar::Bool(v) => *token = Token::Bool(v),
            Scalar::Int(v) => *token = Token::Int(v),
            Scalar::Uint(v) => *token = Token::Uint(v),
            Scalar::Float(v) => *token = Token::Float64(v),
            Scalar::Str(v) => token.set_str(v),
            Scalar::Bytes(v) => token.set_bytes(v),
        },
        other => kind_mismatch(value.reflect_type_info().name(), "a scalar", other.describe()),
    }
}
