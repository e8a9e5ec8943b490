use alloc::boxed::Box;
use alloc::string::String;

use tk_reflect::{Reflect, ReflectMut, Scalar, ScalarMut, TypeInfo};
use tk_token::{Token, TokenKind};

use crate::atlas::{StructMap, Transform};
use crate::error::Error;
use crate::options::UnknownFieldPolicy;
use crate::resolve::{Resolution, Strategy};
use crate::slab::{Outcome, Row};
use crate::view::{self, desync, kind_mismatch};

fn unexpected(expected: &'static str, token: &Token, target: &'static str) -> Error {
    Error::UnexpectedToken {
        expected,
        found: token.kind(),
        target,
    }
}

// -----------------------------------------------------------------------------
// Skipper

/// Consumes one complete value without storing it.
#[derive(Debug, Clone, Copy, Default)]
struct Skipper {
    depth: usize,
}

impl Skipper {
    /// Returns `true` once the skipped value is complete.
    fn step(&mut self, token: &Token, target: &'static str) -> Result<bool, Error> {
        let kind = token.kind();
        if kind.is_open() {
            self.depth += 1;
            return Ok(false);
        }
        if kind.is_close() {
            if self.depth == 0 {
                return Err(unexpected("a value", token, target));
            }
            self.depth -= 1;
        }
        Ok(self.depth == 0)
    }
}

// -----------------------------------------------------------------------------
// Machine

#[derive(Debug, Clone, Copy)]
enum StructPhase {
    Open,
    KeyOrEnd,
    Value { member: usize, type_info: TypeInfo },
    Skip(Skipper),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapPhase {
    Open,
    KeyOrEnd,
    Value,
}

/// Unmarshal-side state for one target, chosen by its strategy.
enum Machine<'a> {
    Scalar,
    Struct {
        map: &'a StructMap,
        phase: StructPhase,
    },
    Sequence {
        element: fn() -> TypeInfo,
        fixed_len: Option<usize>,
        count: usize,
        opened: bool,
    },
    Map {
        value: fn() -> TypeInfo,
        phase: MapPhase,
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
                phase: StructPhase::Open,
            },
            Strategy::Transform(transform) => Self::Transform(transform),
            Strategy::Sequence { element, fixed_len } => Self::Sequence {
                element,
                fixed_len,
                count: 0,
                opened: false,
            },
            Strategy::Map { value } => Self::Map {
                value,
                phase: MapPhase::Open,
            },
            Strategy::Dynamic => Self::Dynamic,
        }
    }
}

// -----------------------------------------------------------------------------
// UnmarshalRow

/// One level of an in-progress unmarshal.
///
/// On the row's first token the `levels` indirections are prepared: a null
/// token clears the outermost nullable one and finishes the row, anything
/// else allocates the absent levels and reaches the machine.
pub(super) struct UnmarshalRow<'a> {
    levels: usize,
    fresh: bool,
    machine: Result<Machine<'a>, Error>,
    // Key of the map entry being filled.
    key: String,
    surrogate: Option<Box<dyn Reflect>>,
}

impl<'a> Row<'a> for UnmarshalRow<'a> {
    fn new(resolution: Resolution<'a>) -> Self {
        Self {
            levels: resolution.levels,
            fresh: true,
            machine: resolution.strategy.map(Machine::new),
            key: String::new(),
            surrogate: None,
        }
    }

    fn reset(&mut self, resolution: Resolution<'a>) {
        self.levels = resolution.levels;
        self.fresh = true;
        self.machine = resolution.strategy.map(Machine::new);
        self.key.clear();
        self.surrogate = None;
    }
}

impl UnmarshalRow<'_> {
    /// Feeds `token` into `value` or asks for a child.
    pub(super) fn step(
        &mut self,
        value: &mut dyn Reflect,
        token: &Token,
        unknown_fields: UnknownFieldPolicy,
    ) -> Result<Outcome, Error> {
        let Self {
            levels,
            fresh,
            machine,
            key,
            surrogate,
        } = self;

        let first = core::mem::replace(fresh, false);
        if first
            && *levels > 0
            && matches!(token, Token::Null)
            && view::clear_outermost(&mut *value, *levels)
        {
            return Ok(Outcome::Done);
        }

        let machine = match machine {
            Ok(machine) => machine,
            Err(err) => return Err(err.clone()),
        };

        let value = if *levels == 0 {
            value
        } else if first {
            view::ensure_present(value, *levels)
        } else {
            view::pointee_mut(value, *levels)
        };
        let target = value.reflect_type_info().name();

        match machine {
            Machine::Scalar => {
                store_scalar(value, token)?;
                Ok(Outcome::Done)
            }
            Machine::Struct { map, phase } => match phase {
                StructPhase::Open => {
                    if !matches!(token, Token::MapOpen) {
                        return Err(unexpected("map open", token, target));
                    }
                    *phase = StructPhase::KeyOrEnd;
                    Ok(Outcome::Continue)
                }
                StructPhase::KeyOrEnd => match token {
                    Token::MapClose => Ok(Outcome::Done),
                    Token::String(name) => match map.field(name) {
                        Some(field) => {
                            *phase = StructPhase::Value {
                                member: field.member(),
                                type_info: field.type_info(),
                            };
                            Ok(Outcome::Continue)
                        }
                        None => match unknown_fields {
                            UnknownFieldPolicy::Error => Err(Error::UnknownField {
                                field: name.clone(),
                                type_name: target,
                            }),
                            UnknownFieldPolicy::Skip => {
                                log::warn!("skipping unknown field {name:?} of {target}");
                                *phase = StructPhase::Skip(Skipper::default());
                                Ok(Outcome::Continue)
                            }
                        },
                    },
                    _ => Err(unexpected("map key or map close", token, target)),
                },
                StructPhase::Value { type_info, .. } => Ok(Outcome::Recurse(*type_info)),
                StructPhase::Skip(skipper) => {
                    if skipper.step(token, target)? {
                        *phase = StructPhase::KeyOrEnd;
                    }
                    Ok(Outcome::Continue)
                }
            },
            Machine::Sequence {
                element,
                fixed_len,
                count,
                opened,
            } => {
                if !*opened {
                    if !matches!(token, Token::ArrOpen) {
                        return Err(unexpected("array open", token, target));
                    }
                    view::as_sequence_mut(value).clear();
                    *count = 0;
                    *opened = true;
                    return Ok(Outcome::Continue);
                }
                match token.kind() {
                    TokenKind::ArrClose => match *fixed_len {
                        Some(expected) if expected != *count => Err(Error::LengthMismatch {
                            expected,
                            found: *count,
                            type_name: target,
                        }),
                        _ => Ok(Outcome::Done),
                    },
                    TokenKind::MapClose => Err(unexpected("a value or array close", token, target)),
                    _ => {
                        let seq = view::as_sequence_mut(value);
                        if *count == seq.len() && !seq.push_default() {
                            return Err(Error::LengthMismatch {
                                expected: seq.len(),
                                found: *count + 1,
                                type_name: target,
                            });
                        }
                        Ok(Outcome::Recurse((*element)()))
                    }
                }
            }
            Machine::Map {
                value: value_type,
                phase,
            } => match phase {
                MapPhase::Open => {
                    if !matches!(token, Token::MapOpen) {
                        return Err(unexpected("map open", token, target));
                    }
                    view::as_map_mut(value).clear();
                    *phase = MapPhase::KeyOrEnd;
                    Ok(Outcome::Continue)
                }
                MapPhase::KeyOrEnd => match token {
                    Token::MapClose => Ok(Outcome::Done),
                    Token::String(name) => {
                        key.clone_from(name);
                        view::as_map_mut(value).insert_default(name.clone());
                        *phase = MapPhase::Value;
                        Ok(Outcome::Continue)
                    }
                    _ => Err(unexpected("map key or map close", token, target)),
                },
                MapPhase::Value => Ok(Outcome::Recurse((*value_type)())),
            },
            Machine::Dynamic => {
                let dynamic = view::as_dynamic_mut(value);
                let scalar = match token {
                    Token::MapOpen => {
                        dynamic.set_empty_map();
                        return Ok(Outcome::Recurse(inner_type(dynamic)));
                    }
                    Token::ArrOpen => {
                        dynamic.set_empty_array();
                        return Ok(Outcome::Recurse(inner_type(dynamic)));
                    }
                    Token::MapClose | Token::ArrClose => {
                        return Err(unexpected("a value", token, target));
                    }
                    Token::Null => {
                        dynamic.set_null();
                        return Ok(Outcome::Done);
                    }
                    Token::String(v) => Scalar::Str(v),
                    Token::Bytes(v) => Scalar::Bytes(v),
                    Token::Bool(v) => Scalar::Bool(*v),
                    Token::Int(v) => Scalar::Int(*v),
                    Token::Uint(v) => Scalar::Uint(*v),
                    Token::Float64(v) => Scalar::Float(*v),
                };
                dynamic.set_scalar(scalar);
                Ok(Outcome::Done)
            }
            Machine::Transform(transform) => {
                *surrogate = Some(transform.make_surrogate());
                Ok(Outcome::Recurse(transform.surrogate()))
            }
        }
    }

    /// The child this row is currently filling.
    pub(super) fn select<'r>(&'r mut self, value: &'r mut dyn Reflect) -> &'r mut dyn Reflect {
        let Self {
            levels,
            machine,
            key,
            surrogate,
            ..
        } = self;
        let Ok(machine) = machine else {
            desync()
        };

        if let Machine::Transform(_) = machine {
            return match surrogate.as_deref_mut() {
                Some(surrogate) => surrogate,
                None => desync(),
            };
        }

        let value = view::pointee_mut(value, *levels);
        let child = match machine {
            Machine::Struct {
                phase: StructPhase::Value { member, .. },
                ..
            } => view::as_struct_mut(value).field_at_mut(*member),
            Machine::Sequence { count, .. } => view::as_sequence_mut(value).get_mut(*count),
            Machine::Map { .. } => view::as_map_mut(value).get_mut(key.as_str()),
            Machine::Dynamic => view::as_dynamic_mut(value).inner_mut(),
            _ => None,
        };
        match child {
            Some(child) => child,
            None => desync(),
        }
    }

    /// Advances past the child that just finished filling.
    ///
    /// Returns `true` when that child completed this row's value too.
    pub(super) fn child_done(&mut self, value: &mut dyn Reflect) -> Result<bool, Error> {
        match &mut self.machine {
            Ok(Machine::Struct { phase, .. }) => {
                *phase = StructPhase::KeyOrEnd;
                Ok(false)
            }
            Ok(Machine::Sequence { count, .. }) => {
                *count += 1;
                Ok(false)
            }
            Ok(Machine::Map { phase, .. }) => {
                *phase = MapPhase::KeyOrEnd;
                Ok(false)
            }
            Ok(Machine::Dynamic) => Ok(true),
            Ok(Machine::Transform(transform)) => {
                let Some(surrogate) = self.surrogate.take() else {
                    desync()
                };
                let target = view::pointee_mut(value, self.levels);
                transform.from_surrogate(surrogate, target)?;
                Ok(true)
            }
            Ok(Machine::Scalar) | Err(_) => desync(),
        }
    }
}

fn inner_type(dynamic: &dyn tk_reflect::Dynamic) -> TypeInfo {
    match dynamic.inner() {
        Some(inner) => inner.reflect_type_info(),
        None => desync(),
    }
}

// -----------------------------------------------------------------------------
// Scalars

fn store_scalar(value: &mut dyn Reflect, token: &Token) -> Result<(), Error> {
    let target = value.reflect_type_info().name();
    let stored = match value.reflect_mut() {
        ReflectMut::Scalar(scalar) => store(scalar, token),
        other => kind_mismatch(target, "a scalar", other.describe()),
    };
    if stored {
        Ok(())
    } else {
        Err(Error::CantFit {
            token: token.clone(),
            target,
        })
    }
}

/// Stores `token` into `target` if it fits without loss.
fn store(target: ScalarMut<'_>, token: &Token) -> bool {
    match (target, token) {
        (ScalarMut::Bool(t), Token::Bool(v)) => *t = *v,
        (ScalarMut::String(t), Token::String(v)) => t.clone_from(v),
        (ScalarMut::Bytes(t), Token::Bytes(v)) => t.clone_from(v),
        (ScalarMut::I8(t), _) => return fit_int(t, token),
        (ScalarMut::I16(t), _) => return fit_int(t, token),
        (ScalarMut::I32(t), _) => return fit_int(t, token),
        (ScalarMut::I64(t), _) => return fit_int(t, token),
        (ScalarMut::Isize(t), _) => return fit_int(t, token),
        (ScalarMut::U8(t), _) => return fit_int(t, token),
        (ScalarMut::U16(t), _) => return fit_int(t, token),
        (ScalarMut::U32(t), _) => return fit_int(t, token),
        (ScalarMut::U64(t), _) => return fit_int(t, token),
        (ScalarMut::Usize(t), _) => return fit_int(t, token),
        (ScalarMut::F64(t), _) => match as_f64(token) {
            Some(v) => *t = v,
            None => return false,
        },
        (ScalarMut::F32(t), _) => match as_f64(token) {
            Some(v) => {
                let narrowed = v as f32;
                if narrowed.is_infinite() && v.is_finite() {
                    return false;
                }
                *t = narrowed;
            }
            None => return false,
        },
        _ => return false,
    }
    true
}

fn fit_int<T>(target: &mut T, token: &Token) -> bool
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let converted = match token {
        Token::Int(v) => <T as TryFrom<i64>>::try_from(*v).ok(),
        Token::Uint(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
        _ => None,
    };
    match converted {
        Some(v) => {
            *target = v;
            true
        }
        None => false,
    }
}

fn as_f64(token: &Token) -> Option<f64> {
    match token {
        Token::Float64(v) => Some(*v),
        Token::Int(v) => Some(*v as f64),
        Token::Uint(v) => Some(*v as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use tk_reflect::{Reflect, ReflectMut};
    use tk_token::Token;

    use super::{Skipper, store};

    fn put(target: &mut dyn Reflect, token: Token) -> bool {
        match target.reflect_mut() {
            ReflectMut::Scalar(scalar) => store(scalar, &token),
            _ => panic!("expected a scalar"),
        }
    }

    #[test]
    fn integer_widening_is_range_checked() {
        let mut small = 0_i8;
        assert!(put(&mut small, Token::Uint(127)));
        assert_eq!(small, 127);
        assert!(!put(&mut small, Token::Uint(128)));
        assert!(!put(&mut small, Token::Int(-129)));
        assert_eq!(small, 127);

        let mut unsigned = 0_u32;
        assert!(put(&mut unsigned, Token::Int(9)));
        assert_eq!(unsigned, 9);
        assert!(!put(&mut unsigned, Token::Int(-1)));
        assert!(!put(&mut unsigned, Token::Float64(1.0)));

        let mut wide = 0_i64;
        assert!(!put(&mut wide, Token::Uint(u64::MAX)));
    }

    #[test]
    fn floats_accept_any_number() {
        let mut v = 0_f64;
        assert!(put(&mut v, Token::Int(-3)));
        assert_eq!(v, -3.0);
        assert!(put(&mut v, Token::Uint(4)));
        assert_eq!(v, 4.0);

        let mut narrow = 0_f32;
        assert!(put(&mut narrow, Token::Float64(0.5)));
        assert_eq!(narrow, 0.5);
        assert!(!put(&mut narrow, Token::Float64(f64::MAX)));
        assert!(!put(&mut narrow, Token::Bool(true)));
    }

    #[test]
    fn strings_and_bytes_are_distinct() {
        let mut text = String::from("old");
        assert!(put(&mut text, Token::String("new".into())));
        assert_eq!(text, "new");
        assert!(!put(&mut text, Token::Bytes(Vec::from(*b"raw"))));

        let mut raw: Vec<u8> = Vec::new();
        assert!(put(&mut raw, Token::Bytes(Vec::from(*b"raw"))));
        assert_eq!(raw, b"raw");
        assert!(!put(&mut raw, Token::String("raw".into())));
    }

    #[test]
    fn skipper_consumes_one_value() {
        let mut skip = Skipper::default();
        assert!(skip.step(&Token::Int(1), "t").unwrap());

        let mut skip = Skipper::default();
        let nested = [
            Token::ArrOpen,
            Token::MapOpen,
            Token::String("k".into()),
            Token::Null,
            Token::MapClose,
            Token::ArrClose,
        ];
        let done: Vec<bool> = nested.iter().map(|t| skip.step(t, "t").unwrap()).collect();
        assert_eq!(done, [false, false, false, false, false, true]);

        assert!(Skipper::default().step(&Token::MapClose, "t").is_err());
    }
}
