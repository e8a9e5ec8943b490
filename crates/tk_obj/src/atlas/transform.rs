use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use tk_reflect::{Reflect, TypeInfo, Typed};

use crate::Error;

type ToFn = dyn Fn(&dyn Reflect) -> Result<Box<dyn Reflect>, String> + Send + Sync;
type FromFn = dyn Fn(Box<dyn Reflect>, &mut dyn Reflect) -> Result<(), String> + Send + Sync;

fn make_default<S: Typed + Default>() -> Box<dyn Reflect> {
    Box::new(S::default())
}

// -----------------------------------------------------------------------------
// Transform

/// A pair of conversions between a type and a surrogate.
///
/// A transformed value never reaches the stream itself: marshalling
/// converts it to the surrogate and walks that, unmarshalling fills a fresh
/// surrogate and converts it back. The surrogate is resolved like any other
/// type, so it may be a scalar, a registered struct or another transformed
/// type.
pub struct Transform {
    target: TypeInfo,
    surrogate: TypeInfo,
    make_surrogate: fn() -> Box<dyn Reflect>,
    to: Box<ToFn>,
    from: Box<FromFn>,
}

impl Transform {
    /// Creates an infallible transform between `T` and the surrogate `S`.
    pub fn new<T, S>(
        to: impl Fn(&T) -> S + Send + Sync + 'static,
        from: impl Fn(S) -> T + Send + Sync + 'static,
    ) -> Self
    where
        T: Typed,
        S: Typed + Default,
    {
        Self::try_new::<T, S, core::convert::Infallible>(
            move |value| Ok(to(value)),
            move |surrogate| Ok(from(surrogate)),
        )
    }

    /// Creates a transform whose conversions may fail.
    ///
    /// Failures surface as [`Error::Transform`] carrying the error's
    /// display text.
    pub fn try_new<T, S, E>(
        to: impl Fn(&T) -> Result<S, E> + Send + Sync + 'static,
        from: impl Fn(S) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self
    where
        T: Typed,
        S: Typed + Default,
        E: fmt::Display,
    {
        let to = move |value: &dyn Reflect| -> Result<Box<dyn Reflect>, String> {
            let Some(value) = value.downcast_ref::<T>() else {
                unreachable!("transform for {} applied to another type", T::type_info());
            };
            match to(value) {
                Ok(surrogate) => Ok(Box::new(surrogate)),
                Err(err) => Err(err.to_string()),
            }
        };

        let from = move |surrogate: Box<dyn Reflect>, target: &mut dyn Reflect| {
            let surrogate: Box<dyn core::any::Any> = surrogate;
            let Ok(surrogate) = surrogate.downcast::<S>() else {
                unreachable!("surrogate of {} has another type", T::type_info());
            };
            let Some(target) = target.downcast_mut::<T>() else {
                unreachable!("transform for {} applied to another type", T::type_info());
            };
            *target = from(*surrogate).map_err(|err| err.to_string())?;
            Ok(())
        };

        Self {
            target: T::type_info(),
            surrogate: S::type_info(),
            make_surrogate: make_default::<S>,
            to: Box::new(to),
            from: Box::new(from),
        }
    }

    /// The transformed type.
    #[inline]
    pub const fn target(&self) -> TypeInfo {
        self.target
    }

    /// The type that stands in for the target on the stream.
    #[inline]
    pub const fn surrogate(&self) -> TypeInfo {
        self.surrogate
    }

    pub(crate) fn to_surrogate(&self, value: &dyn Reflect) -> Result<Box<dyn Reflect>, Error> {
        (self.to)(value).map_err(|message| Error::Transform {
            type_name: self.target.name(),
            message,
        })
    }

    #[inline]
    pub(crate) fn make_surrogate(&self) -> Box<dyn Reflect> {
        (self.make_surrogate)()
    }

    pub(crate) fn from_surrogate(
        &self,
        surrogate: Box<dyn Reflect>,
        target: &mut dyn Reflect,
    ) -> Result<(), Error> {
        (self.from)(surrogate, target).map_err(|message| Error::Transform {
            type_name: self.target.name(),
            message,
        })
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("target", &self.target.name())
            .field("surrogate", &self.surrogate.name())
            .finish_non_exhaustive()
    }
}
