use crate::decorator::Decorator;

/// A [`Decorator`] made of a plain fn, see [`decorator_fn`].
#[derive(Copy, Clone, Debug)]
pub struct DecoratorFn<F> {
    f: F,
}

/// Builds a middleware from a fn that maps the inner handler to the handler wrapping it.
pub fn decorator_fn<In, Out, F>(f: F) -> DecoratorFn<F>
where
    F: Fn(In) -> Out,
{
    DecoratorFn { f }
}

impl<In, Out, F> Decorator<In> for DecoratorFn<F>
where
    F: Fn(In) -> Out,
{
    type Out = Out;
    fn decorate(&self, raw: In) -> Self::Out {
        (self.f)(raw)
    }
}
