use crate::{
    net::MethodInfo,
    validate::{ValidationErrors, Validator},
    Method,
};
use futures::future::{BoxFuture, ErrInto, FutureExt, TryFutureExt};
use serde_json::Value;
use std::{any::type_name, error::Error, future::Future, marker::PhantomData, sync::Arc};

/// Failure raised by a method implementation.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// The server-side body of method `M`.
///
/// Any `Fn(M::Input) -> impl Future<Output = Result<M::Output, E>>` qualifies,
/// including plain `async fn`s.
pub trait Implementation<M: Method>: Send + Sync + 'static {
    type Fut: Future<Output = Result<M::Output, BoxError>> + Send;

    fn call(&self, input: M::Input) -> Self::Fut;
}

impl<M, F, Fut, E> Implementation<M> for F
where
    M: Method,
    F: Fn(M::Input) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<M::Output, E>> + Send,
    E: Into<BoxError>,
{
    type Fut = ErrInto<Fut, BoxError>;

    fn call(&self, input: M::Input) -> Self::Fut {
        self(input).err_into()
    }
}

/// A validator paired with the implementation it feeds.
///
/// The bounds on [`MethodSpec::new`] make the pairing type-checked: the
/// validator must produce exactly `M::Input`.
pub struct MethodSpec<M> {
    erased: ErasedMethodSpec,
    _method: PhantomData<fn() -> M>,
}

impl<M: Method> MethodSpec<M> {
    pub fn new<V, I>(validator: V, implementation: I) -> Self
    where
        V: Validator<Output = M::Input>,
        I: Implementation<M>,
    {
        let typed = TypedMethod {
            validator,
            implementation,
            _method: PhantomData::<fn() -> M>,
        };
        Self {
            erased: ErasedMethodSpec(Arc::new(typed)),
            _method: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        M::NAME
    }

    pub(crate) fn erase(self) -> ErasedMethodSpec {
        self.erased
    }
}

/// A [`MethodSpec`] with its types erased, as stored in a registry.
#[derive(Clone)]
pub struct ErasedMethodSpec(Arc<dyn DynamicMethod>);

impl ErasedMethodSpec {
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn info(&self) -> MethodInfo {
        let (input, output) = self.0.signature();
        MethodInfo {
            name: self.name().to_owned(),
            input: input.to_owned(),
            output: output.to_owned(),
        }
    }

    /// Validates `raw` and, only if that succeeds, returns the pending
    /// invocation of the implementation.
    pub fn prepare(&self, raw: Value) -> Result<PendingCall<'_>, ValidationErrors> {
        self.0.prepare(raw).map(PendingCall)
    }
}

/// An invocation that has passed validation but not yet run.
pub struct PendingCall<'a>(BoxFuture<'a, Result<Value, BoxError>>);

impl PendingCall<'_> {
    pub async fn run(self) -> Result<Value, BoxError> {
        self.0.await
    }
}

struct TypedMethod<M, V, I> {
    validator: V,
    implementation: I,
    _method: PhantomData<fn() -> M>,
}

/// A type-erased version of [`MethodSpec`]
trait DynamicMethod: Send + Sync {
    fn name(&self) -> &'static str;
    /// Type names of the input and output.
    fn signature(&self) -> (&'static str, &'static str);
    fn prepare(&self, raw: Value)
        -> Result<BoxFuture<'_, Result<Value, BoxError>>, ValidationErrors>;
}

impl<M, V, I> DynamicMethod for TypedMethod<M, V, I>
where
    M: Method,
    V: Validator<Output = M::Input>,
    I: Implementation<M>,
{
    fn name(&self) -> &'static str {
        M::NAME
    }

    fn signature(&self) -> (&'static str, &'static str) {
        (type_name::<M::Input>(), type_name::<M::Output>())
    }

    fn prepare(
        &self,
        raw: Value,
    ) -> Result<BoxFuture<'_, Result<Value, BoxError>>, ValidationErrors> {
        let input = self.validator.validate(raw)?;
        let call = self.implementation.call(input);
        let call = call.map(|output| -> Result<Value, BoxError> {
            let output = output?;
            serde_json::to_value(output)
                .map_err(|e| format!("(BUG in {}) encoding output: {e}", M::NAME).into())
        });
        Ok(Box::pin(call))
    }
}
