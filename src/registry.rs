use crate::{
    dispatch::{dispatch, DispatchError},
    net::MethodInfo,
    spec::{ErasedMethodSpec, MethodSpec},
    Method, MethodName, Provides, Service,
};
use serde_json::Value;
use std::{collections::BTreeMap, fmt, marker::PhantomData};
use thiserror::Error;

/// Maps every method name of service `S` to its [`MethodSpec`].
///
/// Built once with [`Registry::builder`] and immutable afterwards. Share it
/// between transports behind an `Arc`.
pub struct Registry<S> {
    methods: BTreeMap<&'static str, ErasedMethodSpec>,
    _service: PhantomData<fn() -> S>,
}

impl<S: Service> Registry<S> {
    pub fn builder() -> RegistryBuilder<S> {
        RegistryBuilder {
            methods: BTreeMap::new(),
            duplicate: None,
            _service: PhantomData,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ErasedMethodSpec> {
        self.methods.get(name)
    }

    /// Registered method names, in sorted order.
    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    /// Name and signature of every registered method, sorted by name.
    pub fn signatures(&self) -> Vec<MethodInfo> {
        self.methods.values().map(ErasedMethodSpec::info).collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Shorthand for [`dispatch`]`(self, name, raw)`.
    pub async fn dispatch(&self, name: &str, raw: Value) -> Result<Value, DispatchError> {
        dispatch(self, name, raw).await
    }
}

impl<S: Service> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("service", &S::NAME)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects the [`MethodSpec`]s of a [`Registry`].
///
/// Only methods the service declares can be added; [`build`](Self::build)
/// checks that none is missing or added twice.
pub struct RegistryBuilder<S> {
    methods: BTreeMap<&'static str, ErasedMethodSpec>,
    duplicate: Option<&'static str>,
    _service: PhantomData<fn() -> S>,
}

impl<S: Service> RegistryBuilder<S> {
    #[must_use]
    pub fn method<M>(mut self, spec: MethodSpec<M>) -> Self
    where
        M: Method,
        S: Provides<M>,
    {
        let name = spec.name();
        if self.methods.insert(name, spec.erase()).is_some() {
            self.duplicate.get_or_insert(name);
        }
        self
    }

    pub fn build(self) -> Result<Registry<S>, RegistryError> {
        if let Some(name) = self.duplicate {
            return Err(RegistryError::DuplicateMethod(name));
        }
        if self.methods.contains_key("") {
            return Err(RegistryError::EmptyName);
        }
        if let Some(missing) = S::MethodName::ALL
            .iter()
            .map(|name| name.as_str())
            .find(|name| !self.methods.contains_key(name))
        {
            return Err(RegistryError::MissingMethod(missing));
        }
        Ok(Registry {
            methods: self.methods,
            _service: PhantomData,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("method name must not be empty")]
    EmptyName,

    #[error("method {0} registered more than once")]
    DuplicateMethod(&'static str),

    #[error("method {0} is declared by the service but has no implementation")]
    MissingMethod(&'static str),
}
