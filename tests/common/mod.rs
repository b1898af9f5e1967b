#![allow(dead_code)]

use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use typedrpc::{BoxError, Implementation, MethodSpec, Registry, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreetInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreetOutput {
    pub greeting: String,
}

typedrpc::method! {
    pub Greet = "greet": GreetInput => GreetOutput;
    pub Explode = "explode": () => ();
}

typedrpc::service! {
    pub service Greeter: GreeterMethod {
        Greet(Greet),
        Explode(Explode),
    }
}

/// Greets and counts how many times it ran.
#[derive(Clone, Default)]
pub struct CountingGreeter {
    calls: Arc<AtomicUsize>,
}

impl CountingGreeter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Implementation<Greet> for CountingGreeter {
    type Fut = Ready<Result<GreetOutput, BoxError>>;

    fn call(&self, input: GreetInput) -> Self::Fut {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(GreetOutput {
            greeting: format!("Hello, {}!", input.name),
        }))
    }
}

async fn explode(_: ()) -> Result<(), BoxError> {
    Err("kaboom".into())
}

pub fn registry(greeter: CountingGreeter) -> Registry<Greeter> {
    let greet = Schema::<GreetInput>::new().refine("name", "must not be empty", |input| {
        !input.name.is_empty()
    });

    Registry::<Greeter>::builder()
        .method(MethodSpec::<Greet>::new(greet, greeter))
        .method(MethodSpec::<Explode>::new(Schema::new(), explode))
        .build()
        .unwrap()
}
