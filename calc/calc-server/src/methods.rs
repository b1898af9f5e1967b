use calc_sdk::{Add, AddInput, AddOutput, Calculator, Subtract, SubtractInput, SubtractOutput};
use thiserror::Error;
use tracing::debug;
use typedrpc::{MethodSpec, Registry, RegistryError, Schema};

#[derive(Debug, Error, PartialEq)]
pub enum ArithmeticError {
    /// The operands were finite but the result is not representable.
    #[error("result of {0} is not a finite number")]
    Overflow(&'static str),
}

fn finite(method: &'static str, value: f64) -> Result<f64, ArithmeticError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArithmeticError::Overflow(method))
    }
}

async fn add(AddInput { augend, addend }: AddInput) -> Result<AddOutput, ArithmeticError> {
    debug!(augend, addend, "adding");
    let sum = finite("add", augend + addend)?;
    Ok(AddOutput { sum })
}

async fn subtract(
    SubtractInput {
        minuend,
        subtrahend,
    }: SubtractInput,
) -> Result<SubtractOutput, ArithmeticError> {
    debug!(minuend, subtrahend, "subtracting");
    let difference = finite("subtract", minuend - subtrahend)?;
    Ok(SubtractOutput { difference })
}

/// The calculator's registry: every method of [`Calculator`] with its
/// validator and implementation.
pub fn registry() -> Result<Registry<Calculator>, RegistryError> {
    Registry::<Calculator>::builder()
        .method(MethodSpec::<Add>::new(Schema::new(), add))
        .method(MethodSpec::<Subtract>::new(Schema::new(), subtract))
        .build()
}
