//! Calculator SDK
//!
//! Everything a client needs to call the calculator service with checked
//! types, and nothing the server runs: the method markers, their input and
//! output shapes, and the closed set of method names.
//!
//! ```
//! use calc_sdk::{Add, Calculator, CalculatorMethod};
//! use typedrpc::{InputOf, MethodName, OutputOf, Provides};
//!
//! let input: InputOf<Add> = calc_sdk::AddInput { augend: 2.0, addend: 2.0 };
//! let _: fn(OutputOf<Add>) -> f64 = |output| output.sum;
//! assert_eq!(<Calculator as Provides<Add>>::METHOD, CalculatorMethod::Add);
//! assert_eq!(CalculatorMethod::ALL.len(), 2);
//! # let _ = input;
//! ```

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddInput {
    pub augend: f64,
    pub addend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddOutput {
    pub sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubtractInput {
    pub minuend: f64,
    pub subtrahend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubtractOutput {
    pub difference: f64,
}

typedrpc::method! {
    /// `augend + addend`
    pub Add = "add": AddInput => AddOutput;
    /// `minuend - subtrahend`
    pub Subtract = "subtract": SubtractInput => SubtractOutput;
}

typedrpc::service! {
    /// Arithmetic on two operands.
    pub service Calculator: CalculatorMethod {
        Add(Add),
        Subtract(Subtract),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typedrpc::MethodName;

    #[test]
    fn method_names_are_exactly_add_and_subtract() {
        let names: Vec<_> = CalculatorMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, ["add", "subtract"]);
    }

    #[test]
    fn parses_only_declared_names() {
        assert_eq!("add".parse::<CalculatorMethod>(), Ok(CalculatorMethod::Add));
        assert_eq!("subtract".parse::<CalculatorMethod>(), Ok(CalculatorMethod::Subtract));
        let err = "multiply".parse::<CalculatorMethod>().unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized method name multiply");
    }

    #[test]
    fn wire_field_names() {
        let input: AddInput = serde_json::from_str(r#"{"augend":2,"addend":2}"#).unwrap();
        assert_eq!(input, AddInput { augend: 2.0, addend: 2.0 });

        let output = serde_json::to_string(&SubtractOutput { difference: 7.0 }).unwrap();
        assert_eq!(output, r#"{"difference":7.0}"#);
    }
}
