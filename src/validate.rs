use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{error::Error, fmt, marker::PhantomData};

/// Turns an untyped JSON value into a typed one, or explains why it can't.
///
/// Validators are pure: the same input always yields the same outcome.
pub trait Validator: Send + Sync + 'static {
    type Output;

    fn validate(&self, raw: Value) -> Result<Self::Output, ValidationErrors>;
}

/// One problem found while validating. `path` is a dotted field path, empty
/// when the problem concerns the value as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Structured failure of a [`Validator`]. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    issues: Vec<Issue>,
}

impl ValidationErrors {
    pub fn new(first: Issue) -> Self {
        Self {
            issues: vec![first],
        }
    }

    fn from_issues(issues: Vec<Issue>) -> Option<Self> {
        (!issues.is_empty()).then_some(Self { issues })
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

struct Refinement<T> {
    path: &'static str,
    message: &'static str,
    check: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

/// Validator that decodes with serde and then runs refinements over the
/// decoded value.
///
/// Decoding failures (wrong type, missing field) end validation with a single
/// issue. Refinements all run, and every failing one is reported.
pub struct Schema<T> {
    refinements: Vec<Refinement<T>>,
    _decodes: PhantomData<fn() -> T>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self {
            refinements: Vec::new(),
            _decodes: PhantomData,
        }
    }
}

impl<T> Schema<T>
where
    T: DeserializeOwned + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a check on the decoded value, reported at `path` with `message`
    /// when `check` returns `false`.
    #[must_use]
    pub fn refine<F>(mut self, path: &'static str, message: &'static str, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            path,
            message,
            check: Box::new(check),
        });
        self
    }
}

impl<T> Validator for Schema<T>
where
    T: DeserializeOwned + 'static,
{
    type Output = T;

    fn validate(&self, raw: Value) -> Result<T, ValidationErrors> {
        let decoded: T = serde_path_to_error::deserialize(raw).map_err(decode_issue)?;

        let issues = self
            .refinements
            .iter()
            .filter(|refinement| !(refinement.check)(&decoded))
            .map(|refinement| Issue::new(refinement.path, refinement.message))
            .collect();

        match ValidationErrors::from_issues(issues) {
            Some(errors) => Err(errors),
            None => Ok(decoded),
        }
    }
}

/// Decoding failures are reported at the field where serde gave up. Errors
/// about the value as a whole (a missing field, a non-object) keep an empty
/// path.
fn decode_issue(err: serde_path_to_error::Error<serde_json::Error>) -> ValidationErrors {
    let path = match err.path().iter().next() {
        Some(_) => err.path().to_string(),
        None => String::new(),
    };
    ValidationErrors::new(Issue::new(path, err.into_inner().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Range {
        low: i64,
        high: i64,
    }

    fn range_schema() -> Schema<Range> {
        Schema::new()
            .refine("low", "must not be negative", |r: &Range| r.low >= 0)
            .refine("high", "must not be below low", |r: &Range| r.high >= r.low)
    }

    #[test]
    fn decodes_valid_input() {
        let range = range_schema().validate(json!({"low": 1, "high": 3})).unwrap();
        assert_eq!(range, Range { low: 1, high: 3 });
    }

    #[test]
    fn missing_field_is_one_issue() {
        let err = range_schema().validate(json!({"low": 1})).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert!(err.to_string().contains("missing field `high`"), "{err}");
    }

    #[test]
    fn wrong_type_names_the_field() {
        let err = range_schema()
            .validate(json!({"low": "one", "high": 3}))
            .unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].path, "low");
        assert!(err.issues()[0].message.contains("invalid type"), "{err}");
        assert!(err.to_string().starts_with("low: invalid type"), "{err}");
    }

    #[test]
    fn nested_decode_failure_has_full_path() {
        #[derive(Debug, Deserialize)]
        struct Bounds {
            #[allow(dead_code)]
            ranges: Vec<Range>,
        }

        let err = Schema::<Bounds>::new()
            .validate(json!({"ranges": [{"low": 0, "high": 1}, {"low": 0, "high": true}]}))
            .unwrap_err();
        assert_eq!(err.issues()[0].path, "ranges[1].high");
    }

    #[test]
    fn missing_field_and_wrong_shape_have_no_path() {
        let err = range_schema().validate(json!({"low": 1})).unwrap_err();
        assert_eq!(err.issues()[0].path, "");

        let err = range_schema().validate(json!("low")).unwrap_err();
        assert_eq!(err.issues()[0].path, "");
    }

    #[test]
    fn every_failing_refinement_is_reported() {
        let err = range_schema()
            .validate(json!({"low": -5, "high": -9}))
            .unwrap_err();
        assert_eq!(
            err.issues(),
            &[
                Issue::new("low", "must not be negative"),
                Issue::new("high", "must not be below low"),
            ]
        );
        assert_eq!(
            err.to_string(),
            "low: must not be negative; high: must not be below low"
        );
    }
}
