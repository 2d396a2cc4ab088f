use super::issue::{messages, Issue, IssueCode, ValidationError};

/// Path parameter name for record routes
pub const ID_PARAM: &str = "id";

/// A validated, positive record identifier taken from the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IdParam(i64);

impl IdParam {
    /// Coerce raw path text to a positive integer id.
    ///
    /// Failures are validation issues addressed at `id`; the store is never
    /// consulted for malformed input.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if let Ok(id) = trimmed.parse::<i64>() {
            return Self::positive(id);
        }

        match trimmed.parse::<f64>() {
            Ok(n) if !n.is_finite() => Err(Self::not_a_number()),
            Ok(n) if n.fract() != 0.0 => Err(ValidationError::single(Issue {
                expected: Some("integer".to_string()),
                received: Some("float".to_string()),
                ..Issue::at(ID_PARAM, IssueCode::InvalidType, messages::EXPECTED_INTEGER)
            })),
            Ok(n) if n <= 0.0 => Err(Self::too_small()),
            Ok(n) if n < i64::MAX as f64 => Self::positive(n as i64),
            Ok(_) => Err(ValidationError::single(Issue::at(
                ID_PARAM,
                IssueCode::TooBig,
                format!("Number must be less than or equal to {}", i64::MAX),
            ))),
            Err(_) => Err(Self::not_a_number()),
        }
    }

    fn positive(id: i64) -> Result<Self, ValidationError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(Self::too_small())
        }
    }

    /// Issue for id text that is not a number at all, including path
    /// segments that do not decode to UTF-8
    pub fn not_a_number() -> ValidationError {
        ValidationError::single(Issue {
            expected: Some("number".to_string()),
            received: Some("nan".to_string()),
            ..Issue::at(ID_PARAM, IssueCode::InvalidType, messages::EXPECTED_NUMBER)
        })
    }

    fn too_small() -> ValidationError {
        ValidationError::single(Issue::at(
            ID_PARAM,
            IssueCode::TooSmall,
            "Number must be greater than 0",
        ))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_issue(raw: &str) -> Issue {
        IdParam::parse(raw).unwrap_err().first().cloned().unwrap()
    }

    #[test]
    fn accepts_positive_integers() {
        assert_eq!(IdParam::parse("1").unwrap().get(), 1);
        assert_eq!(IdParam::parse(" 42 ").unwrap().get(), 42);
        assert_eq!(IdParam::parse("2.0").unwrap().get(), 2);
    }

    #[test]
    fn non_numeric_is_expected_number() {
        for raw in ["wat", "", "1abc", "NaN", "inf"] {
            let issue = first_issue(raw);
            assert_eq!(issue.path, vec!["id"]);
            assert_eq!(issue.message, messages::EXPECTED_NUMBER);
            assert_ne!(issue.message, messages::REQUIRED);
        }
    }

    #[test]
    fn fractional_is_expected_integer() {
        let issue = first_issue("1.5");
        assert_eq!(issue.message, messages::EXPECTED_INTEGER);
    }

    #[test]
    fn zero_and_negative_are_too_small() {
        assert_eq!(first_issue("0").code, IssueCode::TooSmall);
        assert_eq!(first_issue("-3").code, IssueCode::TooSmall);
        assert_eq!(first_issue("-3.0").code, IssueCode::TooSmall);
    }

    #[test]
    fn overflow_is_too_big() {
        assert_eq!(first_issue("99999999999999999999").code, IssueCode::TooBig);
    }
}
