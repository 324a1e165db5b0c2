//! Declarative request validation. Rule tables are static per parameter type; evaluation
//! visits every rule and collects every violation.

use crate::case::to_snake_case;
use crate::error::{ApiError, AppError, ErrorCode, ErrorList, ErrorType};
use crate::messages;
use uuid::Uuid;

#[derive(Clone, Copy, Debug)]
pub enum Constraint {
    Required,
    MaxLength(usize),
    MinLength(usize),
    /// String length must be one of the listed values.
    Lengths(&'static [usize]),
    Gt(i64),
    Gte(i64),
    Lt(i64),
    Lte(i64),
    ExcludedWith(&'static str),
    OneOf(&'static [&'static str]),
    /// Validate a nested parameter object against its own table.
    Dive(&'static [Rule]),
}

#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub field: &'static str,
    pub constraints: &'static [Constraint],
}

impl Rule {
    pub const fn new(field: &'static str, constraints: &'static [Constraint]) -> Self {
        Rule { field, constraints }
    }
}

/// A field as seen by the validator.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    Missing,
    Text(&'a str),
    Integer(i64),
    Names(&'a [String]),
    /// Set, with no constraint-relevant shape (ids, flags).
    Present,
    Nested(&'a dyn Fields),
}

impl<'a> FieldValue<'a> {
    pub fn text(v: &'a Option<String>) -> Self {
        v.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
    }

    pub fn int(v: Option<i64>) -> Self {
        v.map_or(FieldValue::Missing, FieldValue::Integer)
    }

    pub fn names(v: &'a [String]) -> Self {
        if v.is_empty() {
            FieldValue::Missing
        } else {
            FieldValue::Names(v)
        }
    }

    pub fn present<T>(v: &Option<T>) -> Self {
        if v.is_some() {
            FieldValue::Present
        } else {
            FieldValue::Missing
        }
    }

    pub fn nested<T: Fields>(v: &'a Option<T>) -> Self {
        match v {
            Some(inner) => FieldValue::Nested(inner),
            None => FieldValue::Missing,
        }
    }

    fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

/// Exposes a parameter object's fields by wire name.
pub trait Fields: Send + Sync {
    fn field(&self, name: &str) -> FieldValue<'_>;
}

pub struct RequestValidator;

impl RequestValidator {
    /// Evaluate every rule of every table. `None` when nothing is violated.
    pub fn validate(params: &dyn Fields, tables: &[&[Rule]]) -> Option<ErrorList> {
        let mut errors = Vec::new();
        for rules in tables {
            check_rules(params, rules, None, &mut errors);
        }
        if errors.is_empty() {
            None
        } else {
            Some(ErrorList { errors })
        }
    }

    pub fn check(params: &dyn Fields, tables: &[&[Rule]]) -> Result<(), AppError> {
        match Self::validate(params, tables) {
            Some(list) => Err(AppError::Validation(list)),
            None => Ok(()),
        }
    }
}

fn check_rules(params: &dyn Fields, rules: &[Rule], prefix: Option<&str>, out: &mut Vec<ApiError>) {
    for rule in rules {
        let value = params.field(rule.field);
        let param = param_name(prefix, rule.field);
        for constraint in rule.constraints {
            match constraint {
                Constraint::Required => {
                    if value.is_missing() {
                        out.push(invalid(ErrorCode::ParameterMissing, messages::parameter_missing(&param), &param));
                    }
                }
                Constraint::ExcludedWith(other) => {
                    if !value.is_missing() && !params.field(other).is_missing() {
                        let other = param_name(prefix, other);
                        out.push(ApiError {
                            code: Some(ErrorCode::ParameterInvalid),
                            message: messages::exclusive_params(&param, &other),
                            kind: ErrorType::InvalidRequestError,
                            param: None,
                        });
                    }
                }
                Constraint::Dive(nested) => {
                    if let FieldValue::Nested(inner) = value {
                        check_rules(inner, nested, Some(&param), out);
                    }
                }
                c => check_value(*c, value, &param, out),
            }
        }
    }
}

fn check_value(constraint: Constraint, value: FieldValue<'_>, param: &str, out: &mut Vec<ApiError>) {
    match value {
        FieldValue::Text(s) => {
            if let Some(e) = check_text(constraint, s, param) {
                out.push(e);
            }
        }
        FieldValue::Integer(n) => {
            if let Some(e) = check_number(constraint, n, param) {
                out.push(e);
            }
        }
        FieldValue::Names(names) => {
            if let Constraint::OneOf(allowed) = constraint {
                for (i, name) in names.iter().enumerate() {
                    if !allowed.contains(&name.as_str()) {
                        let p = format!("{}[{}]", param, i);
                        out.push(invalid(ErrorCode::ParameterInvalid, messages::parameter_invalid(&p), &p));
                    }
                }
            }
        }
        FieldValue::Missing | FieldValue::Present | FieldValue::Nested(_) => {}
    }
}

fn check_text(constraint: Constraint, s: &str, param: &str) -> Option<ApiError> {
    let len = s.chars().count();
    let too_long = |n: usize| {
        invalid(ErrorCode::StringLengthExceeded, messages::string_length_exceeded(param, n), param)
    };
    let too_short = |n: usize| {
        invalid(ErrorCode::StringLengthNotMet, messages::string_length_not_met(param, n), param)
    };
    let count = len as i64;
    match constraint {
        Constraint::MaxLength(n) if len > n => Some(too_long(n)),
        Constraint::Lte(n) if count > n => Some(too_long(n.max(0) as usize)),
        Constraint::Lt(n) if count >= n => Some(too_long(n.max(0) as usize)),
        Constraint::MinLength(n) if len < n => Some(too_short(n)),
        Constraint::Gte(n) if count < n => Some(too_short(n.max(0) as usize)),
        Constraint::Gt(n) if count <= n => Some(too_short(n.max(0) as usize)),
        Constraint::Lengths(allowed) if !allowed.contains(&len) => {
            Some(invalid(ErrorCode::ParameterInvalid, messages::parameter_invalid(param), param))
        }
        Constraint::OneOf(allowed) if !allowed.contains(&s) => {
            Some(invalid(ErrorCode::ParameterInvalid, messages::parameter_invalid(param), param))
        }
        _ => None,
    }
}

fn check_number(constraint: Constraint, n: i64, param: &str) -> Option<ApiError> {
    let (ok, op, bound) = match constraint {
        Constraint::Gt(b) => (n > b, "greater than", b),
        Constraint::Gte(b) => (n >= b, "greater than or equal to", b),
        Constraint::Lt(b) => (n < b, "less than", b),
        Constraint::Lte(b) => (n <= b, "less than or equal to", b),
        _ => return None,
    };
    if ok {
        return None;
    }
    Some(invalid(
        ErrorCode::ParameterInvalid,
        messages::value_not_in_bound(param, op, bound),
        param,
    ))
}

fn invalid(code: ErrorCode, message: String, param: &str) -> ApiError {
    ApiError::invalid_param(code, message, Some(param.to_string()))
}

fn param_name(prefix: Option<&str>, field: &str) -> String {
    let snake = to_snake_case(field);
    match prefix {
        Some(p) => format!("{}[{}]", p, snake),
        None => snake,
    }
}

/// Parse a path or cursor id, reporting the resource it was meant to name.
pub fn parse_id(resource: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidRequest(ApiError::invalid_request(messages::invalid_id(resource, raw))))
}
