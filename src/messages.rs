//! Wire-level message templates. Clients match on these strings, so wording is fixed.

use uuid::Uuid;

pub fn parameter_missing(param: &str) -> String {
    format!("Missing required param: '{}'.", param)
}

pub fn parameter_invalid(param: &str) -> String {
    format!("Parameter invalid: '{}'.", param)
}

pub fn string_length_exceeded(param: &str, n: usize) -> String {
    format!("The length of '{}' cannot be greater than {} characters.", param, n)
}

pub fn string_length_not_met(param: &str, n: usize) -> String {
    format!("The length of '{}' must be at least {} characters.", param, n)
}

/// `op` is the comparison in words, e.g. "greater than or equal to".
pub fn value_not_in_bound(param: &str, op: &str, n: i64) -> String {
    format!("Value of '{}' must be {} '{}'.", param, op, n)
}

pub fn exclusive_params(a: &str, b: &str) -> String {
    format!("Received both '{}' and '{}' parameters. Pass one at a time.", a, b)
}

pub fn not_found(resource: &str, id: Uuid) -> String {
    format!("No such {}: '{}'", resource, id)
}

pub fn invalid_id(resource: &str, value: &str) -> String {
    format!("Invalid {} id: '{}'.", resource, value)
}

pub fn invalid_request_body() -> String {
    "Invalid request body. Make sure that the body is in format application/json.".to_string()
}

pub fn invalid_param_type(param: &str, detail: &str) -> String {
    format!("Type of '{}' is invalid: {}.", param, detail)
}

pub fn request_body_too_large() -> String {
    "Request body too large.".to_string()
}

pub fn api_error() -> String {
    "Something went wrong.".to_string()
}

pub fn route_unknown(method: &str, path: &str) -> String {
    format!("Request to unknown route ({}: {}).", method, path)
}

pub fn tenant_missing(header: &str) -> String {
    format!("No valid account was supplied. Set the '{}' header.", header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_render_exactly() {
        assert_eq!(parameter_missing("name"), "Missing required param: 'name'.");
        assert_eq!(
            string_length_exceeded("name", 64),
            "The length of 'name' cannot be greater than 64 characters."
        );
        assert_eq!(
            value_not_in_bound("limit", "less than or equal to", 100),
            "Value of 'limit' must be less than or equal to '100'."
        );
        assert_eq!(
            exclusive_params("starting_after", "ending_before"),
            "Received both 'starting_after' and 'ending_before' parameters. Pass one at a time."
        );
    }
}
