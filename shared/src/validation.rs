use serde_json::Value;

/// Check that every required field exists on the request object. A field
/// counts as present whenever the key exists: empty strings, empty arrays and
/// explicit nulls all pass. Only an absent key fails.
pub fn is_valid_fields(obj: &Value, required_fields: &[&str]) -> bool {
    missing_fields(obj, required_fields).is_empty()
}

/// Names of the required fields absent from the request object.
pub fn missing_fields<'a>(obj: &Value, required_fields: &[&'a str]) -> Vec<&'a str> {
    required_fields
        .iter()
        .filter(|field| obj.get(**field).is_none())
        .copied()
        .collect()
}
