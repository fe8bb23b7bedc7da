use serde_json::{Map, Value};

use super::core::{Inclusion, RangeDefinition, WidthDefinitions, validate_range};
use crate::error::DefinitionError;

const REQUIRED_KEYS: [&str; 3] = ["min", "max", "inclusion"];
const CALLBACK_SLOTS: [&str; 3] = ["onEnter", "whileInside", "onLeave"];

/// JSON type name used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds definitions from a JSON object of `name -> {min, max, inclusion}`.
///
/// `max: null` stands for an unbounded upper end. Callback slots cannot be
/// expressed in JSON, so their presence is reported as a `CallbackType`
/// violation. Nothing is returned unless every entry is valid.
pub fn definitions_from_json(map: &Map<String, Value>) -> Result<WidthDefinitions, DefinitionError> {
    let mut defs = WidthDefinitions::new();
    for (name, entry) in map {
        defs.insert(name.clone(), definition_from_json(name, entry)?);
    }
    Ok(defs)
}

fn definition_from_json(name: &str, entry: &Value) -> Result<RangeDefinition, DefinitionError> {
    let obj = entry.as_object().ok_or_else(|| DefinitionError::NotAnObject {
        name: name.to_string(),
        found: type_name(entry),
    })?;

    if let Some(key) = REQUIRED_KEYS.into_iter().find(|key| !obj.contains_key(*key)) {
        return Err(DefinitionError::MissingKey {
            name: name.to_string(),
            key,
        });
    }

    let min = number_field(name, obj, "min")?.ok_or_else(|| DefinitionError::FieldType {
        name: name.to_string(),
        key: "min",
        expected: "a number",
        found: "null",
    })?;
    let max = number_field(name, obj, "max")?.unwrap_or(f64::INFINITY);

    let token = match &obj["inclusion"] {
        Value::String(token) => token,
        other => {
            return Err(DefinitionError::FieldType {
                name: name.to_string(),
                key: "inclusion",
                expected: "a string",
                found: type_name(other),
            });
        }
    };

    validate_range(name, min, max)?;

    let inclusion = Inclusion::parse(token).ok_or_else(|| DefinitionError::InvalidInclusion {
        name: name.to_string(),
        token: token.clone(),
    })?;

    if let Some(slot) = CALLBACK_SLOTS.into_iter().find(|slot| obj.contains_key(*slot)) {
        return Err(DefinitionError::CallbackType {
            name: name.to_string(),
            slot,
        });
    }

    Ok(RangeDefinition::new(min, max, inclusion))
}

fn number_field(
    name: &str,
    obj: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<f64>, DefinitionError> {
    match &obj[key] {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| DefinitionError::FieldType {
            name: name.to_string(),
            key,
            expected: "a number",
            found: "an unrepresentable number",
        }),
        other => Err(DefinitionError::FieldType {
            name: name.to_string(),
            key,
            expected: "a number",
            found: type_name(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<WidthDefinitions, DefinitionError> {
        definitions_from_json(value.as_object().expect("object"))
    }

    #[test]
    fn loads_in_document_order() {
        let defs = parse(json!({
            "narrow": { "min": 0, "max": 599, "inclusion": "[]" },
            "wide": { "min": 600, "max": null, "inclusion": "[)" }
        }))
        .unwrap();

        let names: Vec<_> = defs.keys().map(String::as_str).collect();
        assert_eq!(names, ["narrow", "wide"]);
        assert_eq!(defs["wide"].max, f64::INFINITY);
        assert_eq!(defs["wide"].inclusion, Inclusion::MinOnly);
    }

    #[test]
    fn every_valid_token_is_accepted() {
        for token in ["[]", "()", "[)", "(]"] {
            let defs = parse(json!({ "x": { "min": 1, "max": 2, "inclusion": token } }));
            assert!(defs.is_ok(), "{token} rejected");
        }
    }

    #[test]
    fn angle_brackets_are_rejected() {
        let err = parse(json!({ "x": { "min": 1, "max": 2, "inclusion": "<>" } })).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::InvalidInclusion {
                name: "x".into(),
                token: "<>".into()
            }
        );
    }

    #[test]
    fn non_object_entry_is_a_type_error() {
        let err = parse(json!({ "tablet": 42 })).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::NotAnObject {
                name: "tablet".into(),
                found: "a number"
            }
        );
    }

    #[test]
    fn missing_key_names_the_breakpoint() {
        let err = parse(json!({ "tablet": { "min": 1, "inclusion": "[]" } })).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MissingKey {
                name: "tablet".into(),
                key: "max"
            }
        );
    }

    #[test]
    fn wrong_field_type_is_reported() {
        let err = parse(json!({ "tablet": { "min": "1", "max": 2, "inclusion": "[]" } })).unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::FieldType { key: "min", found: "a string", .. }
        ));
    }

    #[test]
    fn flipped_range_aborts_the_batch() {
        let err = parse(json!({
            "good": { "min": 0, "max": 10, "inclusion": "[]" },
            "bad": { "min": 500, "max": 100, "inclusion": "[]" }
        }))
        .unwrap_err();
        assert_eq!(err.breakpoint(), "bad");
        assert!(matches!(err, DefinitionError::RangeOrder { .. }));
    }

    #[test]
    fn callback_slots_cannot_come_from_json() {
        let err = parse(json!({
            "x": { "min": 0, "max": 10, "inclusion": "[]", "onLeave": "noop" }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::CallbackType {
                name: "x".into(),
                slot: "onLeave"
            }
        );
    }
}
