use crate::domain::model::{FieldKind, Shape};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NotAnObject { found: &'static str },
    MissingField { field: &'static str },
    WrongType {
        field: &'static str,
        expected: FieldKind,
        found: &'static str,
    },
    Undecodable { message: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotAnObject { found } => write!(f, "expected an object, found {}", found),
            Violation::MissingField { field } => write!(f, "missing field '{}'", field),
            Violation::WrongType {
                field,
                expected,
                found,
            } => write!(f, "field '{}' must be {}, found {}", field, expected, found),
            Violation::Undecodable { message } => write!(f, "cannot decode record: {}", message),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Integer => value.is_i64(),
        FieldKind::Text => value.is_string(),
    }
}

/// Every violation of `S`'s declared fields, in declared order. Empty means
/// the value conforms. Only presence and JSON types are checked; other
/// records are never consulted.
pub fn check<S: Shape>(value: &Value) -> Vec<Violation> {
    let Some(object) = value.as_object() else {
        return vec![Violation::NotAnObject {
            found: json_type_name(value),
        }];
    };

    S::FIELDS
        .iter()
        .filter_map(|spec| match object.get(spec.name) {
            None => Some(Violation::MissingField { field: spec.name }),
            Some(field) if !matches_kind(field, spec.kind) => Some(Violation::WrongType {
                field: spec.name,
                expected: spec.kind,
                found: json_type_name(field),
            }),
            Some(_) => None,
        })
        .collect()
}

/// Checks `value` and, when it conforms, builds the typed record.
pub fn conform<S: Shape>(value: &Value) -> std::result::Result<S, Vec<Violation>> {
    let violations = check::<S>(value);
    if !violations.is_empty() {
        return Err(violations);
    }

    serde_json::from_value(value.clone()).map_err(|e| {
        vec![Violation::Undecodable {
            message: e.to_string(),
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{City, FieldSpec, Hotel};
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_example_records_conform() {
        let city: City = conform(&json!({"id": 1, "name": "Paris"})).unwrap();
        assert_eq!(
            city,
            City {
                id: 1,
                name: "Paris".to_string()
            }
        );

        let hotel: Hotel = conform(&json!({
            "id": 10,
            "zone": "Centre",
            "name": "Grand Hotel",
            "city": 1,
            "label": "Luxury"
        }))
        .unwrap();
        assert_eq!(hotel.city, 1);
        assert_eq!(hotel.label, "Luxury");
    }

    #[test]
    fn test_dangling_city_reference_is_conformant() {
        let value = json!({
            "id": 11,
            "zone": "Nowhere",
            "name": "Ghost Inn",
            "city": 999,
            "label": "Budget"
        });

        assert!(check::<Hotel>(&value).is_empty());
        assert_eq!(conform::<Hotel>(&value).unwrap().city, 999);
    }

    #[test]
    fn test_missing_fields_reported_in_declared_order() {
        let violations = check::<Hotel>(&json!({"zone": "Centre", "name": "Grand Hotel"}));

        assert_eq!(
            violations,
            vec![
                Violation::MissingField { field: "id" },
                Violation::MissingField { field: "city" },
                Violation::MissingField { field: "label" },
            ]
        );
    }

    #[test]
    fn test_wrong_types_are_not_coerced() {
        let violations = check::<City>(&json!({"id": "1", "name": 42}));
        assert_eq!(
            violations,
            vec![
                Violation::WrongType {
                    field: "id",
                    expected: FieldKind::Integer,
                    found: "text"
                },
                Violation::WrongType {
                    field: "name",
                    expected: FieldKind::Text,
                    found: "integer"
                },
            ]
        );

        let fractional = check::<City>(&json!({"id": 1.5, "name": "Paris"}));
        assert_eq!(fractional.len(), 1);
        assert_eq!(fractional[0].to_string(), "field 'id' must be integer, found number");
    }

    #[test]
    fn test_null_counts_as_wrong_type() {
        let violations = check::<City>(&json!({"id": 1, "name": null}));
        assert_eq!(
            violations,
            vec![Violation::WrongType {
                field: "name",
                expected: FieldKind::Text,
                found: "null"
            }]
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            check::<City>(&json!([1, "Paris"])),
            vec![Violation::NotAnObject { found: "array" }]
        );
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Stay {
        nights: u8,
    }

    impl Shape for Stay {
        const ENTITY: &'static str = "Stay";
        const FIELDS: &'static [FieldSpec] = &[FieldSpec {
            name: "nights",
            kind: FieldKind::Integer,
        }];
    }

    #[test]
    fn test_decode_failure_after_check_is_reported() {
        let result = conform::<Stay>(&json!({"nights": 1000}));
        match result {
            Err(violations) => {
                assert_eq!(violations.len(), 1);
                assert!(matches!(violations[0], Violation::Undecodable { .. }));
                assert!(violations[0].to_string().starts_with("cannot decode record"));
            }
            Ok(stay) => panic!("expected a decode failure, got {:?}", stay),
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let city = conform::<City>(&json!({"id": 2, "name": "Lyon", "country": "FR"})).unwrap();
        assert_eq!(city.name, "Lyon");
    }

    #[test]
    fn test_conformant_value_matches_plain_deserialization() {
        let value = json!({"id": 3, "name": "Nice"});
        let checked = conform::<City>(&value).unwrap();
        let plain = City::deserialize(&value).unwrap();
        assert_eq!(checked, plain);
    }
}
