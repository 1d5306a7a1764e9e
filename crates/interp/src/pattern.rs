#![forbid(unsafe_code)]

use crate::value::Value;
use crate::RuntimeError;
use frontend::ast::{Expr, Pattern};
use indexmap::IndexMap;

pub(crate) type Bindings = IndexMap<String, Value>;

/// Match `pattern` against `value`, extending `bindings` on success.
/// On overlapping names the left-most binding wins.
pub(crate) fn match_pattern(
    pattern: &Pattern,
    value: &Value,
    bindings: &mut Bindings,
) -> Result<bool, RuntimeError> {
    match pattern {
        Pattern::Wildcard => Ok(true),
        Pattern::Var(name) => {
            bindings
                .entry(name.clone())
                .or_insert_with(|| value.clone());
            Ok(true)
        }
        Pattern::Literal(expr) => Ok(&literal_value(expr)? == value),
        Pattern::Record(record) => {
            let Value::Record(instance) = value else {
                return Ok(false);
            };
            if instance.borrow().name != record.type_name {
                return Ok(false);
            }
            for field_pattern in &record.fields {
                let field_value = instance.borrow().fields.get(&field_pattern.field).cloned();
                let Some(field_value) = field_value else {
                    return Ok(false);
                };
                if !match_pattern(&field_pattern.pattern, &field_value, bindings)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        // variant values have no construction form yet, so nothing matches
        Pattern::Variant(_) => Ok(false),
    }
}

fn literal_value(expr: &Expr) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Int(v) => Ok(Value::Int(*v)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        _ => Err(RuntimeError::NonConstantPattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RecordInstance;
    use frontend::ast::{RecordFieldPattern, RecordPattern, VariantPattern};
    use std::collections::HashSet;

    fn user(name: &str) -> Value {
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), Value::Str(name.to_string()));
        Value::record(RecordInstance {
            name: "User".to_string(),
            fields,
            immutable_fields: HashSet::new(),
        })
    }

    #[test]
    fn wildcard_matches_without_binding() {
        let mut bindings = Bindings::new();
        assert!(match_pattern(&Pattern::Wildcard, &Value::Int(5), &mut bindings).unwrap());
        assert!(bindings.is_empty());
    }

    #[test]
    fn var_pattern_binds_the_value() {
        let mut bindings = Bindings::new();
        let pattern = Pattern::Var("x".to_string());
        assert!(match_pattern(&pattern, &Value::Int(5), &mut bindings).unwrap());
        assert_eq!(bindings.get("x"), Some(&Value::Int(5)));
    }

    #[test]
    fn literal_pattern_uses_value_equality() {
        let mut bindings = Bindings::new();
        let pattern = Pattern::Literal(Expr::Int(42));
        assert!(match_pattern(&pattern, &Value::Int(42), &mut bindings).unwrap());
        assert!(!match_pattern(&pattern, &Value::Int(41), &mut bindings).unwrap());
        assert!(!match_pattern(&pattern, &Value::Str("42".into()), &mut bindings).unwrap());

        let null = Pattern::Literal(Expr::Null);
        assert!(match_pattern(&null, &Value::Null, &mut bindings).unwrap());
    }

    #[test]
    fn record_pattern_requires_matching_type_name() {
        let pattern = Pattern::Record(RecordPattern {
            type_name: "Admin".to_string(),
            fields: vec![],
        });
        let mut bindings = Bindings::new();
        assert!(!match_pattern(&pattern, &user("ada"), &mut bindings).unwrap());
    }

    #[test]
    fn record_pattern_binds_named_fields() {
        let pattern = Pattern::Record(RecordPattern {
            type_name: "User".to_string(),
            fields: vec![RecordFieldPattern {
                field: "name".to_string(),
                pattern: Pattern::Var("n".to_string()),
            }],
        });
        let mut bindings = Bindings::new();
        assert!(match_pattern(&pattern, &user("ada"), &mut bindings).unwrap());
        assert_eq!(bindings.get("n"), Some(&Value::Str("ada".to_string())));
    }

    #[test]
    fn overlapping_bindings_keep_the_leftmost() {
        let pattern = Pattern::Record(RecordPattern {
            type_name: "Pair".to_string(),
            fields: vec![
                RecordFieldPattern {
                    field: "a".to_string(),
                    pattern: Pattern::Var("x".to_string()),
                },
                RecordFieldPattern {
                    field: "b".to_string(),
                    pattern: Pattern::Var("x".to_string()),
                },
            ],
        });
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), Value::Int(1));
        fields.insert("b".to_string(), Value::Int(2));
        let pair = Value::record(RecordInstance {
            name: "Pair".to_string(),
            fields,
            immutable_fields: HashSet::new(),
        });
        let mut bindings = Bindings::new();
        assert!(match_pattern(&pattern, &pair, &mut bindings).unwrap());
        assert_eq!(bindings.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn variant_pattern_never_matches() {
        let pattern = Pattern::Variant(VariantPattern {
            type_name: "Shape".to_string(),
            variant: "Circle".to_string(),
            fields: vec![Pattern::Wildcard],
        });
        let mut bindings = Bindings::new();
        assert!(!match_pattern(&pattern, &Value::Int(1), &mut bindings).unwrap());
        assert!(!match_pattern(&pattern, &user("ada"), &mut bindings).unwrap());
    }

    #[test]
    fn non_constant_literal_pattern_is_an_error() {
        let pattern = Pattern::Literal(Expr::Var("x".to_string()));
        let mut bindings = Bindings::new();
        let err = match_pattern(&pattern, &Value::Int(1), &mut bindings).unwrap_err();
        assert!(matches!(err, RuntimeError::NonConstantPattern));
    }
}
