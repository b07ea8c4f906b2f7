//! Evaluation records: free-form form data stored per patient.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Evaluation form data stored at `avaliacao/<patient>/<key>`.
///
/// The form layout belongs to the screens, so fields stay untyped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub fields: Map<String, Value>,
}

/// Shapes an evaluation can come back from the tree in. Field names
/// `"0".."n"` read back as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFields {
    Object(Map<String, Value>),
    List(Vec<Value>),
}

impl Evaluation {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// True when no field would be stored: nulls and empty objects or
    /// lists vanish from the tree.
    pub fn is_empty(&self) -> bool {
        !self.fields.values().any(holds_data)
    }
}

fn holds_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => map.values().any(holds_data),
        Value::Array(items) => items.iter().any(holds_data),
        _ => true,
    }
}

impl Serialize for Evaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Evaluation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = match StoredFields::deserialize(deserializer)? {
            StoredFields::Object(fields) => fields,
            StoredFields::List(items) => items
                .into_iter()
                .enumerate()
                .filter(|(_, value)| !value.is_null())
                .map(|(index, value)| (index.to_string(), value))
                .collect(),
        };
        Ok(Self { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::Evaluation;
    use serde_json::json;

    #[test]
    fn nulls_and_empty_containers_do_not_count_as_fields() {
        let blank = Evaluation::from_value(json!({"obs": null, "medidas": {}, "fotos": []}))
            .expect("object");
        assert!(blank.is_empty());
        assert!(Evaluation::default().is_empty());

        let nested = Evaluation::from_value(json!({"medidas": {"altura": 1.7}})).expect("object");
        assert!(!nested.is_empty());
        let falsy = Evaluation::from_value(json!({"dor": false})).expect("object");
        assert!(!falsy.is_empty());
    }

    #[test]
    fn index_keyed_fields_read_back_from_a_list() {
        let evaluation: Evaluation =
            serde_json::from_value(json!(["dor", "lombar"])).expect("list should decode");
        assert_eq!(evaluation.field("0"), Some(&json!("dor")));
        assert_eq!(evaluation.field("1"), Some(&json!("lombar")));

        assert_eq!(
            serde_json::to_value(&evaluation).expect("encode"),
            json!({"0": "dor", "1": "lombar"})
        );
        assert!(serde_json::from_value::<Evaluation>(json!("texto")).is_err());
    }
}
