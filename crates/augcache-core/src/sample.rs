//! Samples produced upstream and served by the cache
//!
//! A [`Sample`] pairs an n-dimensional image with an ordered list of property
//! records. Records keep their attributes in insertion order so that
//! re-serializing a sample is deterministic.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// N-dimensional numeric image
pub type Image = ArrayD<f64>;

/// One upstream output, or one transformed view of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub image: Image,
    pub properties: Properties,
}

impl Sample {
    pub fn new(image: Image, properties: Properties) -> Self {
        Self { image, properties }
    }

    /// Sample with an empty property list
    pub fn from_image(image: Image) -> Self {
        Self {
            image,
            properties: Properties::default(),
        }
    }
}

/// Named attributes describing one object in an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyRecord {
    fields: Map<String, Value>,
}

impl PropertyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace an attribute, keeping its original position if it existed
    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Numeric attribute such as an intensity
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// Numeric sequence attribute such as a position
    ///
    /// Returns `None` if the attribute is missing or any element is not a number.
    pub fn get_vector(&self, key: &str) -> Option<Vec<f64>> {
        self.fields
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        // shift_remove keeps the remaining attributes in insertion order
        self.fields.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl From<Map<String, Value>> for PropertyRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Ordered property records attached to an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    records: Vec<PropertyRecord>,
}

impl Properties {
    pub fn new(records: Vec<PropertyRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: PropertyRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [PropertyRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply a fallible edit to every record, stopping at the first failure
    pub fn for_each_record<F>(&mut self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(&mut PropertyRecord) -> anyhow::Result<()>,
    {
        for record in &mut self.records {
            f(record)?;
        }
        Ok(())
    }
}

impl FromIterator<PropertyRecord> for Properties {
    fn from_iter<I: IntoIterator<Item = PropertyRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_preserves_insertion_order() {
        let record = PropertyRecord::new()
            .with("position", json!([0.0, 1.0]))
            .with("intensity", 2.5)
            .with("label", "spot");

        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["position", "intensity", "label"]);

        let serialized = serde_json::to_string(&record).unwrap();
        assert_eq!(
            serialized,
            r#"{"position":[0.0,1.0],"intensity":2.5,"label":"spot"}"#
        );
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut record = PropertyRecord::new().with("a", 1).with("b", 2);
        record.set("a", 10);

        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get_f64("a"), Some(10.0));
    }

    #[test]
    fn test_remove_keeps_order_of_rest() {
        let mut record = PropertyRecord::new().with("a", 1).with("b", 2).with("c", 3);
        record.remove("b");

        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(!record.contains("b"));
    }

    #[test]
    fn test_vector_accessor() {
        let record = PropertyRecord::new()
            .with("position", json!([3, 4.5]))
            .with("mixed", json!([1, "x"]));

        assert_eq!(record.get_vector("position"), Some(vec![3.0, 4.5]));
        assert_eq!(record.get_vector("mixed"), None);
        assert_eq!(record.get_vector("missing"), None);
    }

    #[test]
    fn test_for_each_record_stops_on_error() {
        let mut properties: Properties = (0..3)
            .map(|i| PropertyRecord::new().with("id", i))
            .collect();

        let mut visited = 0;
        let result = properties.for_each_record(|record| {
            visited += 1;
            if record.get_f64("id") == Some(1.0) {
                anyhow::bail!("stop");
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(visited, 2);
    }
}
