//! Record views
//!
//! `%EACH%` bodies look fields up by name, so every element of an iterated
//! sequence has to be a mapping. Record types expose their fields through
//! [`Record`] instead of being inspected at runtime.

use super::value::{Map, Value};
use serde::Serialize;

/// A type whose named fields can be viewed as a context mapping
pub trait Record {
    fn fields(&self) -> Map;
}

impl Record for Map {
    fn fields(&self) -> Map {
        self.clone()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn fields(&self) -> Map {
        (**self).fields()
    }
}

/// Field view of a serializable record: its JSON object form.
///
/// Fields skipped by serde are absent from the view. Values that do not
/// serialize to an object have no fields.
pub fn serialized_fields<T: Serialize + ?Sized>(record: &T) -> Map {
    match Value::from_serialize(record) {
        Value::Map(fields) => fields,
        _ => Map::new(),
    }
}

impl Value {
    /// Lift a single record into a mapping value
    pub fn record<R: Record + ?Sized>(record: &R) -> Value {
        Value::Map(record.fields())
    }

    /// Lift an ordered collection of records into a sequence value
    pub fn records<I>(records: I) -> Value
    where
        I: IntoIterator,
        I::Item: Record,
    {
        Value::Seq(
            records
                .into_iter()
                .map(|record| Value::Map(record.fields()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: &'static str,
        right: i64,
    }

    impl Record for Pair {
        fn fields(&self) -> Map {
            let mut map = Map::new();
            map.insert("left".to_string(), self.left.into());
            map.insert("right".to_string(), self.right.into());
            map
        }
    }

    #[test]
    fn test_records_preserve_order() {
        let pairs = [
            Pair {
                left: "a",
                right: 1,
            },
            Pair {
                left: "b",
                right: 2,
            },
        ];

        let value = Value::records(&pairs);
        let items = value.as_seq().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_map().unwrap()["left"], Value::from("a"));
        assert_eq!(items[1].as_map().unwrap()["right"], Value::from(2i64));
    }

    #[derive(Serialize)]
    struct Listing {
        symbol: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    }

    impl Record for Listing {
        fn fields(&self) -> Map {
            serialized_fields(self)
        }
    }

    #[test]
    fn test_serialized_fields() {
        let listings = vec![
            Listing {
                symbol: "BTC".to_string(),
                image_url: Some("https://img/btc.png".to_string()),
            },
            Listing {
                symbol: "ETH".to_string(),
                image_url: None,
            },
        ];

        let value = Value::records(&listings);
        let items = value.as_seq().unwrap();
        assert_eq!(items[0].as_map().unwrap()["image_url"].to_text(), "https://img/btc.png");
        assert_eq!(items[1].as_map().unwrap()["symbol"], Value::from("ETH"));
        assert!(!items[1].as_map().unwrap().contains_key("image_url"));
    }

    #[test]
    fn test_non_object_has_no_fields() {
        assert!(serialized_fields(&[1, 2, 3]).is_empty());
        assert!(serialized_fields("BTC").is_empty());
    }

    #[test]
    fn test_empty_records_are_falsy() {
        let value = Value::records(Vec::<Map>::new());
        assert!(!value.is_truthy());
    }
}
