use serde::{Deserialize, Serialize};

/// A single recorded city search.
///
/// Entries are only created by [`HistoryStore::append`](crate::HistoryStore::append),
/// which assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEntry")]
pub struct HistoryEntry {
    pub id: String,
    /// Search string exactly as the caller supplied it.
    pub city: String,
}

/// On-disk shape. Older documents stored the city as `name`; when both
/// fields are present `city` wins.
#[derive(Deserialize)]
struct StoredEntry {
    id: String,
    city: Option<String>,
    name: Option<String>,
}

impl TryFrom<StoredEntry> for HistoryEntry {
    type Error = String;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        let city = stored
            .city
            .or(stored.name)
            .ok_or_else(|| format!("history entry {} has no city", stored.id))?;
        Ok(Self::new(stored.id, city))
    }
}

impl HistoryEntry {
    pub(crate) fn new(id: String, city: impl Into<String>) -> Self {
        Self {
            id,
            city: city.into(),
        }
    }

    /// Generate a fresh random entry id.
    pub(crate) fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_entry_serialization() {
        let entry = HistoryEntry::new("abc".to_string(), "Paris");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"id":"abc","city":"Paris"}"#);
    }

    #[test]
    fn test_legacy_name_field_is_accepted() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"id":"abc","name":"Tokyo"}"#).unwrap();
        assert_eq!(entry.city, "Tokyo");
    }

    #[test]
    fn test_city_wins_over_legacy_name() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"id":"1","city":"Paris","name":"Lyon"}"#).unwrap();
        assert_eq!(entry, HistoryEntry::new("1".to_string(), "Paris"));
    }

    #[test]
    fn test_entry_without_city_is_rejected() {
        let err = serde_json::from_str::<HistoryEntry>(r#"{"id":"1"}"#).unwrap_err();
        assert!(err.to_string().contains("has no city"));
    }

    #[test]
    fn test_generated_ids_are_uuids() {
        let id = HistoryEntry::generate_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
