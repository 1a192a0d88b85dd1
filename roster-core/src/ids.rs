use serde::{Deserialize, Serialize};

/// How a collection picks the id of a newly created record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// `len + 1`. Matches snapshots written by the browser panel, but hands
    /// out an id that is still in use once any record other than the last
    /// one has been deleted.
    #[default]
    CountPlusOne,
    /// `max(id) + 1` over the current collection.
    MaxPlusOne,
}

impl IdStrategy {
    pub fn next_id<I>(&self, existing: I) -> u64
    where
        I: IntoIterator<Item = u64>,
    {
        match self {
            IdStrategy::CountPlusOne => existing.into_iter().count() as u64 + 1,
            IdStrategy::MaxPlusOne => {
                existing.into_iter().max().map_or(1, |max| max + 1)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::CountPlusOne => "count-plus-one",
            IdStrategy::MaxPlusOne => "max-plus-one",
        }
    }
}

impl std::fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "count-plus-one" | "count" | "legacy" => Ok(IdStrategy::CountPlusOne),
            "max-plus-one" | "max" | "monotonic" => Ok(IdStrategy::MaxPlusOne),
            _ => Err(format!("Invalid id strategy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_plus_one_reuses_ids_after_delete() {
        // Ids 1 and 3 remain after deleting 2; the count rule hands out 3 again.
        let ids = [1_u64, 3];
        assert_eq!(IdStrategy::CountPlusOne.next_id(ids), 3);
        assert_eq!(IdStrategy::MaxPlusOne.next_id(ids), 4);
    }

    #[test]
    fn empty_collection_starts_at_one() {
        assert_eq!(IdStrategy::CountPlusOne.next_id(std::iter::empty()), 1);
        assert_eq!(IdStrategy::MaxPlusOne.next_id(std::iter::empty()), 1);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(
            "max_plus_one".parse::<IdStrategy>().unwrap(),
            IdStrategy::MaxPlusOne
        );
        assert_eq!(
            "legacy".parse::<IdStrategy>().unwrap(),
            IdStrategy::CountPlusOne
        );
        assert!("uuid".parse::<IdStrategy>().is_err());
    }
}
