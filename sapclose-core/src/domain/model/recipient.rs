// sapclose-core/src/domain/model/recipient.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Which countries a recipient wants to hear about. Configured either as the
/// sentinel string `All` or as one/many country codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryInterest {
    All,
    Only(Vec<String>),
}

impl CountryInterest {
    /// `None` stands for a case with no country assigned; only `All`
    /// recipients see those.
    pub fn covers(&self, country: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(codes) => match country {
                Some(c) => codes.iter().any(|code| code == c),
                None => false,
            },
        }
    }
}

impl<'de> Deserialize<'de> for CountryInterest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::One(s) if s == "All" => Ok(CountryInterest::All),
            Raw::One(s) if s.is_empty() => Err(de::Error::custom(
                "recipient country interest cannot be empty; use 'All' or a country code",
            )),
            Raw::One(s) => Ok(CountryInterest::Only(vec![s])),
            Raw::Many(codes) if codes.is_empty() => Err(de::Error::custom(
                "recipient country interest list cannot be empty; use 'All' instead",
            )),
            Raw::Many(codes) => Ok(CountryInterest::Only(codes)),
        }
    }
}

impl Serialize for CountryInterest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::All => serializer.serialize_str("All"),
            Self::Only(codes) => codes.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Recipient {
    pub name: String,
    pub surname: String,
    pub mail: String,
    pub country: CountryInterest,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_all_sentinel_covers_everything() -> Result<()> {
        let yaml = "name: Jan\nsurname: Novak\nmail: jan.novak@example.com\ncountry: All";
        let recipient: Recipient = serde_yaml::from_str(yaml)?;

        assert_eq!(recipient.country, CountryInterest::All);
        assert!(recipient.country.covers(Some("DE")));
        assert!(recipient.country.covers(None));
        Ok(())
    }

    #[test]
    fn test_single_country_interest() -> Result<()> {
        let yaml = "name: Eva\nsurname: Weber\nmail: eva.weber@example.com\ncountry: DE";
        let recipient: Recipient = serde_yaml::from_str(yaml)?;

        assert!(recipient.country.covers(Some("DE")));
        assert!(!recipient.country.covers(Some("AT")));
        assert!(!recipient.country.covers(None));
        Ok(())
    }

    #[test]
    fn test_country_list_interest() -> Result<()> {
        let yaml = "name: Ana\nsurname: Silva\nmail: ana.silva@example.com\ncountry: [DE, AT]";
        let recipient: Recipient = serde_yaml::from_str(yaml)?;

        assert!(recipient.country.covers(Some("AT")));
        assert!(!recipient.country.covers(Some("FR")));
        Ok(())
    }

    #[test]
    fn test_empty_interest_rejected() {
        let yaml = "name: Jo\nsurname: Doe\nmail: jo.doe@example.com\ncountry: []";
        assert!(serde_yaml::from_str::<Recipient>(yaml).is_err());
    }
}
