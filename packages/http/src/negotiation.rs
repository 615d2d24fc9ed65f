//! The endpoint's root description: where blocks are stored and what the
//! storage node can hold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const UNITS: [(char, u32); 5] = [('P', 5), ('T', 4), ('G', 3), ('M', 2), ('K', 1)];

/// A storage size. Serialized as a number with an optional binary unit
/// suffix (`512`, `4K`, `2G`) or one of the sentinels `UNLIMITED` and
/// `UNDEFINED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capacity {
    Unlimited,
    #[default]
    Undefined,
    Bytes(u64),
}

impl Capacity {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Capacity::Bytes(n) => Some(*n),
            _ => None,
        }
    }

    /// Lenient parse. A fractional magnitude (`2.0G`, `1.5M`) is rounded up
    /// to whole bytes. Anything unrecognized is `Undefined`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Capacity::Unlimited;
        }
        let (digits, exponent) = match UNITS.iter().find(|(unit, _)| s.ends_with(*unit)) {
            Some((_, exponent)) => (&s[..s.len() - 1], *exponent),
            None => (s, 0),
        };
        let factor = 1024u64.pow(exponent);
        if let Ok(n) = digits.parse::<u64>() {
            return n.checked_mul(factor).map_or(Capacity::Undefined, Capacity::Bytes);
        }
        match digits.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => {
                let bytes = (n * factor as f64).ceil();
                if bytes < u64::MAX as f64 {
                    Capacity::Bytes(bytes as u64)
                } else {
                    Capacity::Undefined
                }
            }
            _ => Capacity::Undefined,
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Capacity::Unlimited => return f.write_str("UNLIMITED"),
            Capacity::Undefined => return f.write_str("UNDEFINED"),
            Capacity::Bytes(n) => *n,
        };
        if n != 0 {
            for (unit, exponent) in UNITS {
                let factor = 1024u64.pow(exponent);
                if n % factor == 0 {
                    return write!(f, "{}{}", n / factor, unit);
                }
            }
        }
        write!(f, "{}", n)
    }
}

impl FromStr for Capacity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Capacity::parse(s))
    }
}

impl From<String> for Capacity {
    fn from(s: String) -> Self {
        Capacity::parse(&s)
    }
}

impl From<Capacity> for String {
    fn from(c: Capacity) -> Self {
        c.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageNode {
    #[serde(rename = "LINK")]
    pub link: String,
    #[serde(rename = "CAPACITY", default)]
    pub capacity: Capacity,
    #[serde(rename = "FREE_SPACE", default)]
    pub free_space: Capacity,
    #[serde(rename = "DISTRIBUTED", default)]
    pub distributed: bool,
    #[serde(rename = "DELETE_DISABLED", default)]
    pub delete_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementNode {
    #[serde(rename = "LINK")]
    pub link: String,
    #[serde(rename = "FLUSH", default)]
    pub flush: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationData {
    #[serde(rename = "VERSION", default)]
    pub version: i64,
    #[serde(rename = "STORAGE")]
    pub storage: StorageNode,
    #[serde(rename = "MANAGEMENT", default, skip_serializing_if = "Option::is_none")]
    pub management: Option<ManagementNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_with_largest_exact_unit() {
        assert_eq!(Capacity::Bytes(512).to_string(), "512");
        assert_eq!(Capacity::Bytes(4096).to_string(), "4K");
        assert_eq!(Capacity::Bytes(1536).to_string(), "1536");
        assert_eq!(Capacity::Bytes(2 * 1024 * 1024 * 1024).to_string(), "2G");
        assert_eq!(Capacity::Bytes(1024u64.pow(5) * 3).to_string(), "3P");
        assert_eq!(Capacity::Bytes(0).to_string(), "0");
        assert_eq!(Capacity::Unlimited.to_string(), "UNLIMITED");
        assert_eq!(Capacity::Undefined.to_string(), "UNDEFINED");
    }

    #[test]
    fn parses_suffixes_and_sentinels() {
        assert_eq!(Capacity::parse("4K"), Capacity::Bytes(4096));
        assert_eq!(Capacity::parse("1M"), Capacity::Bytes(1024 * 1024));
        assert_eq!(Capacity::parse("100"), Capacity::Bytes(100));
        assert_eq!(Capacity::parse("unlimited"), Capacity::Unlimited);
        assert_eq!(Capacity::parse("UNDEFINED"), Capacity::Undefined);
        assert_eq!(Capacity::parse("lots"), Capacity::Undefined);
        assert_eq!(Capacity::parse("99999999999P"), Capacity::Undefined);
    }

    #[test]
    fn parses_fractional_magnitudes() {
        assert_eq!(Capacity::parse("2.0G"), Capacity::Bytes(2 * 1024 * 1024 * 1024));
        assert_eq!(Capacity::parse("1.5M"), Capacity::Bytes(1536 * 1024));
        assert_eq!(Capacity::parse("0.5K"), Capacity::Bytes(512));
        assert_eq!(Capacity::parse("0.001K"), Capacity::Bytes(2));
        assert_eq!(Capacity::parse("-1.5K"), Capacity::Undefined);
        assert_eq!(Capacity::parse("NaNK"), Capacity::Undefined);
        assert_eq!(Capacity::parse("1e30P"), Capacity::Undefined);
    }

    #[test]
    fn parse_inverts_format() {
        let samples = [
            0,
            1,
            1023,
            1024,
            1025,
            1536,
            1024 * 1024,
            5 * 1024u64.pow(4),
            1024u64.pow(5),
            u64::MAX,
        ];
        for n in samples {
            let c = Capacity::Bytes(n);
            assert_eq!(Capacity::parse(&c.to_string()), c, "{}", n);
        }
        assert_eq!(Capacity::parse(&Capacity::Unlimited.to_string()), Capacity::Unlimited);
    }

    #[test]
    fn reads_negotiation_document() {
        let doc = json!({
            "VERSION": 1,
            "STORAGE": {
                "LINK": "http://host/rest/M/st",
                "CAPACITY": "2.0G",
                "FREE_SPACE": "UNLIMITED",
                "DISTRIBUTED": false,
                "DELETE_DISABLED": true
            },
            "MANAGEMENT": {"LINK": "http://host/rest/M/mgmt", "FLUSH": true}
        });

        let data: NegotiationData = serde_json::from_value(doc).unwrap();
        assert_eq!(data.version, 1);
        assert_eq!(data.storage.link, "http://host/rest/M/st");
        assert_eq!(data.storage.capacity.bytes(), Some(2 * 1024 * 1024 * 1024));
        assert_eq!(data.storage.free_space, Capacity::Unlimited);
        assert!(data.storage.delete_disabled);
        assert_eq!(data.management.map(|m| m.flush), Some(true));
    }

    #[test]
    fn writes_capacity_as_string() {
        let node = StorageNode {
            link: "s".to_string(),
            capacity: Capacity::Bytes(8192),
            free_space: Capacity::Undefined,
            distributed: true,
            delete_disabled: false,
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["CAPACITY"], "8K");
        assert_eq!(value["FREE_SPACE"], "UNDEFINED");
    }
}
