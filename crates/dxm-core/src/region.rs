//! # Regions
//!
//! A vendor's service area is classified with tags drawn from a fixed
//! enumeration of Korean metropolitan cities and provinces. Historically the
//! record source carried the tags either as a single string (`"서울"`) or as a
//! comma-joined list (`"서울,경기"`). [`RegionTags`] normalizes both shapes
//! once, at deserialization, so the filter engine only ever sees a set.
//!
//! Unknown tags are kept verbatim for display and round-tripping but never
//! match a region predicate.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Number of regions in the enumeration.
pub const REGION_COUNT: usize = 17;

/// Label used by the UI for "no region restriction". Not a region.
pub const ALL_REGIONS_LABEL: &str = "전체";

/// Geographic service-area tag.
///
/// Declaration order is the canonical display order and drives `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "서울")]
    Seoul,
    #[serde(rename = "경기")]
    Gyeonggi,
    #[serde(rename = "인천")]
    Incheon,
    #[serde(rename = "대전")]
    Daejeon,
    #[serde(rename = "부산")]
    Busan,
    #[serde(rename = "대구")]
    Daegu,
    #[serde(rename = "광주")]
    Gwangju,
    #[serde(rename = "울산")]
    Ulsan,
    #[serde(rename = "세종")]
    Sejong,
    #[serde(rename = "강원")]
    Gangwon,
    #[serde(rename = "충북")]
    Chungbuk,
    #[serde(rename = "충남")]
    Chungnam,
    #[serde(rename = "전북")]
    Jeonbuk,
    #[serde(rename = "전남")]
    Jeonnam,
    #[serde(rename = "경북")]
    Gyeongbuk,
    #[serde(rename = "경남")]
    Gyeongnam,
    #[serde(rename = "제주")]
    Jeju,
}

impl Region {
    /// All regions in canonical order.
    pub fn all() -> &'static [Region] {
        &[
            Self::Seoul,
            Self::Gyeonggi,
            Self::Incheon,
            Self::Daejeon,
            Self::Busan,
            Self::Daegu,
            Self::Gwangju,
            Self::Ulsan,
            Self::Sejong,
            Self::Gangwon,
            Self::Chungbuk,
            Self::Chungnam,
            Self::Jeonbuk,
            Self::Jeonnam,
            Self::Gyeongbuk,
            Self::Gyeongnam,
            Self::Jeju,
        ]
    }

    /// Korean display label. Matches the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seoul => "서울",
            Self::Gyeonggi => "경기",
            Self::Incheon => "인천",
            Self::Daejeon => "대전",
            Self::Busan => "부산",
            Self::Daegu => "대구",
            Self::Gwangju => "광주",
            Self::Ulsan => "울산",
            Self::Sejong => "세종",
            Self::Gangwon => "강원",
            Self::Chungbuk => "충북",
            Self::Chungnam => "충남",
            Self::Jeonbuk => "전북",
            Self::Jeonnam => "전남",
            Self::Gyeongbuk => "경북",
            Self::Gyeongnam => "경남",
            Self::Jeju => "제주",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = CoreError;

    /// Parse a region from its Korean label. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == label)
            .ok_or_else(|| CoreError::UnknownRegion(label.to_string()))
    }
}

/// Canonical set of region tags carried by one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTags {
    known: BTreeSet<Region>,
    unknown: Vec<String>,
}

impl RegionTags {
    /// Parse a single label or a comma-joined list of labels.
    pub fn parse(raw: &str) -> Self {
        Self::from_labels(raw.split(','))
    }

    /// Build from individual labels. Blank labels are dropped, unknown ones
    /// kept verbatim (deduplicated).
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tags = Self::default();
        for label in labels {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            match label.parse::<Region>() {
                Ok(region) => {
                    tags.known.insert(region);
                }
                Err(_) => {
                    if !tags.unknown.iter().any(|u| u == label) {
                        tags.unknown.push(label.to_string());
                    }
                }
            }
        }
        tags
    }

    /// Whether `region` is one of the known tags.
    pub fn contains(&self, region: Region) -> bool {
        self.known.contains(&region)
    }

    /// Whether at least one known tag is in `selected`.
    pub fn intersects(&self, selected: &BTreeSet<Region>) -> bool {
        self.known.iter().any(|r| selected.contains(r))
    }

    /// Known tags in canonical order.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.known.iter().copied()
    }

    /// Tags that are not part of the enumeration.
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    /// True when no tag (known or unknown) is present.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.unknown.is_empty()
    }

    /// Every label, known tags first in canonical order.
    pub fn labels(&self) -> Vec<&str> {
        self.known
            .iter()
            .map(|r| r.as_str())
            .chain(self.unknown.iter().map(String::as_str))
            .collect()
    }

    /// Comma-joined wire representation, e.g. `"서울,경기"`.
    pub fn to_wire_string(&self) -> String {
        self.labels().join(",")
    }
}

impl fmt::Display for RegionTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(", "))
    }
}

impl FromIterator<Region> for RegionTags {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        Self {
            known: iter.into_iter().collect(),
            unknown: Vec::new(),
        }
    }
}

impl Serialize for RegionTags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_string())
    }
}

impl<'de> Deserialize<'de> for RegionTags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Joined(String),
            List(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Joined(s) => Self::parse(&s),
            Raw::List(items) => Self::from_labels(items.iter().flat_map(|s| s.split(','))),
        })
    }
}
