//! Payload format descriptors and well-known resource type URLs.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a block's payload is encoded: MIME type plus optional schema and
/// encoding tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Format {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            schema: None,
            encoding: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type)?;
        if let Some(schema) = &self.schema {
            write!(f, "; schema={}", schema)?;
        }
        if let Some(encoding) = &self.encoding {
            write!(f, "; encoding={}", encoding)?;
        }
        Ok(())
    }
}

const DCMI_BASE: &str = "http://purl.org/dc/dcmitype/";

/// The URL naming what kind of resource a block describes.
///
/// Any URL is accepted; the DCMI type vocabulary is provided as constants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(pub Cow<'static, str>);

impl ResourceType {
    pub const COLLECTION: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Collection"));
    pub const DATASET: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Dataset"));
    pub const EVENT: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Event"));
    pub const IMAGE: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Image"));
    pub const INTERACTIVE_RESOURCE: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/InteractiveResource"));
    pub const MOVING_IMAGE: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/MovingImage"));
    pub const PHYSICAL_OBJECT: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/PhysicalObject"));
    pub const SERVICE: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Service"));
    pub const SOFTWARE: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Software"));
    pub const SOUND: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Sound"));
    pub const STILL_IMAGE: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/StillImage"));
    pub const TEXT: ResourceType =
        ResourceType(Cow::Borrowed("http://purl.org/dc/dcmitype/Text"));

    pub const fn from_static(s: &'static str) -> Self {
        ResourceType(Cow::Borrowed(s))
    }

    pub fn new(s: impl Into<String>) -> Self {
        ResourceType(Cow::Owned(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DCMI type vocabulary.
    pub fn well_known() -> [ResourceType; 12] {
        [
            Self::COLLECTION,
            Self::DATASET,
            Self::EVENT,
            Self::IMAGE,
            Self::INTERACTIVE_RESOURCE,
            Self::MOVING_IMAGE,
            Self::PHYSICAL_OBJECT,
            Self::SERVICE,
            Self::SOFTWARE,
            Self::SOUND,
            Self::STILL_IMAGE,
            Self::TEXT,
        ]
    }

    pub fn is_well_known(&self) -> bool {
        self.as_str().starts_with(DCMI_BASE) && Self::well_known().contains(self)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for ResourceType {
    fn from(s: &'static str) -> Self {
        ResourceType(Cow::Borrowed(s))
    }
}

impl From<String> for ResourceType {
    fn from(s: String) -> Self {
        ResourceType(Cow::Owned(s))
    }
}
