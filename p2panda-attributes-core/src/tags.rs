// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalogue of tags which can be attached to identity attributes.
//!
//! The catalogue is published by a tag-definition service. It maps every value type to a tree of
//! tags, a tag attached to an attribute names a path in that tree with its segments joined by
//! [`TAG_DELIMITER`], for example `content+%+emailAddress+%+private`.
//!
//! Tags with one of the [`CUSTOM_TAG_PREFIXES`] are not part of the catalogue and always valid.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::validation::ContentError;

/// Separator between the path segments of a tag.
pub const TAG_DELIMITER: &str = "+%+";

/// Prefixes of tags which do not need to be part of the catalogue.
pub const CUSTOM_TAG_PREFIXES: [&str; 5] = ["x:", "X:", "mimetype:", "urn:", "language:"];

/// Node in the tag tree of a value type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTag {
    /// Human-readable name per language code.
    pub display_names: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<BTreeMap<String, AttributeTag>>,
}

/// Tag trees for all value types.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTagCollection {
    pub supported_languages: Vec<String>,
    pub tags_for_attribute_value_types: BTreeMap<String, BTreeMap<String, AttributeTag>>,
}

impl AttributeTagCollection {
    /// Returns `true` if the tag is a custom tag or names a path in the tag tree of the value
    /// type.
    pub fn is_valid_tag(&self, value_type: &str, tag: &str) -> bool {
        if CUSTOM_TAG_PREFIXES
            .iter()
            .any(|prefix| tag.starts_with(prefix))
        {
            return true;
        }

        let Some(mut level) = self.tags_for_attribute_value_types.get(value_type) else {
            return false;
        };

        let mut segments = tag.split(TAG_DELIMITER).peekable();
        while let Some(segment) = segments.next() {
            let Some(node) = level.get(segment) else {
                return false;
            };

            if segments.peek().is_none() {
                return true;
            }

            match &node.children {
                Some(children) => level = children,
                None => return false,
            }
        }

        false
    }

    /// Returns all tags which are not valid for the value type.
    pub fn invalid_tags(&self, value_type: &str, tags: &BTreeSet<String>) -> Vec<String> {
        tags.iter()
            .filter(|tag| !self.is_valid_tag(value_type, tag))
            .cloned()
            .collect()
    }

    /// Fails with the list of invalid tags if any tag is not valid for the value type.
    pub fn validate_tags(
        &self,
        value_type: &str,
        tags: &BTreeSet<String>,
    ) -> Result<(), ContentError> {
        let invalid = self.invalid_tags(value_type, tags);
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ContentError::InvalidTags(invalid))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use crate::test_utils::tag_collection;
    use crate::validation::ContentError;

    #[rstest]
    #[case("GivenName", "x:nickname", true)]
    #[case("GivenName", "X:Nickname", true)]
    #[case("GivenName", "urn:example:tag", true)]
    #[case("GivenName", "language:de", true)]
    #[case("GivenName", "mimetype:text/plain", true)]
    #[case("EMailAddress", "content", true)]
    #[case("EMailAddress", "content+%+emailAddress", true)]
    #[case("EMailAddress", "content+%+emailAddress+%+private", false)]
    #[case("EMailAddress", "content+%+phoneNumber", false)]
    #[case("EMailAddress", "emailAddress", false)]
    #[case("GivenName", "content", false)]
    #[case("Unknown", "content", false)]
    #[case("EMailAddress", "", false)]
    fn tag_validity(#[case] value_type: &str, #[case] tag: &str, #[case] expected: bool) {
        assert_eq!(tag_collection().is_valid_tag(value_type, tag), expected);
    }

    #[test]
    fn reports_invalid_tags() {
        let tags = BTreeSet::from([
            "content+%+emailAddress".to_string(),
            "content+%+fax".to_string(),
            "x:custom".to_string(),
            "private".to_string(),
        ]);

        assert_eq!(
            tag_collection().validate_tags("EMailAddress", &tags),
            Err(ContentError::InvalidTags(vec![
                "content+%+fax".to_string(),
                "private".to_string()
            ]))
        );
    }

    #[test]
    fn decodes_service_json() {
        let json = r#"{
            "supportedLanguages": ["de", "en"],
            "tagsForAttributeValueTypes": {
                "PhoneNumber": {
                    "emergency": {
                        "displayNames": { "de": "Notfall", "en": "Emergency" },
                        "children": {
                            "first": { "displayNames": { "en": "First" } }
                        }
                    }
                }
            }
        }"#;

        let collection: super::AttributeTagCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.supported_languages, vec!["de", "en"]);
        assert!(collection.is_valid_tag("PhoneNumber", "emergency+%+first"));
        assert!(!collection.is_valid_tag("PhoneNumber", "emergency+%+second"));
    }
}
