// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checks on attribute content which do not depend on the value type catalogue.
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::content::AttributeContent;

/// Matches every character outside of printable text: letters, marks, numbers, punctuation,
/// symbols and spaces, plus tabs and line breaks.
static FORBIDDEN_CHARACTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}\p{P}\p{S}\p{Zs}\t\n\r]").unwrap());

/// Free-text fields of relationship attribute values which may contain any character.
const UNCHECKED_RELATIONSHIP_FIELDS: [&str; 2] = ["title", "description"];

fn collect_forbidden(text: &str, found: &mut Vec<char>) {
    for m in FORBIDDEN_CHARACTER.find_iter(text) {
        for c in m.as_str().chars() {
            if !found.contains(&c) {
                found.push(c);
            }
        }
    }
}

/// Returns all distinct forbidden characters in a piece of free text.
pub fn forbidden_characters_in_text(text: &str) -> Vec<char> {
    let mut found = Vec::new();
    collect_forbidden(text, &mut found);
    found
}

/// Returns all distinct forbidden characters in the content, in order of appearance.
pub fn forbidden_characters(content: &AttributeContent) -> Vec<char> {
    let mut found = Vec::new();

    match content {
        AttributeContent::Identity(content) => {
            content
                .value()
                .value()
                .visit_strings(&mut |_, text| collect_forbidden(text, &mut found));
        }
        AttributeContent::Relationship(content) => {
            collect_forbidden(content.key(), &mut found);
            content.value().value().visit_strings(&mut |field, text| {
                if field.is_some_and(|field| UNCHECKED_RELATIONSHIP_FIELDS.contains(&field)) {
                    return;
                }
                collect_forbidden(text, &mut found)
            });
        }
    }

    found
}

/// Fails if the content contains forbidden characters.
pub fn validate_characters(content: &AttributeContent) -> Result<(), ContentError> {
    let found = forbidden_characters(content);
    if found.is_empty() {
        Ok(())
    } else {
        Err(ContentError::ForbiddenCharacters(found))
    }
}

fn format_characters(characters: &[char]) -> String {
    characters
        .iter()
        .map(|c| format!("U+{:04X}", *c as u32))
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("content contains forbidden characters: {}", format_characters(.0))]
    ForbiddenCharacters(Vec<char>),

    #[error("content contains invalid tags: {}", .0.join(", "))]
    InvalidTags(Vec<String>),
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use crate::content::{AttributeContent, Confidentiality, RelationshipAttribute};
    use crate::test_utils::{address, given_name};
    use crate::value::{AttributeValue, Value};

    use super::{ContentError, forbidden_characters, validate_characters};

    #[rstest]
    #[case("Aurora")]
    #[case("Ærøskøbing – Straße 12")]
    #[case("multi\nline\ttext\r\n")]
    #[case("日本語のテキスト")]
    #[case("emoji 🦀 and symbols ©€")]
    fn printable_text_is_allowed(#[case] text: &str) {
        let content: AttributeContent = given_name(&address("alice"), text).into();
        assert_eq!(validate_characters(&content), Ok(()));
    }

    #[rstest]
    #[case("null\u{0}byte", vec!['\u{0}'])]
    #[case("bell\u{7}\u{7}", vec!['\u{7}'])]
    #[case("zero\u{200B}width\u{1}", vec!['\u{200B}', '\u{1}'])]
    fn control_characters_are_forbidden(#[case] text: &str, #[case] expected: Vec<char>) {
        let content: AttributeContent = given_name(&address("alice"), text).into();
        assert_eq!(
            validate_characters(&content),
            Err(ContentError::ForbiddenCharacters(expected))
        );
    }

    #[test]
    fn title_and_description_of_relationship_values_are_exempt() {
        let value = AttributeValue::new(
            "ProprietaryString",
            Value::Map(BTreeMap::from([
                ("title".to_string(), Value::from("title\u{0}")),
                ("description".to_string(), Value::from("desc\u{1}")),
                ("value".to_string(), Value::from("value\u{2}")),
            ])),
        );
        let content: AttributeContent = RelationshipAttribute::new(
            address("alice"),
            "key\u{3}",
            Confidentiality::Public,
            value,
        )
        .into();

        assert_eq!(forbidden_characters(&content), vec!['\u{3}', '\u{2}']);
    }

    #[test]
    fn error_lists_code_points() {
        let err = ContentError::ForbiddenCharacters(vec!['\u{0}', '\u{200B}']);
        assert_eq!(
            err.to_string(),
            "content contains forbidden characters: U+0000, U+200B"
        );
    }
}
