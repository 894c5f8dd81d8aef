// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::Value;
use p2panda_attributes_core::validation::forbidden_characters_in_text;
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{FormFieldSettings, ItemContext, ItemProcessor, ItemType, ProtocolItem, wrong_item};

fn invalid(reason: impl Into<String>) -> AttributesError {
    AttributesError::InvalidFormFieldResponse(reason.into())
}

/// Checks a response against the settings of the form field it answers.
pub fn validate_form_field_response(
    settings: &FormFieldSettings,
    response: &Value,
) -> ValidationResult {
    match (settings, response) {
        (FormFieldSettings::String { max_length }, Value::String(text)) => {
            if let Some(max_length) = max_length
                && text.chars().count() > *max_length
            {
                return Err(invalid(format!("longer than {max_length} characters")));
            }
            let forbidden = forbidden_characters_in_text(text);
            if !forbidden.is_empty() {
                return Err(invalid("contains forbidden characters"));
            }
            Ok(())
        }
        (FormFieldSettings::Integer { min, max }, Value::Integer(number)) => {
            if min.is_some_and(|min| *number < min) || max.is_some_and(|max| *number > max) {
                return Err(invalid(format!("{number} is out of range")));
            }
            Ok(())
        }
        (FormFieldSettings::Boolean, Value::Boolean(_)) => Ok(()),
        (FormFieldSettings::Selection { options, .. }, Value::String(choice)) => {
            if !options.contains(choice) {
                return Err(invalid(format!("'{choice}' is not an option")));
            }
            Ok(())
        }
        (
            FormFieldSettings::Selection {
                options,
                allow_multiple,
            },
            Value::List(choices),
        ) => {
            if !allow_multiple {
                return Err(invalid("only one option may be selected"));
            }
            for choice in choices {
                let Value::String(choice) = choice else {
                    return Err(invalid("options must be strings"));
                };
                if !options.contains(choice) {
                    return Err(invalid(format!("'{choice}' is not an option")));
                }
            }
            Ok(())
        }
        _ => Err(invalid("response does not fit the form field")),
    }
}

/// Validates the answer to a form field, nothing is stored.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormFieldRequestItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for FormFieldRequestItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::FormField
    }

    async fn check_prerequisites(
        &self,
        _attributes: &Attributes<S>,
        item: &ProtocolItem,
        _context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::FormField(item, accept) = item else {
            return Err(wrong_item(ItemType::FormField, item));
        };
        validate_form_field_response(&item.settings, &accept.response)
    }

    async fn process(
        &self,
        _attributes: &Attributes<S>,
        item: &ProtocolItem,
        _context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        if !matches!(item, ProtocolItem::FormField(..)) {
            return Err(wrong_item(ItemType::FormField, item));
        }
        Ok(None)
    }

    async fn rollback(
        &self,
        _attributes: &Attributes<S>,
        item: &ProtocolItem,
        _context: &ItemContext,
    ) -> ValidationResult {
        if !matches!(item, ProtocolItem::FormField(..)) {
            return Err(wrong_item(ItemType::FormField, item));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use p2panda_attributes_core::Value;
    use rstest::rstest;

    use crate::error::AttributesError;
    use crate::processors::FormFieldSettings;

    use super::validate_form_field_response;

    fn selection(allow_multiple: bool) -> FormFieldSettings {
        FormFieldSettings::Selection {
            options: vec!["red".into(), "green".into()],
            allow_multiple,
        }
    }

    #[rstest]
    #[case(FormFieldSettings::String { max_length: Some(5) }, Value::from("hello"))]
    #[case(FormFieldSettings::String { max_length: None }, Value::from("line\nbreak"))]
    #[case(FormFieldSettings::Integer { min: Some(0), max: Some(10) }, Value::from(10))]
    #[case(FormFieldSettings::Boolean, Value::from(false))]
    #[case(selection(false), Value::from("red"))]
    #[case(selection(true), Value::List(vec!["red".into(), "green".into()]))]
    fn accepts_fitting_responses(#[case] settings: FormFieldSettings, #[case] response: Value) {
        assert!(validate_form_field_response(&settings, &response).is_ok());
    }

    #[rstest]
    #[case(FormFieldSettings::String { max_length: Some(4) }, Value::from("hello"))]
    #[case(FormFieldSettings::String { max_length: None }, Value::from("bell\u{7}"))]
    #[case(FormFieldSettings::Integer { min: Some(0), max: None }, Value::from(-1))]
    #[case(FormFieldSettings::Boolean, Value::from("true"))]
    #[case(selection(false), Value::from("blue"))]
    #[case(selection(false), Value::List(vec!["red".into()]))]
    #[case(selection(true), Value::List(vec!["red".into(), Value::from(1)]))]
    fn rejects_other_responses(#[case] settings: FormFieldSettings, #[case] response: Value) {
        assert_matches!(
            validate_form_field_response(&settings, &response),
            Err(AttributesError::InvalidFormFieldResponse(_))
        );
    }
}
