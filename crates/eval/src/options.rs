//! Per-option display and disable state for a question.

use serde::Serialize;

use crate::evaluator::evaluate_bool;
use crate::types::{EvalError, OptionDef, ResponseContext, SurveyItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionState {
    pub key: String,
    pub visible: bool,
    pub disabled: bool,
}

/// Evaluate the display condition and disabled expression of every option.
///
/// Options without a display condition are visible and options without a
/// disabled expression are enabled. A failing expression is reported as a
/// condition error of `<item>.<option>`.
pub fn option_states(
    item: &SurveyItem,
    ctx: &ResponseContext,
) -> Result<Vec<OptionState>, EvalError> {
    item.options()
        .iter()
        .map(|option| state_of(&item.key, option, ctx))
        .collect()
}

fn state_of(
    item_key: &str,
    option: &OptionDef,
    ctx: &ResponseContext,
) -> Result<OptionState, EvalError> {
    let wrap = |e: EvalError| e.in_condition(&format!("{}.{}", item_key, option.key));
    let visible = match &option.display_condition {
        Some(expr) => evaluate_bool(expr, ctx).map_err(wrap)?,
        None => true,
    };
    let disabled = match &option.disabled {
        Some(expr) => evaluate_bool(expr, ctx).map_err(wrap)?,
        None => false,
    };
    Ok(OptionState {
        key: option.key.clone(),
        visible,
        disabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GroupBuilder;
    use crate::expression::build::*;
    use crate::types::{OptionRole, ResponseItem, ResponseNode, ResponseRole};

    fn exclusive_question() -> SurveyItem {
        GroupBuilder::root("s")
            .question("Q", None, ResponseRole::MultipleChoice)
            .option("1")
            .option_def(OptionDef {
                key: "2".into(),
                role: OptionRole::Option,
                display_condition: None,
                disabled: Some(response_has_keys_any("s.Q", "rg.mcg", &["0"])),
            })
            .option_def(OptionDef {
                key: "other".into(),
                role: OptionRole::TextInput,
                display_condition: Some(has_participant_flag("showOther")),
                disabled: None,
            })
            .build()
    }

    #[test]
    fn defaults_are_visible_and_enabled() {
        let states = option_states(&exclusive_question(), &ResponseContext::new(0)).unwrap();
        assert_eq!(
            states[0],
            OptionState {
                key: "1".into(),
                visible: true,
                disabled: false
            }
        );
        assert!(!states[1].disabled);
        assert!(!states[2].visible);
    }

    #[test]
    fn exclusive_answer_disables_option() {
        let ctx = ResponseContext::new(0).with_response(ResponseItem::new(
            "s.Q",
            ResponseNode::group(
                "rg",
                vec![ResponseNode::group("mcg", vec![ResponseNode::leaf("0")])],
            ),
        ));
        let states = option_states(&exclusive_question(), &ctx).unwrap();
        assert!(states[1].disabled);
    }

    #[test]
    fn broken_option_condition_names_option() {
        let item = GroupBuilder::root("s")
            .question("Q", None, ResponseRole::SingleChoice)
            .option_def(OptionDef {
                key: "a".into(),
                role: OptionRole::Option,
                display_condition: Some(lit(5)),
                disabled: None,
            })
            .build();
        let err = option_states(&item, &ResponseContext::new(0)).unwrap_err();
        assert!(matches!(err, EvalError::Condition { ref item_key, .. } if item_key == "s.Q.a"));
    }
}
