//! Handoff-signal detection in documented precedence order (SPEC_FULL §4.6).
//! Grounded on `orchestrator::router::evaluator::RuleEvaluator`'s
//! precedence-ordered dispatch idiom — try the highest-precedence strategy
//! first, fall through on `None`, never merge partial results from two
//! strategies.

use std::collections::{HashMap, HashSet};

use chat_contract::ChatMessage;

/// The raw candidate target named by `message`, in documented precedence:
/// structured `additional_properties`, then tool-call, then the best-effort
/// text hint. Does not check the candidate against any allow-list.
fn candidate_target(message: &ChatMessage) -> Option<String> {
    message
        .structured_handoff_target()
        .or_else(|| message.tool_call_handoff_target())
        .or_else(|| message.text_hint_handoff_target())
}

/// The validated handoff target for a reply just produced by
/// `current_agent_id`, or `None` if the message names no target or names one
/// not present in `current_agent_id`'s allowed set. Unknown target ids are
/// "no handoff" per spec, not an error.
pub fn detect_handoff(message: &ChatMessage, current_agent_id: &str, allowed_handoffs: &HashMap<String, HashSet<String>>) -> Option<String> {
    let candidate = candidate_target(message)?;
    let allowed = allowed_handoffs.get(current_agent_id)?;
    allowed.contains(&candidate).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_contract::message::props;
    use serde_json::json;

    fn allowed(pairs: &[(&str, &[&str])]) -> HashMap<String, HashSet<String>> {
        pairs.iter().map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect())).collect()
    }

    #[test]
    fn structured_signal_wins_over_text_hint() {
        let mut msg = ChatMessage::assistant("HANDOFF_TO: text_target");
        msg.additional_properties = Some(props([("handoff_to", json!("structured_target"))]));
        let map = allowed(&[("triage", &["structured_target", "text_target"])]);
        assert_eq!(detect_handoff(&msg, "triage", &map).as_deref(), Some("structured_target"));
    }

    #[test]
    fn text_hint_is_used_when_nothing_else_present() {
        let msg = ChatMessage::assistant("Let me route this.\nHANDOFF_TO: specialist\n");
        let map = allowed(&[("triage", &["specialist"])]);
        assert_eq!(detect_handoff(&msg, "triage", &map).as_deref(), Some("specialist"));
    }

    #[test]
    fn unknown_target_is_no_handoff() {
        let msg = ChatMessage::assistant("HANDOFF_TO: ghost");
        let map = allowed(&[("triage", &["specialist"])]);
        assert_eq!(detect_handoff(&msg, "triage", &map), None);
    }

    #[test]
    fn no_allowed_set_for_current_agent_is_no_handoff() {
        let msg = ChatMessage::assistant("HANDOFF_TO: specialist");
        let map = allowed(&[]);
        assert_eq!(detect_handoff(&msg, "triage", &map), None);
    }

    #[test]
    fn no_signal_at_all_is_no_handoff() {
        let msg = ChatMessage::assistant("Nothing to see here.");
        let map = allowed(&[("triage", &["specialist"])]);
        assert_eq!(detect_handoff(&msg, "triage", &map), None);
    }
}
