//! Turning a chat-completion response into validated items.

use necronomicore_domain::ItemDefinition;
use serde_json::Value;

use crate::infrastructure::json;
use crate::mapping::item_from_mapping;

/// Extract items from a chat-completion response body.
///
/// The message content may be a bare array or an object with an `items`
/// array, optionally wrapped in a code fence. Non-object elements are
/// skipped. Every returned item has already been clamped to its rarity.
pub fn parse_item_array(body: &str) -> Vec<ItemDefinition> {
    let Some(content) = json::chat_content(body) else {
        tracing::debug!("Response has no chat content");
        return Vec::new();
    };

    let elements = match json::parse_any(json::strip_code_fence(&content)) {
        Some(Value::Array(elements)) => elements,
        Some(wrapper @ Value::Object(_)) => json::get_array(&wrapper, "items").to_vec(),
        Some(_) => Vec::new(),
        // Prose around the array
        None => json::extract_array(&content).unwrap_or_default(),
    };

    elements
        .iter()
        .filter(|element| element.is_object())
        .map(item_from_value)
        .collect()
}

fn item_from_value(value: &Value) -> ItemDefinition {
    let mut item = item_from_mapping(value);
    validate_and_clamp(&mut item);
    item
}

/// Clamp an item's stats into its rarity bounds, logging any correction.
pub fn validate_and_clamp(item: &mut ItemDefinition) {
    if item.clamp_to_rarity() {
        tracing::debug!(
            item = %item.name,
            rarity = %item.rarity,
            "Clamped generated item stats"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api_client::tests::chat_envelope;
    use necronomicore_domain::{ItemRarity, ItemType};

    #[test]
    fn invalid_content_yields_nothing() {
        let body = chat_envelope("I'm sorry, I cannot help with that.").body;
        assert!(parse_item_array(&body).is_empty());
        assert!(parse_item_array("not even json").is_empty());
        assert!(parse_item_array(r#"{"choices": []}"#).is_empty());
    }

    #[test]
    fn object_without_items_yields_nothing() {
        let body = chat_envelope(r#"{"loot": [{"name": "x"}]}"#).body;
        assert!(parse_item_array(&body).is_empty());
    }

    #[test]
    fn mixed_elements_keep_only_objects() {
        let content = r#"[
            {"name": "Cap of Whispers", "type": "armor", "rarity": "uncommon", "defense": 12},
            42, "junk", null,
            {"name": "Bloom Draught", "type": "consumable", "healing": 20}
        ]"#;
        let items = parse_item_array(&chat_envelope(content).body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Cap of Whispers");
        assert_eq!(items[0].item_type, ItemType::Armor);
        assert_eq!(items[0].rarity, ItemRarity::Uncommon);
        assert_eq!(items[1].healing, 20);
    }

    #[test]
    fn items_wrapper_and_fence_are_accepted() {
        let wrapped = chat_envelope(r#"{"items": [{"name": "A"}, {"name": "B"}]}"#).body;
        assert_eq!(parse_item_array(&wrapped).len(), 2);

        let fenced = chat_envelope("```json\n[{\"name\": \"C\"}]\n```").body;
        assert_eq!(parse_item_array(&fenced)[0].name, "C");
    }

    #[test]
    fn parsed_items_are_clamped() {
        let content = r#"[{"name": "Godslayer", "rarity": "common", "damage": 9999,
                          "defense": -5, "healing": 400, "cooldown": 500.0}]"#;
        let item = &parse_item_array(&chat_envelope(content).body)[0];
        assert_eq!(item.damage, 15);
        assert_eq!(item.defense, 0);
        assert_eq!(item.healing, 30);
        assert_eq!(item.cooldown, 60.0);
        assert!(item.is_within_bounds());
    }
}
