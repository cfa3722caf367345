//! Dialogue-act parsing
//!
//! Dialogue acts look like `inform ( name = hakka ; pricerange = dont_care )`.
//! Several acts in one intent string are joined with `@`. Slot/value pairs
//! sit inside the parentheses and are separated by `;`. A slot may appear
//! without a value (`request ( area )`).

/// Separator between dialogue acts
pub const ACT_SEPARATOR: char = '@';

/// Separator between slot/value pairs
pub const SLOT_SEPARATOR: char = ';';

/// Values that describe a slot without naming a concrete entity
pub const SPECIAL_VALUES: [&str; 6] = ["dont_care", "dontcare", "none", "?", "yes", "no"];

/// One slot, with an optional value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotValue {
    /// Slot name with whitespace and underscores removed
    pub slot: String,
    /// Value as written, trimmed and unquoted
    pub value: Option<String>,
}

impl SlotValue {
    /// Whether the value names a concrete entity that should surface in text
    pub fn is_realisable(&self) -> bool {
        self.value
            .as_deref()
            .is_some_and(|v| !v.is_empty() && !SPECIAL_VALUES.contains(&v))
    }
}

/// One dialogue act
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogAct {
    /// Act type (`inform`, `request`, ...)
    pub act_type: String,
    /// Slots in written order
    pub slots: Vec<SlotValue>,
}

/// Parse an intent string into its dialogue acts
///
/// Parsing is lenient: an act without parentheses has no slots, and a
/// missing closing parenthesis is tolerated. Empty acts are dropped.
pub fn parse(text: &str) -> Vec<DialogAct> {
    text.split(ACT_SEPARATOR)
        .filter_map(parse_act)
        .collect()
}

/// Number of acts and total number of slots in an intent string
pub fn count_acts_and_slots(text: &str) -> (usize, usize) {
    let acts = parse(text);
    let slots = acts.iter().map(|a| a.slots.len()).sum();
    (acts.len(), slots)
}

fn parse_act(raw: &str) -> Option<DialogAct> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (head, body) = match raw.split_once('(') {
        Some((head, rest)) => (head, rest.replace(')', "")),
        None => (raw, String::new()),
    };

    let slots = body
        .split(SLOT_SEPARATOR)
        .filter_map(parse_slot)
        .collect();

    Some(DialogAct {
        act_type: unquote(head).to_string(),
        slots,
    })
}

fn parse_slot(raw: &str) -> Option<SlotValue> {
    let (slot, value) = match raw.split_once('=') {
        Some((s, v)) => (s, Some(unquote(v).to_string())),
        None => (raw, None),
    };
    let slot: String = unquote(slot)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if slot.is_empty() {
        return None;
    }
    Some(SlotValue {
        slot,
        value: value.filter(|v| !v.is_empty()),
    })
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}
