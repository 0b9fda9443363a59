//! Registry change sets
//!
//! A change set is inert to the governance core; only the cut executor
//! interprets it. The helpers here describe and fingerprint it.

use crate::identity::{Address, Selector};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a single cut does to its selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetCutAction {
    Add,
    Replace,
    Remove,
}

impl FacetCutAction {
    fn tag(self) -> u8 {
        match self {
            FacetCutAction::Add => 0,
            FacetCutAction::Replace => 1,
            FacetCutAction::Remove => 2,
        }
    }
}

/// One facet's worth of selector bindings to add, replace or remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCut {
    pub facet_address: Address,
    pub action: FacetCutAction,
    pub function_selectors: Vec<Selector>,
}

/// Initialization call performed after the cuts are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitCall {
    pub target: Address,
    #[serde(with = "calldata_hex", default)]
    pub calldata: Vec<u8>,
}

/// A complete registry modification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub cuts: Vec<FacetCut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<InitCall>,
}

/// Compact description carried by the `NewProposal` notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetSummary {
    pub digest: String,
    pub cut_count: usize,
    pub selector_count: usize,
    pub has_init: bool,
}

impl ChangeSet {
    pub fn new(cuts: Vec<FacetCut>) -> Self {
        Self { cuts, init: None }
    }

    pub fn with_init(mut self, init: InitCall) -> Self {
        self.init = Some(init);
        self
    }

    /// Total number of selectors touched across all cuts
    pub fn selector_count(&self) -> usize {
        self.cuts.iter().map(|c| c.function_selectors.len()).sum()
    }

    /// SHA-256 over a canonical byte encoding of the change set
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.cuts.len() as u64).to_be_bytes());
        for cut in &self.cuts {
            hasher.update(cut.facet_address.as_bytes());
            hasher.update([cut.action.tag()]);
            hasher.update((cut.function_selectors.len() as u64).to_be_bytes());
            for selector in &cut.function_selectors {
                hasher.update(selector.as_bytes());
            }
        }
        match &self.init {
            Some(init) => {
                hasher.update([1u8]);
                hasher.update(init.target.as_bytes());
                hasher.update((init.calldata.len() as u64).to_be_bytes());
                hasher.update(&init.calldata);
            }
            None => hasher.update([0u8]),
        }
        hex::encode(hasher.finalize())
    }

    pub fn summary(&self) -> ChangeSetSummary {
        ChangeSetSummary {
            digest: self.digest(),
            cut_count: self.cuts.len(),
            selector_count: self.selector_count(),
            has_init: self.init.is_some(),
        }
    }

    /// Human-readable one-liner for logs
    pub fn description(&self) -> String {
        let parts: Vec<String> = self.cuts.iter().map(FacetCut::description).collect();
        let mut text = if parts.is_empty() {
            "empty cut".to_string()
        } else {
            parts.join("; ")
        };
        if let Some(init) = &self.init {
            text.push_str(&format!("; init {} ({} bytes)", init.target, init.calldata.len()));
        }
        text
    }
}

impl FacetCut {
    pub fn description(&self) -> String {
        let verb = match self.action {
            FacetCutAction::Add => "Add",
            FacetCutAction::Replace => "Replace",
            FacetCutAction::Remove => "Remove",
        };
        format!(
            "{} {} selector(s) on {}",
            verb,
            self.function_selectors.len(),
            self.facet_address
        )
    }
}

/// Calldata as hex text. Decoding accepts an optional `0x` prefix, the
/// same as addresses and selectors.
mod calldata_hex {
    use crate::identity::decode_prefixed;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(calldata: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(calldata))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_prefixed(text.trim()).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangeSet {
        ChangeSet::new(vec![FacetCut {
            facet_address: Address::repeat_byte(0x11),
            action: FacetCutAction::Add,
            function_selectors: vec![Selector::new([1, 2, 3, 4]), Selector::new([5, 6, 7, 8])],
        }])
    }

    #[test]
    fn test_digest_is_stable_for_identical_content() {
        assert_eq!(sample().digest(), sample().digest());
        assert_eq!(sample().digest().len(), 64);
    }

    #[test]
    fn test_digest_changes_with_action() {
        let mut other = sample();
        other.cuts[0].action = FacetCutAction::Replace;
        assert_ne!(sample().digest(), other.digest());
    }

    #[test]
    fn test_digest_changes_with_init() {
        let with_init = sample().with_init(InitCall {
            target: Address::repeat_byte(0x22),
            calldata: vec![0xaa],
        });
        assert_ne!(sample().digest(), with_init.digest());
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summary();
        assert_eq!(summary.cut_count, 1);
        assert_eq!(summary.selector_count, 2);
        assert!(!summary.has_init);
    }

    #[test]
    fn test_change_set_json_shape() {
        let json = serde_json::json!({
            "cuts": [{
                "facetAddress": format!("0x{}", "11".repeat(20)),
                "action": "add",
                "functionSelectors": ["0x01020304", "0x05060708"]
            }]
        });
        let parsed: ChangeSet = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_description_mentions_every_cut() {
        let text = sample().description();
        assert!(text.starts_with("Add 2 selector(s)"));
    }

    #[test]
    fn test_calldata_accepts_optional_prefix() {
        let target = format!("0x{}", "22".repeat(20));
        let prefixed: InitCall =
            serde_json::from_value(serde_json::json!({ "target": target, "calldata": "0xDEADbeef" })).unwrap();
        let bare: InitCall =
            serde_json::from_value(serde_json::json!({ "target": target, "calldata": "deadbeef" })).unwrap();
        assert_eq!(prefixed.calldata, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(prefixed, bare);
        assert_eq!(serde_json::to_value(&bare).unwrap()["calldata"], "deadbeef");
    }

    #[test]
    fn test_calldata_rejects_non_hex() {
        let json = serde_json::json!({ "target": format!("0x{}", "22".repeat(20)), "calldata": "0xzz" });
        assert!(serde_json::from_value::<InitCall>(json).is_err());
    }
}
