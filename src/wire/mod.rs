use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ========================================
/// Flow request/response records
/// ========================================
///
/// Field names on the wire are camelCase; they are what the model is asked
/// to produce and what the schema descriptors name.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeInput {
    pub feature_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeOutput {
    pub java_code: String,
    pub xml_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProjectInput {
    pub feature_description: String,
}

/// One file of a generated project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSection {
    pub file_name: String,
    pub language: String,
    pub code: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullProjectOutput {
    pub project_name: String,
    pub project_tree: String,
    pub sections: Vec<ProjectSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPromptInput {
    pub user_input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPromptOutput {
    pub app_blueprint: String,
    pub key_features: Vec<String>,
    pub target_user_persona: String,
    pub style_guideline: String,
    pub layout_description: String,
    pub full_app_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCodeInput {
    pub original_code: String,
    pub duplicate_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCodeOutput {
    pub merged_code: String,
    pub explanation: String,
}

/// A tagged span of a character diff. Neither flag set means unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub value: String,
    pub added: bool,
    pub removed: bool,
}

impl DiffSegment {
    pub fn unchanged(value: impl Into<String>) -> Self {
        Self { value: value.into(), added: false, removed: false }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self { value: value.into(), added: true, removed: false }
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self { value: value.into(), added: false, removed: true }
    }

    pub fn is_unchanged(&self) -> bool {
        !self.added && !self.removed
    }
}

/// ========================================
/// Model service transport
/// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub system: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
}

impl Instruction {
    /// System text with developer notes folded in, for APIs that only take
    /// one system slot.
    pub fn system_with_notes(&self) -> String {
        let mut system = self.system.clone();
        if let Some(dev) = &self.developer {
            system.push_str("\n\nDeveloper notes:\n");
            system.push_str(dev);
        }
        system
    }
}

/// What a provider receives: the rendered prompt plus the response schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub flow: String,
    pub prompt_version: String,
    pub instruction: Instruction,
    pub schema: Value,
}
