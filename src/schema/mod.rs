//! Per-flow contracts: which fields a request must carry and which fields a
//! model reply must fill before anyone downstream gets to see it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::errors::FlowError;
use crate::wire::{
    AppPromptInput, AppPromptOutput, FullProjectInput, FullProjectOutput, GenerateCodeInput,
    GenerateCodeOutput, MergeCodeInput, MergeCodeOutput, ProjectSection,
};

/// A structured model reply. Every field is mandatory and non-empty.
pub trait Contract: DeserializeOwned + Serialize + Send + Sized {
    const FLOW: &'static str;

    /// JSON Schema descriptor sent along with the prompt.
    fn json_schema() -> Value;

    /// Paths of the fields that are empty, e.g. `sections[2].explanation`.
    fn violations(&self) -> Vec<String>;

    fn validate(&self) -> Result<(), FlowError> {
        let v = self.violations();
        if v.is_empty() {
            Ok(())
        } else {
            Err(FlowError::AiGenerationFailed(format!(
                "{} reply is missing required fields: {}",
                Self::FLOW,
                v.join(", ")
            )))
        }
    }
}

/// A user request, checked before any network call.
pub trait FlowInput {
    /// Inline message shown when the request is incomplete.
    fn missing_message(&self) -> &'static str;

    fn violations(&self) -> Vec<String>;

    fn validate(&self) -> Result<(), FlowError> {
        if self.violations().is_empty() {
            Ok(())
        } else {
            Err(FlowError::Validation(self.missing_message().to_string()))
        }
    }
}

fn require_text(path: &str, value: &str, out: &mut Vec<String>) {
    if value.trim().is_empty() {
        out.push(path.to_string());
    }
}

fn text(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

fn object(props: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false
    })
}

// ---- requests ----

impl FlowInput for GenerateCodeInput {
    fn missing_message(&self) -> &'static str {
        "Please enter a feature or project description."
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("featureDescription", &self.feature_description, &mut out);
        out
    }
}

impl FlowInput for FullProjectInput {
    fn missing_message(&self) -> &'static str {
        "Please enter a feature or project description."
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("featureDescription", &self.feature_description, &mut out);
        out
    }
}

impl FlowInput for AppPromptInput {
    fn missing_message(&self) -> &'static str {
        "Please enter some text or code to generate a prompt."
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("userInput", &self.user_input, &mut out);
        out
    }
}

impl FlowInput for MergeCodeInput {
    fn missing_message(&self) -> &'static str {
        "Please provide content for both original and duplicate sources first."
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("originalCode", &self.original_code, &mut out);
        require_text("duplicateCode", &self.duplicate_code, &mut out);
        out
    }
}

// ---- replies ----

impl Contract for GenerateCodeOutput {
    const FLOW: &'static str = "generate-code";

    fn json_schema() -> Value {
        object(
            json!({
                "javaCode": text("The generated Java code snippet."),
                "xmlCode": text("The generated XML layout code snippet."),
            }),
            &["javaCode", "xmlCode"],
        )
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("javaCode", &self.java_code, &mut out);
        require_text("xmlCode", &self.xml_code, &mut out);
        out
    }
}

pub fn project_section_schema() -> Value {
    object(
        json!({
            "fileName": text("File name for this code block, unique within the project (e.g. MainActivity.java, activity_main.xml, AndroidManifest.xml, build.gradle)."),
            "language": text("Language or file type of the code (java, kotlin, xml, gradle, json)."),
            "code": text("The complete, untruncated code of this file."),
            "explanation": text("A concise explanation of what this file does."),
        }),
        &["fileName", "language", "code", "explanation"],
    )
}

impl Contract for FullProjectOutput {
    const FLOW: &'static str = "generate-full-project";

    fn json_schema() -> Value {
        object(
            json!({
                "projectName": text("A suitable name for the project."),
                "projectTree": text("Textual file and folder tree of the project using ├── and └── markers."),
                "sections": {
                    "type": "array",
                    "minItems": 1,
                    "items": project_section_schema(),
                    "description": "One entry per file of the project."
                },
            }),
            &["projectName", "projectTree", "sections"],
        )
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("projectName", &self.project_name, &mut out);
        require_text("projectTree", &self.project_tree, &mut out);
        if self.sections.is_empty() {
            out.push("sections".to_string());
        }
        for (i, s) in self.sections.iter().enumerate() {
            section_violations(i, s, &mut out);
        }
        out
    }
}

fn section_violations(i: usize, s: &ProjectSection, out: &mut Vec<String>) {
    require_text(&format!("sections[{i}].fileName"), &s.file_name, out);
    require_text(&format!("sections[{i}].language"), &s.language, out);
    require_text(&format!("sections[{i}].code"), &s.code, out);
    require_text(&format!("sections[{i}].explanation"), &s.explanation, out);
}

impl FullProjectOutput {
    /// File names that occur more than once, in order of their second
    /// appearance.
    pub fn duplicate_file_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for s in &self.sections {
            if !seen.insert(s.file_name.as_str()) {
                dups.push(s.file_name.clone());
            }
        }
        dups
    }
}

impl Contract for AppPromptOutput {
    const FLOW: &'static str = "generate-app-prompt";

    fn json_schema() -> Value {
        object(
            json!({
                "appBlueprint": text("High-level blueprint and core idea of the app."),
                "keyFeatures": {
                    "type": "array",
                    "minItems": 1,
                    "items": { "type": "string", "minLength": 1 },
                    "description": "3-5 primary, actionable features."
                },
                "targetUserPersona": text("The ideal user and the needs the app addresses."),
                "styleGuideline": text("Colour palette, typography and overall aesthetic."),
                "layoutDescription": text("Screen organisation, navigation and key UI elements."),
                "fullAppDescription": text("Cohesive narrative suitable for an app store listing or project brief."),
            }),
            &[
                "appBlueprint",
                "keyFeatures",
                "targetUserPersona",
                "styleGuideline",
                "layoutDescription",
                "fullAppDescription",
            ],
        )
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("appBlueprint", &self.app_blueprint, &mut out);
        if self.key_features.is_empty() {
            out.push("keyFeatures".to_string());
        }
        for (i, f) in self.key_features.iter().enumerate() {
            require_text(&format!("keyFeatures[{i}]"), f, &mut out);
        }
        require_text("targetUserPersona", &self.target_user_persona, &mut out);
        require_text("styleGuideline", &self.style_guideline, &mut out);
        require_text("layoutDescription", &self.layout_description, &mut out);
        require_text("fullAppDescription", &self.full_app_description, &mut out);
        out
    }
}

impl Contract for MergeCodeOutput {
    const FLOW: &'static str = "merge-code";

    fn json_schema() -> Value {
        object(
            json!({
                "mergedCode": text("The merged code."),
                "explanation": text("Key merge decisions and how conflicts were resolved."),
            }),
            &["mergedCode", "explanation"],
        )
    }

    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require_text("mergedCode", &self.merged_code, &mut out);
        require_text("explanation", &self.explanation, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str) -> ProjectSection {
        ProjectSection {
            file_name: name.into(),
            language: "java".into(),
            code: "class A {}".into(),
            explanation: "entry point".into(),
        }
    }

    fn project(sections: Vec<ProjectSection>) -> FullProjectOutput {
        FullProjectOutput {
            project_name: "Calc".into(),
            project_tree: "calc/\n└── MainActivity.java".into(),
            sections,
        }
    }

    #[test]
    fn empty_section_explanation_is_rejected() {
        let mut s = section("MainActivity.java");
        s.explanation = String::new();
        let p = project(vec![section("build.gradle"), s]);
        assert_eq!(p.violations(), vec!["sections[1].explanation".to_string()]);
        match p.validate() {
            Err(FlowError::AiGenerationFailed(msg)) => assert!(msg.contains("sections[1].explanation")),
            other => panic!("expected AiGenerationFailed, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_field_counts_as_empty() {
        let out = GenerateCodeOutput { java_code: "class A {}".into(), xml_code: " \n\t".into() };
        assert_eq!(out.violations(), vec!["xmlCode".to_string()]);
    }

    #[test]
    fn project_without_sections_is_rejected() {
        assert!(project(vec![]).validate().is_err());
    }

    #[test]
    fn duplicate_file_names_are_reported_not_rejected() {
        let p = project(vec![section("strings.xml"), section("Main.java"), section("strings.xml")]);
        assert!(p.validate().is_ok());
        assert_eq!(p.duplicate_file_names(), vec!["strings.xml".to_string()]);
    }

    #[test]
    fn app_prompt_needs_non_empty_features() {
        let out = AppPromptOutput {
            app_blueprint: "b".into(),
            key_features: vec!["offline mode".into(), "".into()],
            target_user_persona: "p".into(),
            style_guideline: "s".into(),
            layout_description: "l".into(),
            full_app_description: "f".into(),
        };
        assert_eq!(out.violations(), vec!["keyFeatures[1]".to_string()]);
    }

    #[test]
    fn merge_input_needs_both_sides() {
        let input = MergeCodeInput { original_code: "int x;".into(), duplicate_code: "   ".into() };
        let err = input.validate().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(input.violations(), vec!["duplicateCode".to_string()]);
    }

    #[test]
    fn schemas_list_every_field_as_required() {
        let s = FullProjectOutput::json_schema();
        let req: Vec<&str> = s["required"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(req, vec!["projectName", "projectTree", "sections"]);
        let item_req = s["properties"]["sections"]["items"]["required"].as_array().unwrap();
        assert_eq!(item_req.len(), 4);

        let s = AppPromptOutput::json_schema();
        assert_eq!(s["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn missing_key_does_not_deserialize() {
        let raw = r#"{"javaCode":"class A {}"}"#;
        assert!(serde_json::from_str::<GenerateCodeOutput>(raw).is_err());
    }
}
