use crate::wire::Instruction;

/// Bumped whenever template wording changes; recorded with every request so
/// reply quality can be traced back to the wording that produced it.
pub const PROMPT_VERSION: &str = "2025-06-02";

fn json_only_note() -> String {
    "Output exactly one JSON object that conforms to the response schema; no markdown, no code fences, no prose outside the JSON. Every field in the schema is required and MUST NOT be empty.".to_string()
}

fn android_conventions() -> &'static str {
r#"Android Conventions:
- Java for activities and logic unless Kotlin is explicitly asked for.
- XML for layouts and resources (res/layout, res/values).
- Code must be functional, well-documented and easy to copy and paste.
- Prefer a minimal, working example; do not generate overly complex code unless asked."#
}

// ---- generate-code ----

pub fn system_prompt_code() -> String {
    format!(r#"You are an expert software engineer specializing in creating scientific calculators in Java and XML.

You will generate Java and XML code snippets for a given scientific calculator feature.

{conventions}

Response fields:
- "javaCode": the Java code snippet.
- "xmlCode": the XML layout code snippet.
Both fields are required and must not be empty."#,
        conventions = android_conventions()
    )
}

pub fn user_prompt_code(feature_description: &str) -> String {
    format!(r#"Feature Description: {feature_description}

Provide the Java code and XML layout code in a format that is easy to copy and paste. Ensure the generated code is functional and well-documented."#)
}

pub fn render_code(feature_description: &str) -> Instruction {
    Instruction {
        system: system_prompt_code(),
        user: user_prompt_code(feature_description),
        developer: Some(json_only_note()),
    }
}

// ---- generate-full-project ----

fn project_tree_example() -> &'static str {
r#"my-app/
├── src/
│   ├── main/
│   │   ├── java/
│   │   │   └── com/example/app/
│   │   │       └── MainActivity.java
│   │   └── res/
│   │       ├── layout/
│   │       │   └── activity_main.xml
│   │       └── values/
│   │           └── strings.xml
├── build.gradle
└── AndroidManifest.xml"#
}

pub fn system_prompt_project() -> String {
    format!(r#"You are an expert software engineer tasked with generating the complete source code for a project based on a user's description.
The output must be structured as a project with multiple files/sections.

First, you MUST provide a "projectName" for the overall project.
Next, you MUST provide a "projectTree". This is a textual representation of the complete file and folder structure of the generated project.
Use indentation and symbols like '├──' and '└──' to represent the hierarchy clearly. For example:
{tree}

Then, for each file or significant code section in the project (as detailed in your projectTree), you MUST provide an object in the "sections" array.
CRITICAL INSTRUCTION: Every single object within the "sections" array MUST contain all four of the following fields: "fileName", "language", "code" and "explanation".
1. "fileName" (e.g. MainActivity.java, activity_main.xml, styles.xml, AndroidManifest.xml, build.gradle). It MUST be unique for each section and MUST NOT be empty.
2. "language" (e.g. java, xml, gradle, json, kotlin). It MUST be provided and MUST NOT be empty.
3. "code" for that file. It MUST be the complete code and MUST NOT be truncated or empty.
4. "explanation" of what this file does. It MUST be concise but complete and MUST NOT be empty.

Missing fields or incomplete sections (a missing "fileName", truncated "code", an empty "explanation") for ANY item in "sections" render the whole output unusable. Check every section before answering.

If the request is for an Android application (Java/Kotlin), "sections" must include AT MINIMUM:
- Java or Kotlin files for activities and logic (e.g. MainActivity.java).
- XML layout files (e.g. activity_main.xml).
- AndroidManifest.xml.
- The app-level build.gradle (or build.gradle.kts).
- The project-level build.gradle (or build.gradle.kts).
- Resource files such as strings.xml and colors.xml; dimens.xml or themes.xml when useful.

{conventions}

The sections must cover every essential part of a basic, runnable application for the given description."#,
        tree = project_tree_example(),
        conventions = android_conventions()
    )
}

pub fn user_prompt_project(feature_description: &str) -> String {
    format!(r#"For the feature description: "{feature_description}", generate all necessary files.

Structure your entire response with the required "projectName", "projectTree" and "sections" fields, and make sure EVERY object in "sections" has non-empty "fileName", "language", "code" and "explanation"."#)
}

pub fn render_project(feature_description: &str) -> Instruction {
    Instruction {
        system: system_prompt_project(),
        user: user_prompt_project(feature_description),
        developer: Some(json_only_note()),
    }
}

// ---- generate-app-prompt ----

pub fn system_prompt_app() -> String {
    r#"You are an expert app designer and product manager.
Based on the user input, generate a detailed app prompt.
The user input could be a code snippet, a feature idea, a general concept, or a mix of these.
Your goal is to structure it into a coherent plan for an application.

The generated prompt MUST include the following sections:
1. "appBlueprint": a high-level conceptual overview and the core idea of the app.
2. "keyFeatures": a list of 3-5 primary, actionable features.
3. "targetUserPersona": the ideal user for this app. Who are they? Which of their needs does the app address?
4. "styleGuideline": a visual style, with colour palette ideas (primary, secondary, accent), typography, and the overall aesthetic (modern, minimalist, playful, professional...).
5. "layoutDescription": how the main screens and UI elements are organised; navigation, common screen patterns, key interactive components.
6. "fullAppDescription": a cohesive narrative usable as an app store listing or project brief, integrating blueprint, features and target user.

Ensure each field is populated with relevant, detailed and creative information derived from the user's input.
If the user input is very brief, extrapolate reasonably to provide a useful starting point."#
        .to_string()
}

pub fn user_prompt_app(user_input: &str) -> String {
    format!("User Input:\n```\n{user_input}\n```\n\nGenerate the app prompt with all six fields.")
}

pub fn render_app_prompt(user_input: &str) -> Instruction {
    Instruction {
        system: system_prompt_app(),
        user: user_prompt_app(user_input),
        developer: Some(json_only_note()),
    }
}

// ---- merge-code ----

pub fn system_prompt_merge() -> String {
    r#"You are an expert software engineer specializing in code merging and conflict resolution.
You will be given two versions of a code snippet: an "original" version and a "duplicate" (potentially modified) version.
Your task is to merge these two snippets into a single, coherent piece of code.

Analyze the differences between the two versions.
- If the duplicate introduces improvements or necessary changes, incorporate them.
- If the duplicate introduces errors or illogical changes compared to the original, prefer the original logic or fix the duplicate's approach.
- If there are conflicting changes, make the best decision based on common programming practices and the likely intent.
- Preserve comments and formatting as much as possible, keeping the final code readable.

Response fields:
- "mergedCode": the final merged code.
- "explanation": a brief explanation of the key decisions you made, especially regarding conflict resolution or choosing one version's logic over the other."#
        .to_string()
}

pub fn user_prompt_merge(original_code: &str, duplicate_code: &str) -> String {
    format!("Original Code:\n```\n{original_code}\n```\n\nDuplicate Code:\n```\n{duplicate_code}\n```\n\nGenerate the merged code and the explanation.")
}

pub fn render_merge(original_code: &str, duplicate_code: &str) -> Instruction {
    Instruction {
        system: system_prompt_merge(),
        user: user_prompt_merge(original_code, duplicate_code),
        developer: Some(json_only_note()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_substituted_verbatim() {
        let nasty = "sine button {x} \"quoted\" ```fence``` <tag>";
        let ins = render_code(nasty);
        assert!(ins.user.contains(nasty));
        let ins = render_project(nasty);
        assert!(ins.user.contains(nasty));
        let ins = render_app_prompt(nasty);
        assert!(ins.user.contains(nasty));
    }

    #[test]
    fn project_template_spells_out_every_section_field() {
        let sys = system_prompt_project();
        for field in ["\"fileName\"", "\"language\"", "\"code\"", "\"explanation\"", "\"projectName\"", "\"projectTree\""] {
            assert!(sys.contains(field), "template lost {field}");
        }
        assert!(sys.contains("MUST be unique"));
        assert!(sys.contains("MUST NOT be empty"));
        assert!(sys.contains("AndroidManifest.xml"));
    }

    #[test]
    fn app_template_names_all_six_fields() {
        let sys = system_prompt_app();
        for field in [
            "appBlueprint",
            "keyFeatures",
            "targetUserPersona",
            "styleGuideline",
            "layoutDescription",
            "fullAppDescription",
        ] {
            assert!(sys.contains(field), "template lost {field}");
        }
    }

    #[test]
    fn merge_prompt_keeps_both_inputs_in_order() {
        let ins = render_merge("int x=1;", "int x = 1; // init");
        let a = ins.user.find("int x=1;").unwrap();
        let b = ins.user.find("int x = 1; // init").unwrap();
        assert!(a < b);
        assert!(ins.system.contains("Preserve comments and formatting"));
    }

    #[test]
    fn every_template_asks_for_bare_json() {
        for ins in [render_code("a"), render_project("a"), render_app_prompt("a"), render_merge("a", "b")] {
            assert!(ins.developer.as_deref().unwrap_or_default().contains("exactly one JSON object"));
        }
    }
}
