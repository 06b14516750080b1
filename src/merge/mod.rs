use crate::wire::{MergeCodeInput, MergeCodeOutput};

pub const IDENTICAL_EXPLANATION: &str = "Both code snippets were identical. No merge needed.";

/// Short-circuits a merge whose two sides are byte-identical. Any other
/// difference, whitespace included, needs the model.
pub fn precheck(input: &MergeCodeInput) -> Option<MergeCodeOutput> {
    if input.original_code == input.duplicate_code {
        Some(MergeCodeOutput {
            merged_code: input.original_code.clone(),
            explanation: IDENTICAL_EXPLANATION.to_string(),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(a: &str, b: &str) -> MergeCodeInput {
        MergeCodeInput { original_code: a.into(), duplicate_code: b.into() }
    }

    #[test]
    fn identical_inputs_short_circuit() {
        let out = precheck(&input("int x = 1;\n", "int x = 1;\n")).unwrap();
        assert_eq!(out.merged_code, "int x = 1;\n");
        assert_eq!(out.explanation, IDENTICAL_EXPLANATION);
    }

    #[test]
    fn whitespace_difference_needs_the_model() {
        assert!(precheck(&input("int x = 1;", "int x = 1; ")).is_none());
        assert!(precheck(&input("a\nb", "a\r\nb")).is_none());
    }

    #[test]
    fn comparison_is_exact_not_normalised() {
        // "é" precomposed vs. "e" + combining acute
        assert!(precheck(&input("caf\u{e9}", "cafe\u{301}")).is_none());
    }
}
