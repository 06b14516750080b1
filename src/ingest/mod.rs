use fs_err as fs;
use std::io::Read;
use std::path::Path;

use crate::errors::FlowError;

pub const PASTED_SOURCE_NAME: &str = "Pasted Text";

/// Slot argument that reads the text from standard input.
pub const STDIN_ARG: &str = "-";

/// Text loaded into one comparison slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub content: String,
    pub source_name: String,
    pub bytes: usize,
}

impl Source {
    pub fn pasted(text: impl Into<String>) -> Self {
        let content = text.into();
        Self { bytes: content.len(), content, source_name: PASTED_SOURCE_NAME.to_string() }
    }
}

/// Allow-list of file extensions and MIME types, in the syntax of an HTML
/// `accept` attribute (".java,.xml,text/plain", "image/*", "*/*").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList {
    entries: Vec<String>,
    any: bool,
}

impl AcceptList {
    pub fn any() -> Self {
        Self { entries: Vec::new(), any: true }
    }

    pub fn parse(spec: &str) -> Self {
        let mut entries = Vec::new();
        let mut any = false;
        for raw in spec.split(',') {
            let t = raw.trim().to_lowercase();
            if t.is_empty() {
                continue;
            }
            if t == "*/*" || t == "*" {
                any = true;
                continue;
            }
            if !t.contains('/') && !t.starts_with('.') {
                entries.push(format!(".{t}"));
            } else {
                entries.push(t);
            }
        }
        Self { entries, any }
    }

    pub fn accepts(&self, file_name: &str, mime: Option<&str>) -> bool {
        if self.any {
            return true;
        }
        let name = file_name.to_lowercase();
        let mime = mime.map(str::to_lowercase);
        self.entries.iter().any(|acc| {
            if acc.starts_with('.') {
                name.ends_with(acc.as_str())
            } else if let Some(prefix) = acc.strip_suffix('*') {
                mime.as_deref().is_some_and(|m| m.starts_with(prefix))
            } else {
                mime.as_deref() == Some(acc.as_str())
            }
        })
    }
}

/// MIME type for the handful of extensions a code comparison deals with.
pub fn guess_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    Some(match ext.as_str() {
        "java" => "text/x-java-source",
        "kt" | "kts" => "text/x-kotlin",
        "xml" => "text/xml",
        "gradle" => "text/x-gradle",
        "json" => "application/json",
        "txt" | "text" => "text/plain",
        "md" => "text/markdown",
        _ => return None,
    })
}

/// Reads one file as UTF-8 text, honouring the allow-list.
pub fn read_source(path: &Path, accept: &AcceptList) -> Result<Source, FlowError> {
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !accept.accepts(&source_name, guess_mime(&source_name)) {
        return Err(FlowError::Ingestion {
            source_name,
            reason: "file type is not accepted".into(),
        });
    }

    let data = fs::read(path).map_err(|e| FlowError::Ingestion {
        source_name: source_name.clone(),
        reason: e.to_string(),
    })?;
    let bytes = data.len();
    let content = String::from_utf8(data).map_err(|e| FlowError::Ingestion {
        source_name: source_name.clone(),
        reason: format!("not valid UTF-8 text ({e})"),
    })?;

    tracing::debug!(%source_name, bytes, "source loaded");
    Ok(Source { content, source_name, bytes })
}

/// Loads one slot: literal text when `paste` is set, stdin for `-`,
/// otherwise a file path.
pub fn load_slot(
    arg: &str,
    paste: bool,
    accept: &AcceptList,
    stdin: &mut dyn Read,
) -> Result<Source, FlowError> {
    if paste {
        return Ok(Source::pasted(arg));
    }
    if arg == STDIN_ARG {
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).map_err(|e| FlowError::Ingestion {
            source_name: "stdin".into(),
            reason: e.to_string(),
        })?;
        return Ok(Source::pasted(buf));
    }
    read_source(Path::new(arg), accept)
}

/// Loads the original and duplicate slots independently; a failure in one
/// leaves the other's result intact. Standard input can feed only one slot.
pub fn load_pair(
    original: &str,
    duplicate: &str,
    paste: bool,
    accept: &AcceptList,
    mut stdin: impl Read,
) -> Result<(Result<Source, FlowError>, Result<Source, FlowError>), FlowError> {
    if !paste && original == STDIN_ARG && duplicate == STDIN_ARG {
        return Err(FlowError::Validation(
            "Only one source can be read from standard input.".into(),
        ));
    }
    let a = load_slot(original, paste, accept, &mut stdin);
    let b = load_slot(duplicate, paste, accept, &mut stdin);
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, data).unwrap();
        p
    }

    #[test]
    fn accept_list_normalises_bare_extensions() {
        let acc = AcceptList::parse(" JAVA, .xml ,text/plain");
        assert!(acc.accepts("Main.java", None));
        assert!(acc.accepts("LAYOUT.XML", None));
        assert!(acc.accepts("notes", Some("text/plain")));
        assert!(!acc.accepts("build.gradle", Some("text/x-gradle")));
    }

    #[test]
    fn accept_list_wildcards() {
        assert!(AcceptList::parse("*/*").accepts("anything.bin", None));
        let text = AcceptList::parse("text/*");
        assert!(text.accepts("a.xml", guess_mime("a.xml")));
        assert!(!text.accepts("a.json", guess_mime("a.json")));
        assert!(!text.accepts("noext", None));
    }

    #[test]
    fn reads_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "MainActivity.java", "class Main {}\n".as_bytes());
        let s = read_source(&p, &AcceptList::parse(".java")).unwrap();
        assert_eq!(s.source_name, "MainActivity.java");
        assert_eq!(s.content, "class Main {}\n");
        assert_eq!(s.bytes, 14);
    }

    #[test]
    fn invalid_utf8_is_ingestion_failure() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "bad.java", &[0x63, 0xff, 0xfe]);
        match read_source(&p, &AcceptList::any()) {
            Err(FlowError::Ingestion { source_name, reason }) => {
                assert_eq!(source_name, "bad.java");
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("expected ingestion failure, got {other:?}"),
        }
    }

    #[test]
    fn rejected_type_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "logo.png", b"\x89PNG");
        assert!(matches!(
            read_source(&p, &AcceptList::parse(".java,.xml,text/plain")),
            Err(FlowError::Ingestion { .. })
        ));
    }

    #[test]
    fn missing_file_is_ingestion_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("gone.java"), &AcceptList::any()).unwrap_err();
        assert!(matches!(err, FlowError::Ingestion { .. }));
    }

    #[test]
    fn pasted_text_has_fixed_name() {
        let s = Source::pasted("int x;");
        assert_eq!(s.source_name, PASTED_SOURCE_NAME);
        assert_eq!(s.bytes, 6);
    }

    #[test]
    fn one_bad_slot_keeps_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(&dir, "A.java", b"class A {}");
        let missing = dir.path().join("B.java");
        let acc = AcceptList::any();

        let (a, b) = load_pair(
            good.to_str().unwrap(),
            missing.to_str().unwrap(),
            false,
            &acc,
            std::io::empty(),
        )
        .unwrap();
        assert_eq!(a.unwrap().content, "class A {}");
        assert!(matches!(b, Err(FlowError::Ingestion { source_name, .. }) if source_name == "B.java"));

        let (a, b) = load_pair(
            missing.to_str().unwrap(),
            good.to_str().unwrap(),
            false,
            &acc,
            std::io::empty(),
        )
        .unwrap();
        assert!(a.is_err());
        assert_eq!(b.unwrap().source_name, "A.java");
    }

    #[test]
    fn both_slots_failing_report_both() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(&dir, "bad.java", &[0xff]);
        let logo = write(&dir, "logo.png", b"\x89PNG");
        let (a, b) = load_pair(
            bad.to_str().unwrap(),
            logo.to_str().unwrap(),
            false,
            &AcceptList::parse(".java"),
            std::io::empty(),
        )
        .unwrap();
        let names: Vec<String> = [a.unwrap_err(), b.unwrap_err()]
            .iter()
            .map(FlowError::user_message)
            .collect();
        assert!(names[0].contains("bad.java"));
        assert!(names[1].contains("logo.png"));
    }

    #[test]
    fn stdin_feeds_one_slot() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "A.java", b"class A {}");
        let (a, b) = load_pair(
            STDIN_ARG,
            file.to_str().unwrap(),
            false,
            &AcceptList::any(),
            "class B {}".as_bytes(),
        )
        .unwrap();
        let a = a.unwrap();
        assert_eq!(a.content, "class B {}");
        assert_eq!(a.source_name, PASTED_SOURCE_NAME);
        assert_eq!(b.unwrap().content, "class A {}");
    }

    #[test]
    fn stdin_for_both_slots_is_rejected() {
        let err = load_pair(STDIN_ARG, STDIN_ARG, false, &AcceptList::any(), "x".as_bytes())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn paste_mode_takes_arguments_literally() {
        let (a, b) =
            load_pair("-", "int y;", true, &AcceptList::any(), std::io::empty()).unwrap();
        assert_eq!(a.unwrap().content, "-");
        assert_eq!(b.unwrap().content, "int y;");
    }
}
