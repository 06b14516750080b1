use anyhow::{anyhow, Result};
use arboard::Clipboard;

/// Write-only clipboard used to export generated text.
pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

pub struct ArboardClipboard {
    clipboard: Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = Clipboard::new().map_err(|e| anyhow!("clipboard unavailable: {e}"))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text.to_string())
            .map_err(|e| anyhow!("could not copy to clipboard: {e}"))
    }
}

/// Copies `text`; on failure the reason is returned for a transient notice
/// instead of aborting the command.
pub fn copy_or_notice(writer: Option<&mut dyn ClipboardWriter>, text: &str) -> Result<(), String> {
    match writer {
        None => Err("clipboard unavailable".to_string()),
        Some(w) => w.write_text(text).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Memory {
        last: Option<String>,
        fail: bool,
    }

    impl ClipboardWriter for Memory {
        fn write_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(anyhow!("no display"));
            }
            self.last = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn copies_through_writer() {
        let mut m = Memory::default();
        copy_or_notice(Some(&mut m), "class A {}").unwrap();
        assert_eq!(m.last.as_deref(), Some("class A {}"));
    }

    #[test]
    fn failure_becomes_message() {
        let mut m = Memory { fail: true, ..Memory::default() };
        assert_eq!(copy_or_notice(Some(&mut m), "x").unwrap_err(), "no display");
        assert!(copy_or_notice(None, "x").is_err());
    }
}
