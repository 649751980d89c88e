//! README generation: prompt assembly, one chat call, verbatim write.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ChatClient, ChatMessage, ReportError};

pub const README_FILE: &str = "README.md";

const SYSTEM_PROMPT: &str =
    "You are a data analyst writing a concise README.md for an automated data analysis project.";

/// Sections the model is asked to produce, in order.
pub const SECTIONS: [&str; 4] = [
    "Dataset Overview",
    "Analysis Performed",
    "Key Insights",
    "Implications / Recommendations",
];

pub struct ReportGenerator<C: ChatClient> {
    client: C,
}

impl<C: ChatClient> ReportGenerator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// System and user messages embedding the summary.
    pub fn build_messages(summary: &str) -> Vec<ChatMessage> {
        let sections = SECTIONS
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");

        let user = format!(
            "Using the following dataset summary, write a README.md with these sections:\n\n\
             {sections}\n\n\
             Use clear markdown headings. Reference generated charts where relevant.\n\n\
             DATASET SUMMARY:\n{summary}\n"
        );

        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
    }

    /// Ask the model for the README and write it, unmodified, into `out_dir`.
    pub fn generate(&self, summary: &str, out_dir: &Path) -> Result<PathBuf, ReportError> {
        let messages = Self::build_messages(summary);
        let content = self.client.complete(&messages)?;

        let path = out_dir.join(README_FILE);
        fs::write(&path, content.as_bytes()).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

        info!("wrote {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records every conversation and answers with a fixed reply.
    struct FakeChat {
        reply: Result<String, String>,
        seen: RefCell<Vec<Vec<ChatMessage>>>,
    }

    impl FakeChat {
        fn answering(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatClient for &FakeChat {
        fn complete(&self, messages: &[ChatMessage]) -> Result<String, ReportError> {
            self.seen.borrow_mut().push(messages.to_vec());
            self.reply.clone().map_err(ReportError::Network)
        }
    }

    #[test]
    fn prompt_names_every_section_and_embeds_summary() {
        let messages = ReportGenerator::<&FakeChat>::build_messages("Dataset Shape: (3, 2)");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("data analyst"));
        assert_eq!(messages[1].role, "user");
        for section in SECTIONS {
            assert!(messages[1].content.contains(section));
        }
        assert!(messages[1]
            .content
            .contains("DATASET SUMMARY:\nDataset Shape: (3, 2)"));
    }

    #[test]
    fn writes_reply_verbatim_and_overwrites() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(README_FILE), "stale").unwrap();

        let reply = "# Dataset Overview\n\n  untouched  \n";
        let chat = FakeChat::answering(reply);
        let path = ReportGenerator::new(&chat).generate("summary", dir.path()).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), reply);
        assert_eq!(chat.seen.borrow().len(), 1);
    }

    #[test]
    fn failed_call_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let chat = FakeChat::failing("timeout");
        let err = ReportGenerator::new(&chat).generate("summary", dir.path()).unwrap_err();

        assert!(matches!(err, ReportError::Network(_)));
        assert!(!dir.path().join(README_FILE).exists());
    }
}
