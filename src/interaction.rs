// src/interaction.rs
//! Seams to the person at the keyboard: confirmations and external links.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::process::Command;
use tracing::{info, warn};

use crate::notice::Notices;
use crate::types::JobCandidate;

pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Resolve and open a job's application link. Returns the URL navigated
/// to, or `None` (with a notice) when there is nowhere to go.
pub fn open_application_link(
    job: &JobCandidate,
    opener: &dyn LinkOpener,
    notices: &Notices,
) -> Option<String> {
    let Some(url) = job.application_link() else {
        notices.error("No application link available for this job");
        return None;
    };

    match opener.open(url) {
        Ok(()) => {
            info!(job_id = %job.id, %url, "Opened application link");
            Some(url.to_string())
        }
        Err(e) => {
            notices.error(format!("Failed to open {}: {}", url, e));
            None
        }
    }
}

/// Asks on stdin; anything but y/yes declines.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Confirms everything; backs `--yes`.
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Hands the URL to the platform opener (`xdg-open`, `open`, `start`).
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };

        let status = command
            .arg(url)
            .status()
            .context("Failed to launch browser")?;

        if !status.success() {
            warn!(%url, %status, "Browser launcher exited with failure");
            anyhow::bail!("Browser launcher exited with {}", status);
        }
        Ok(())
    }
}

/// Prints the link instead of opening it; backs `--no-open`.
pub struct PrintLink;

impl LinkOpener for PrintLink {
    fn open(&self, url: &str) -> Result<()> {
        println!("🔗 {}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::test_support::RecordingOpener;

    #[test]
    fn test_no_link_reports_and_does_not_navigate() {
        let opener = RecordingOpener::default();
        let notices = Notices::new();
        let job = JobCandidate::new(1, "Engineer", "Acme");

        assert_eq!(open_application_link(&job, &opener, &notices), None);
        assert!(opener.opened().is_empty());

        let drained = notices.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].level, NoticeLevel::Error);
        assert_eq!(drained[0].message, "No application link available for this job");
    }

    #[test]
    fn test_opens_resolved_link() {
        let opener = RecordingOpener::default();
        let notices = Notices::new();
        let mut job = JobCandidate::new(1, "Engineer", "Acme");
        job.job_url = Some("https://jobs.example/1".to_string());
        job.apply_url = Some("https://apply.example/1".to_string());

        assert_eq!(
            open_application_link(&job, &opener, &notices).as_deref(),
            Some("https://apply.example/1")
        );
        assert_eq!(opener.opened(), vec!["https://apply.example/1".to_string()]);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_open_failure_is_reported() {
        let notices = Notices::new();
        let mut job = JobCandidate::new(2, "Engineer", "Acme");
        job.job_url = Some("https://jobs.example/2".to_string());

        assert_eq!(
            open_application_link(&job, &RecordingOpener::failing(), &notices),
            None
        );
        let drained = notices.drain();
        assert_eq!(drained[0].level, NoticeLevel::Error);
        assert!(drained[0].message.contains("no browser available"));
    }

    #[test]
    fn test_assume_yes() {
        assert!(AssumeYes.confirm("Remove?"));
    }
}
