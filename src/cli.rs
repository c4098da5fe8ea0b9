// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::Identity;
use crate::core::{ConfigManager, HttpJobStore, HttpMatchingEngine, JobStore, MatchingEngine};
use crate::document::ResumeDocument;
use crate::interaction::{AssumeYes, Confirmer, LinkOpener, PrintLink, SystemBrowser, TerminalConfirmer};
use crate::job_details::JobDetailFetcher;
use crate::notice::Notices;
use crate::saved_jobs::{DeleteOutcome, SaveOutcome, SavedJobCollection};
use crate::session::{LoadMoreOutcome, MatchOutcome, MatchingSession};
use crate::types::{JobCandidate, JobDetails, JobId};
use crate::utils;

#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(about = "Match a resume against open positions and manage saved jobs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Bearer token for the job store
    #[arg(long, env = "JOBMATCH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a PDF resume and list matching jobs
    Match {
        resume: PathBuf,
        /// Extra result pages to load after the first
        #[arg(long, default_value_t = 0)]
        more: u32,
        /// Save matched jobs to your profile
        #[arg(long = "save", value_name = "ID", num_args = 1..)]
        save: Vec<String>,
        /// Open the application link of a matched job
        #[arg(long, value_name = "ID")]
        apply: Option<String>,
        /// Print links instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Show the extended description of a job
    Details { id: String },
    /// Browse public postings
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Manage jobs saved to your profile
    Saved {
        #[command(subcommand)]
        command: SavedCommand,
    },
}

#[derive(Subcommand)]
pub enum JobsCommand {
    /// List all postings
    List,
    /// Show one posting
    Show { id: String },
}

#[derive(Subcommand)]
pub enum SavedCommand {
    /// List saved jobs
    List,
    /// Remove a saved job
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Mark a saved job as applied and open its application link
    Apply {
        id: String,
        #[arg(long)]
        no_open: bool,
    },
}

struct App {
    config: ConfigManager,
    notices: Notices,
    engine: Arc<dyn MatchingEngine>,
    store: Arc<dyn JobStore>,
    identity: Option<Identity>,
}

impl App {
    fn new(config: ConfigManager, token: Option<String>) -> Result<Self> {
        let engine = HttpMatchingEngine::new(&config.engine)
            .context("Failed to create matching engine client")?;
        let store = HttpJobStore::new(&config.store).context("Failed to create job store client")?;
        let identity = token.and_then(Identity::from_token);
        if let Some(identity) = &identity {
            info!(user = %identity.display_name(), "Using supplied credential");
        }

        Ok(Self {
            config,
            notices: Notices::new(),
            engine: Arc::new(engine),
            store: Arc::new(store),
            identity,
        })
    }

    fn saved_jobs(&self) -> SavedJobCollection {
        SavedJobCollection::new(
            self.store.clone(),
            self.notices.clone(),
            self.config.session.operation_timeout(),
        )
    }

    fn details(&self) -> JobDetailFetcher {
        JobDetailFetcher::new(
            self.engine.clone(),
            self.store.clone(),
            self.notices.clone(),
            self.config.session.operation_timeout(),
        )
    }

    fn flush_notices(&self) {
        for notice in self.notices.drain() {
            println!("{}", notice);
        }
    }
}

fn opener(no_open: bool) -> Box<dyn LinkOpener> {
    if no_open {
        Box::new(PrintLink)
    } else {
        Box::new(SystemBrowser)
    }
}

pub async fn handle_command(cli: Cli, config: ConfigManager) -> Result<()> {
    let app = App::new(config, cli.token)?;
    let result = run(&app, cli.command).await;
    app.flush_notices();
    result
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Match {
            resume,
            more,
            save,
            apply,
            no_open,
        } => {
            let document = ResumeDocument::from_path(&resume).await?;
            let session = MatchingSession::new(
                app.engine.clone(),
                app.config.session.clone(),
                app.notices.clone(),
            );

            let summary = match session.submit_document(document).await? {
                MatchOutcome::Matched(summary) => summary,
                MatchOutcome::Discarded => return Ok(()),
            };
            println!(
                "📄 Analyzed {} jobs, {} matched (keywords: {})",
                summary.total_analyzed,
                summary.matched,
                session.keywords()
            );

            for _ in 0..more {
                if !session.has_more() {
                    break;
                }
                match session.load_more().await {
                    Ok(LoadMoreOutcome::Appended { added, .. }) => {
                        println!("➕ Loaded {} more jobs", added)
                    }
                    Ok(_) => break,
                    Err(e) => {
                        error!("Stopped loading more jobs: {}", e);
                        break;
                    }
                }
            }

            print_candidates(&session.candidates());
            if session.has_more() {
                println!("More jobs are available; rerun with --more to load them.");
            }

            if !save.is_empty() {
                let collection = app.saved_jobs();
                for raw in save {
                    let id = JobId::parse(&raw);
                    let Some(job) = session.candidate(&id) else {
                        println!("❌ Job {} is not in the current results", id);
                        continue;
                    };
                    match collection.save(&session, &job, app.identity.as_ref()).await {
                        Ok(SaveOutcome::Saved) => info!(job_id = %id, "Saved from results"),
                        Ok(_) => {}
                        Err(e) => error!(job_id = %id, "Save failed: {}", e),
                    }
                }
            }

            if let Some(raw) = apply {
                session.open_application(&JobId::parse(&raw), opener(no_open).as_ref());
            }
            session.dispose();
        }

        Command::Details { id } => {
            let details = app.details().fetch_details(&JobId::parse(&id)).await?;
            print_details(&details);
        }

        Command::Jobs { command } => match command {
            JobsCommand::List => {
                let postings = app.details().list_postings().await?;
                if postings.is_empty() {
                    println!("No job postings found.");
                } else {
                    print_candidates(&postings);
                }
            }
            JobsCommand::Show { id } => {
                let posting = app.details().fetch_posting(&JobId::parse(&id)).await?;
                print_posting(&posting);
            }
        },

        Command::Saved { command } => {
            let collection = app.saved_jobs();
            let identity = app.identity.as_ref();

            match command {
                SavedCommand::List => {
                    collection.fetch(identity).await?;
                    if collection.is_empty() {
                        println!("No saved jobs yet.");
                    } else {
                        print_saved(&collection.items());
                    }
                }
                SavedCommand::Delete { id, yes } => {
                    let id = JobId::parse(&id);
                    let confirmer: Box<dyn Confirmer> = if yes {
                        Box::new(AssumeYes)
                    } else {
                        Box::new(TerminalConfirmer)
                    };
                    if collection.delete(&id, identity, confirmer.as_ref()).await?
                        == DeleteOutcome::Cancelled
                    {
                        println!("Kept job {}", id);
                    }
                }
                SavedCommand::Apply { id, no_open } => {
                    collection.fetch(identity).await?;
                    let id = JobId::parse(&id);
                    let Some(job) = collection.item(&id) else {
                        anyhow::bail!("Job {} is not in your saved list", id);
                    };
                    let outcome = collection.mark_applied(&job, identity, opener(no_open).as_ref())?;
                    // The process exits right after; let the bookkeeping call finish first.
                    if let Some(handle) = outcome.bookkeeping {
                        if let Err(e) = handle.await {
                            error!("Apply bookkeeping task failed: {}", e);
                        }
                    }
                    println!("📝 Marked job {} as applied", id);
                }
            }
            collection.dispose();
        }
    }

    Ok(())
}

fn score_cell(job: &JobCandidate) -> String {
    match job.score {
        Some(score) => {
            let band = score.band();
            format!(
                "\x1b[{}m{} {}\x1b[0m",
                band.color().ansi_code(),
                score,
                band.label()
            )
        }
        None => "-".to_string(),
    }
}

fn print_candidates(jobs: &[JobCandidate]) {
    println!(
        "{:<8} {:<40} {:<25} {:<20} {}",
        "ID", "Title", "Company", "Location", "Match"
    );
    println!("{}", "-".repeat(110));
    for job in jobs {
        let saved = if job.saved { " ★" } else { "" };
        println!(
            "{:<8} {:<40} {:<25} {:<20} {}{}",
            job.id.to_string(),
            utils::preview(&job.title, 38),
            utils::preview(&job.company, 23),
            utils::preview(&job.location, 18),
            score_cell(job),
            saved
        );
    }
}

fn print_saved(jobs: &[JobCandidate]) {
    println!(
        "{:<8} {:<40} {:<25} {:<18} {}",
        "ID", "Title", "Company", "Saved", "Status"
    );
    println!("{}", "-".repeat(105));
    for job in jobs {
        let saved = job
            .saved_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let status = match job.applied_date {
            Some(date) => format!("Applied {}", date.format("%Y-%m-%d")),
            None if job.applied => "Applied".to_string(),
            None => "Not applied".to_string(),
        };
        println!(
            "{:<8} {:<40} {:<25} {:<18} {}",
            job.id.to_string(),
            utils::preview(&job.title, 38),
            utils::preview(&job.company, 23),
            saved,
            status
        );
    }
}

fn print_posting(job: &JobCandidate) {
    println!("{} at {}", job.title, job.company);
    if !job.location.is_empty() {
        println!("   Location: {}", job.location);
    }
    println!("   Match: {}", score_cell(job));
    if let Some(link) = job.application_link() {
        println!("   Apply: {}", link);
    }
    if !job.description.is_empty() {
        println!();
        println!("{}", job.description);
    }
    if !job.requirements.is_empty() {
        println!();
        println!("Requirements:");
        println!("{}", job.requirements);
    }
}

fn print_details(details: &JobDetails) {
    let fields = [
        ("Employment type", &details.employment_type),
        ("Experience level", &details.experience_level),
        ("Posted", &details.posted_date),
        ("Apply before", &details.application_deadline),
        ("Source", &details.source),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("{:<18} {}", format!("{}:", label), value);
        }
    }
    if !details.skills_required.is_empty() {
        println!("{:<18} {}", "Skills:", details.skills_required.join(", "));
    }
    if !details.company_info.is_empty() {
        println!();
        println!("{}", details.company_info);
    }
    if !details.detailed_description.is_empty() {
        println!();
        println!("{}", details.detailed_description);
    }
    if !details.benefits.is_empty() {
        println!();
        println!("Benefits:");
        for benefit in &details.benefits {
            println!("  • {}", benefit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{self, ScoreScale};
    use crate::test_support::candidate;

    #[test]
    fn test_parse_match_with_saves() {
        let cli = Cli::try_parse_from([
            "jobmatch", "match", "cv.pdf", "--more", "2", "--save", "3", "abc", "--token", "t0k",
        ])
        .unwrap();

        assert_eq!(cli.token.as_deref(), Some("t0k"));
        match cli.command {
            Command::Match {
                resume, more, save, apply, no_open,
            } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(more, 2);
                assert_eq!(save, vec!["3".to_string(), "abc".to_string()]);
                assert_eq!(apply, None);
                assert!(!no_open);
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_parse_saved_delete() {
        let cli = Cli::try_parse_from(["jobmatch", "saved", "delete", "12", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Saved {
                command: SavedCommand::Delete { ref id, yes: true }
            } if id == "12"
        ));
    }

    #[test]
    fn test_match_requires_resume() {
        assert!(Cli::try_parse_from(["jobmatch", "match"]).is_err());
    }

    #[test]
    fn test_score_cell_colors_by_band() {
        let mut jobs = vec![candidate(1, 0.75), candidate(2, 0.4)];
        scoring::ingest(&mut jobs, ScoreScale::Fraction);

        assert_eq!(score_cell(&jobs[0]), "\x1b[32m75% Excellent Match\x1b[0m");
        assert_eq!(score_cell(&jobs[1]), "\x1b[31m40% Fair Match\x1b[0m");
        assert_eq!(score_cell(&JobCandidate::new(3, "t", "c")), "-");
    }
}
