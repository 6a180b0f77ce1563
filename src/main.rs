//! gerry — AI-assisted code review for Gerrit patches.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use gerry::assistant;
use gerry::config::Config;
use gerry::diff::git;
use gerry::env::Env;
use gerry::gerrit::{self, GerritClient};
use gerry::models::ModelTier;
use gerry::output;
use gerry::review::{self, ReviewRunner, RunOptions};
use gerry::ui;

use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::args::{Cli, Command, GerritArgs, ReviewArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Review(args) => run_review(*args).await,
        Command::Gerrit(args) => run_gerrit(*args).await,
        Command::Version => run_version(),
    }
}

/// Print version information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        gerry::constants::APP_NAME.bold(),
        env!("CARGO_PKG_VERSION").green().bold(),
    );
    Ok(())
}

/// Local review of the repository's HEAD commit.
async fn run_review(args: ReviewArgs) -> Result<()> {
    let env = Env::real();
    let config =
        Config::load(args.config.as_deref(), &env).context("failed to load configuration")?;

    if !config.repo_dir.is_dir() {
        bail!(
            "repository directory not found: {} — check the repo_dir setting",
            config.repo_dir.display(),
        );
    }

    cli::print_banner();

    let change = review::load_change_from_head(&config.repo_dir, &config.review.diff_excludes)
        .await
        .context("failed to read the HEAD commit")?;

    if change.diff.trim().is_empty() {
        eprintln!("No changes to review.");
        return Ok(());
    }

    let backend = args.backend.unwrap_or(config.assistant.backend);
    let assistant = assistant::create(backend, &config.repo_dir);
    ui::status(&format!("using {} backend", assistant.name()));

    let options = RunOptions {
        tier: args.tier(),
        instruction_override: args.instruction.clone(),
        max_tokens: args.max_tokens,
        max_files: args.max_files,
        assume_yes: args.yes,
        verbose: args.verbose,
    };
    let runner = ReviewRunner::new(&config, assistant, env, options);

    let outcome = runner.run(&change, &args.types.selected()).await;

    if !outcome.results.is_empty() {
        match args.output {
            Some(ref path) => {
                output::write_reviews(path, &outcome.results)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                ui::status(&format!("review written to {}", path.display()));
            }
            None => {
                print!("{}", output::render_results(&outcome.results));
            }
        }
    }

    ui::summary(&outcome.completed_kinds(), &outcome.failures);
    if outcome.all_failed() {
        bail!("all requested review types failed");
    }

    Ok(())
}

/// Gerrit-integrated review: fetch, check out, review, post back.
async fn run_gerrit(args: GerritArgs) -> Result<()> {
    let env = Env::real();
    let config =
        Config::load(args.config.as_deref(), &env).context("failed to load configuration")?;
    let gerrit_config = config.gerrit()?;
    let client = GerritClient::new(gerrit_config.clone());

    if args.test {
        let version = client
            .test_connection()
            .await
            .context("connection test failed")?;
        ui::status(&format!(
            "successfully connected to Gerrit at {} (version {version})",
            gerrit_config.url,
        ));
        return Ok(());
    }

    let Some(ref change_input) = args.change else {
        bail!(
            "no change given — pass a change number, change id, or URL, \
             or use --test to check the connection"
        );
    };

    cli::print_banner();

    let change_ref = gerrit::parse_change_ref(change_input);
    ui::status(&format!("fetching change {}", change_ref.id));
    let info = client
        .get_change(&change_ref)
        .await
        .context("failed to fetch change from Gerrit")?;
    ui::status(&format!("change {}: {}", info.number, info.subject));

    if !config.repo_dir.is_dir() {
        bail!(
            "repository directory not found: {} — check the repo_dir setting",
            config.repo_dir.display(),
        );
    }

    checkout_patch(&config, &client, &info, change_ref.patchset).await?;

    let mut change =
        review::load_change_from_head(&config.repo_dir, &config.review.diff_excludes)
            .await
            .context("failed to read the checked-out patch")?;
    change.id = info.id.clone();
    change.number = Some(info.number);
    change.subject = info.subject.clone();
    change.branch = info.branch.clone();
    if let Some(ref revision) = info.current_revision {
        change.revision = revision.clone();
    }

    let assistant = assistant::create(config.assistant.backend, &config.repo_dir);
    ui::status(&format!("using {} backend", assistant.name()));

    let options = RunOptions {
        tier: ModelTier::Paid,
        assume_yes: args.yes,
        verbose: args.verbose,
        ..Default::default()
    };
    let runner = ReviewRunner::new(&config, assistant, env, options);

    let outcome = runner.run(&change, &args.types.selected()).await;

    let mut post_failures = 0usize;
    if args.skip_post {
        if !outcome.results.is_empty() {
            ui::status("review completed (not posted to Gerrit)");
            print!("{}", output::render_results(&outcome.results));
        }
    } else {
        // Post in review-type order: comment ordering matters for
        // readability on the change page.
        for result in &outcome.results {
            ui::status(&format!(
                "posting {} review to change {}",
                result.kind, info.number,
            ));
            if let Err(e) = client.post_review(&info, &result.text).await {
                ui::error(&format!("failed to post {} review: {e}", result.kind));
                post_failures += 1;
            }
        }
    }

    ui::summary(&outcome.completed_kinds(), &outcome.failures);
    if outcome.all_failed() {
        bail!("all requested review types failed");
    }
    if post_failures > 0 {
        bail!("{post_failures} review comment(s) could not be posted");
    }

    Ok(())
}

/// Clean the checkout and fetch the change's revision.
async fn checkout_patch(
    config: &Config,
    client: &GerritClient,
    info: &gerrit::ChangeInfo,
    patchset: Option<u32>,
) -> Result<()> {
    let repo = &config.repo_dir;

    if git::has_uncommitted_changes(repo)
        .await
        .context("failed to inspect the repository")?
    {
        ui::warn("uncommitted changes found, running git reset --hard");
        git::reset_hard(repo).await?;
    }
    git::clean_untracked(repo).await?;

    let source = client.checkout_source(info, patchset)?;
    ui::status(&format!(
        "checking out {} from {}",
        source.refspec, source.url,
    ));
    git::fetch_and_checkout(repo, &source.url, &source.refspec)
        .await
        .context("failed to check out the patch")?;
    ui::status(&format!("current commit: {}", git::head_summary(repo).await?));

    Ok(())
}
