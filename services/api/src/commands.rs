use crate::infra::Context;
use crate::render::{
    comparison_table, history_table, job_line, mask_token, report_text, summary_text,
    tutorial_files, tutorial_list,
};
use clap::{Args, Subcommand, ValueEnum};
use cloudready::analysis::AnalysisForm;
use cloudready::backend::ReportKind;
use cloudready::error::AppError;
use cloudready::jobs::{watch_history, watch_job, PollEvent};
use cloudready::readiness::{
    analysis_brief, compare_evaluations, correct_history, merge_jobs, summarize,
    write_history_csv, Evaluation, JobState,
};
use cloudready::settings::{TokenCheck, TokenStore};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyzeArgs {
    /// GitHub repository URL (https://github.com/<owner>/<repo>)
    #[arg(long = "repo")]
    pub(crate) repo_url: Option<String>,
    /// Local directory to analyze instead of a repository
    #[arg(long = "dir")]
    pub(crate) local_dir: Option<String>,
    /// Project name (derived from the repository or directory by default)
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Glob of files to include; repeat for several
    #[arg(long)]
    pub(crate) include: Vec<String>,
    /// Glob of files to exclude; repeat for several
    #[arg(long)]
    pub(crate) exclude: Vec<String>,
    /// Skip files larger than this many bytes
    #[arg(long)]
    pub(crate) max_file_size: Option<u64>,
    /// Disable model-assisted analysis
    #[arg(long)]
    pub(crate) no_llm: bool,
    /// GitHub token for this run (defaults to the stored token)
    #[arg(long)]
    pub(crate) token: Option<String>,
    /// Follow the job until it finishes
    #[arg(long)]
    pub(crate) watch: bool,
}

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    pub(crate) job_id: String,
    /// Poll until the job completes or fails
    #[arg(long)]
    pub(crate) watch: bool,
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Only show evaluations of this project
    #[arg(long)]
    pub(crate) project: Option<String>,
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: u32,
    /// Keep refreshing while this job is still running
    #[arg(long, value_name = "JOB_ID")]
    pub(crate) watch: Option<String>,
    /// Emit CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    pub(crate) evaluation_id: String,
    /// Print the full plain-text analysis brief
    #[arg(long)]
    pub(crate) brief: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    pub(crate) base_id: String,
    pub(crate) compare_id: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum ReportKindArg {
    CloudData,
    CloudDashboard,
    CloudReadiness,
}

impl From<ReportKindArg> for ReportKind {
    fn from(value: ReportKindArg) -> Self {
        match value {
            ReportKindArg::CloudData => ReportKind::CloudData,
            ReportKindArg::CloudDashboard => ReportKind::CloudDashboard,
            ReportKindArg::CloudReadiness => ReportKind::CloudReadiness,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    pub(crate) project: String,
    #[arg(long, value_enum, default_value = "cloud-readiness")]
    pub(crate) kind: ReportKindArg,
}

#[derive(Subcommand, Debug)]
pub(crate) enum TutorialsCommand {
    /// List generated tutorials
    List,
    /// List a finished tutorial's files, or print one of them
    Show {
        project: String,
        #[arg(long)]
        file: Option<String>,
    },
    /// Delete a project's tutorial output
    Delete { project: String },
}

#[derive(Subcommand, Debug)]
pub(crate) enum TokenCommand {
    /// Store a GitHub token
    Set { token: String },
    /// Show the stored token (masked)
    Show,
    /// Remove the stored token
    Clear,
    /// Check a token (defaults to the stored one) against GitHub
    Test { token: Option<String> },
}

fn analysis_form(args: AnalyzeArgs, stored_token: Option<String>) -> AnalysisForm {
    AnalysisForm {
        repo_url: args.repo_url,
        local_dir: args.local_dir,
        project_name: args.name,
        github_token: args.token.or(stored_token),
        include_patterns: args.include,
        exclude_patterns: args.exclude,
        max_file_size: args.max_file_size,
        use_llm_cloud_analysis: Some(!args.no_llm),
    }
}

pub(crate) async fn run_analyze(context: &Context, args: AnalyzeArgs) -> Result<(), AppError> {
    let watch = args.watch;
    let stored_token = match args.token {
        Some(_) => None,
        None => context.tokens.get()?,
    };
    let request = analysis_form(args, stored_token).validate()?;

    info!(project = %request.project_name, "submitting analysis");
    let job = context.client.start_analysis(&request).await?;
    println!(
        "Started analysis of {} as job {}",
        request.project_name, job.id
    );

    if watch {
        follow_job(context, &job.id).await
    } else {
        println!("Follow progress with: cloudready status {} --watch", job.id);
        Ok(())
    }
}

async fn follow_job(context: &Context, job_id: &str) -> Result<(), AppError> {
    let mut subscription = watch_job(
        Arc::clone(&context.client),
        job_id,
        context.config.polling.status_interval,
    );

    let mut last_status: Option<JobState> = None;
    while let Some(event) = subscription.next().await {
        match event {
            PollEvent::Update(job) => {
                if last_status.as_ref() != Some(&job.status) {
                    println!("{}", job_line(&job));
                }
                last_status = Some(job.status);
            }
            PollEvent::Error(err) => warn!(error = %err, job_id, "status check failed"),
        }
    }
    Ok(())
}

pub(crate) async fn run_status(context: &Context, args: StatusArgs) -> Result<(), AppError> {
    if args.watch {
        return follow_job(context, &args.job_id).await;
    }
    let job = context.client.job_status(&args.job_id).await?;
    println!("{}", job_line(&job));
    Ok(())
}

async fn project_rows(
    context: &Context,
    project: &str,
    limit: u32,
) -> Result<Vec<Evaluation>, AppError> {
    let evaluations = context.client.project_evaluations(project).await?;
    let mut rows = merge_jobs(evaluations, &[]);
    correct_history(&mut rows);
    rows.truncate(limit as usize);
    Ok(rows)
}

/// Keep only the rows of `project`, when one was asked for.
fn scoped(mut rows: Vec<Evaluation>, project: Option<&str>) -> Vec<Evaluation> {
    if let Some(project) = project {
        rows.retain(|row| row.project_name == project);
    }
    rows
}

fn print_history(rows: &[Evaluation], csv: bool) -> Result<(), AppError> {
    if csv {
        write_history_csv(rows, std::io::stdout().lock())?;
    } else {
        print!("{}", history_table(rows));
    }
    Ok(())
}

pub(crate) async fn run_history(context: &Context, args: HistoryArgs) -> Result<(), AppError> {
    let rows = match args.project.as_deref() {
        Some(project) => project_rows(context, project, args.limit).await?,
        None => context.client.merged_history(args.limit).await?.evaluations,
    };
    print_history(&rows, args.csv)?;

    let Some(job_id) = args.watch else {
        return Ok(());
    };
    let mut subscription = watch_history(
        Arc::clone(&context.client),
        job_id.as_str(),
        args.limit,
        context.config.polling.history_interval,
    );
    while let Some(event) = subscription.next().await {
        match event {
            PollEvent::Update(page) => {
                println!();
                let rows = scoped(page.evaluations, args.project.as_deref());
                print_history(&rows, args.csv)?;
            }
            PollEvent::Error(err) => warn!(error = %err, "history refresh failed"),
        }
    }
    Ok(())
}

pub(crate) async fn run_explain(context: &Context, args: ExplainArgs) -> Result<(), AppError> {
    let evaluation = context.client.cloud_evaluation(&args.evaluation_id).await?;
    if args.brief {
        print!("{}", analysis_brief(&evaluation));
    } else {
        print!("{}", summary_text(&summarize(&evaluation)));
    }
    Ok(())
}

pub(crate) async fn run_compare(context: &Context, args: CompareArgs) -> Result<(), AppError> {
    let (base, other) = tokio::try_join!(
        context.client.cloud_evaluation(&args.base_id),
        context.client.cloud_evaluation(&args.compare_id)
    )?;
    print!("{}", comparison_table(&compare_evaluations(&base, &other)));
    Ok(())
}

pub(crate) async fn run_report(context: &Context, args: ReportArgs) -> Result<(), AppError> {
    let body = context.client.report(&args.project, args.kind.into()).await?;
    println!("{}", report_text(&body));
    Ok(())
}

pub(crate) async fn run_tutorials(
    context: &Context,
    command: TutorialsCommand,
) -> Result<(), AppError> {
    match command {
        TutorialsCommand::List => {
            let index = context.client.tutorials().await?;
            print!("{}", tutorial_list(&index));
        }
        TutorialsCommand::Show { project, file } => {
            let output = context.client.project_output(&project).await?;
            match file.as_deref().map(|name| (name, output.files.get(name))) {
                Some((_, Some(content))) => print!("{content}"),
                Some((name, None)) => {
                    println!("{project} has no file named {name}");
                    print!("{}", tutorial_files(&output));
                }
                None => print!("{}", tutorial_files(&output)),
            }
        }
        TutorialsCommand::Delete { project } => {
            context.client.delete_tutorial(&project).await?;
            println!("Deleted tutorial for {project}");
        }
    }
    Ok(())
}

pub(crate) async fn run_token(context: &Context, command: TokenCommand) -> Result<(), AppError> {
    match command {
        TokenCommand::Set { token } => {
            context.tokens.set(&token)?;
            println!("Saved GitHub token to {}", context.tokens.path().display());
        }
        TokenCommand::Show => match context.tokens.get()? {
            Some(token) => println!("{}", mask_token(&token)),
            None => println!("No GitHub token stored"),
        },
        TokenCommand::Clear => {
            context.tokens.clear()?;
            println!("Removed stored GitHub token");
        }
        TokenCommand::Test { token } => {
            let token = match token {
                Some(token) => Some(token),
                None => context.tokens.get()?,
            };
            let Some(token) = token else {
                println!("No GitHub token stored; pass one or run `cloudready token set`");
                return Ok(());
            };
            let check = match context.client.test_github_token(&token).await {
                Ok(check) => check,
                Err(err) if err.status().is_some() => TokenCheck::invalid(
                    err.body_field("message")
                        .unwrap_or("Failed to validate GitHub token"),
                ),
                Err(err) => return Err(err.into()),
            };
            println!("{}", check.summary());
        }
    }
    Ok(())
}
