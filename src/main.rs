use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};

use fixlens_core::{ClassifyConfig, FixlensConfig, OutputFormat, PolicyChoice};
use fixlens_gitmine::commits::{is_fix_message, list_commits, HistoryOptions};
use fixlens_gitmine::filter::SourceFilter;
use fixlens_gitmine::repo::{open_or_clone, open_repository};
use fixlens_survey::census::census_head;
use fixlens_survey::pipeline::classify_change_set;
use fixlens_survey::report::{run_survey, SurveyOptions};
use fixlens_syntax::policy::build_policy;

#[derive(Parser)]
#[command(
    name = "fixlens",
    version,
    about = "Correlate fix commits with the code constructs they touch",
    long_about = "Fixlens studies where bug fixes actually land.\n\n\
                   It walks git history for fix commits, maps every changed hunk to its\n\
                   innermost enclosing declaration, and classifies each touched declaration\n\
                   against a structural policy (asserts, conditionals, loops, or a value\n\
                   subset).\n\n\
                   Examples:\n  \
                     fixlens survey --repo .            Survey fix commits in this repo\n  \
                     fixlens survey --policy loop       Count loop-bearing fixed methods\n  \
                     fixlens commits --fix-only         List commits that look like fixes\n  \
                     fixlens resolve HEAD               Classify the change-set at HEAD\n  \
                     fixlens census --repo .            Baseline census at the branch tip"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .fixlens.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Survey fix commits and classify the declarations they touch
    #[command(
        long_about = "Survey fix commits and classify the declarations they touch.\n\n\
        Walks history newest first, detects fix commits by summary keyword, maps each\n\
        hunk of each fix to its innermost enclosing declaration, and classifies every\n\
        touched declaration against the chosen policy. Declarations are counted once\n\
        per change-set no matter how many hunks hit them.\n\n\
        Examples:\n  fixlens survey --repo .\n  fixlens survey --policy conditional --max-commits 500\n  fixlens survey --remote https://example.com/lib.git --repo ./mirror"
    )]
    Survey {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Clone this URL into the repository path first
        #[arg(long)]
        remote: Option<String>,

        /// Branch to walk (default: HEAD)
        #[arg(long)]
        branch: Option<String>,

        /// Stop after this many commits, newest first
        #[arg(long)]
        max_commits: Option<usize>,

        /// Classification policy: assert, conditional, loop, or subset
        #[arg(long)]
        policy: Option<PolicyChoice>,

        /// Fix keyword (repeatable; overrides the configured list)
        #[arg(long)]
        keyword: Vec<String>,

        /// Exception whose direct throw counts as assertion-like
        #[arg(long)]
        throw_type: Option<String>,
    },
    /// List commits newest first, marking those that look like fixes
    #[command(
        long_about = "List commits newest first, marking those that look like fixes.\n\n\
        Fix detection is a case-insensitive substring match of the commit summary\n\
        against the configured keywords.\n\n\
        Examples:\n  fixlens commits --repo .\n  fixlens commits --fix-only --max-commits 50\n  fixlens commits --keyword bug --keyword hotfix"
    )]
    Commits {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Branch to walk (default: HEAD)
        #[arg(long)]
        branch: Option<String>,

        /// Stop after this many commits, newest first
        #[arg(long)]
        max_commits: Option<usize>,

        /// Show only commits whose summary matches a fix keyword
        #[arg(long)]
        fix_only: bool,

        /// Fix keyword (repeatable; overrides the configured list)
        #[arg(long)]
        keyword: Vec<String>,
    },
    /// Classify the change-set of a single commit
    #[command(
        long_about = "Classify the change-set of a single commit.\n\n\
        Maps every hunk of the commit to its innermost enclosing declaration and\n\
        reports one verdict per touched declaration. The commit can be anything\n\
        git rev-parse accepts: a full or abbreviated hash, a ref, HEAD~2, and so on.\n\n\
        Examples:\n  fixlens resolve HEAD\n  fixlens resolve abc1234 --policy loop\n  fixlens resolve HEAD~3 --format json"
    )]
    Resolve {
        /// Commit to classify (hash, ref, or revision expression)
        commit: String,

        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Classification policy: assert, conditional, loop, or subset
        #[arg(long)]
        policy: Option<PolicyChoice>,

        /// Exception whose direct throw counts as assertion-like
        #[arg(long)]
        throw_type: Option<String>,
    },
    /// Census declarations at a branch tip against the policy
    #[command(
        long_about = "Census declarations at a branch tip against the policy.\n\n\
        Counts every declaration in the tip tree and how many satisfy the policy,\n\
        giving the baseline to compare survey results against: the matched share\n\
        across the whole tree rather than across fixed code only.\n\n\
        Examples:\n  fixlens census --repo .\n  fixlens census --branch develop --policy loop"
    )]
    Census {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Branch tip to census (default: HEAD)
        #[arg(long)]
        branch: Option<String>,

        /// Classification policy: assert, conditional, loop, or subset
        #[arg(long)]
        policy: Option<PolicyChoice>,
    },
    /// Create a default .fixlens.toml configuration file
    #[command(long_about = "Create a default .fixlens.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .fixlens.toml already exists unless --force is given.")]
    Init {
        /// Overwrite an existing .fixlens.toml
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        // Bold/bright header
        println!("\x1b[1m\x1b[33m🔍\x1b[0m \x1b[1mfixlens\x1b[0m v{version} — where do bug fixes actually land?\n");

        println!("Quick start:");
        println!("  \x1b[36mfixlens init\x1b[0m                  Create a .fixlens.toml config file");
        println!("  \x1b[36mfixlens survey --repo .\x1b[0m       Survey fix commits against a policy");
        println!("  \x1b[36mfixlens census --repo .\x1b[0m       Baseline census at the branch tip\n");

        println!("All commands:");
        println!("  \x1b[32msurvey\x1b[0m    Walk history and classify every fix change-set");
        println!("  \x1b[32mcommits\x1b[0m   List commits with fix detection");
        println!("  \x1b[32mresolve\x1b[0m   Classify a single change-set");
        println!("  \x1b[32mcensus\x1b[0m    Count policy-matching declarations at the tip");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("fixlens v{version} — where do bug fixes actually land?\n");

        println!("Quick start:");
        println!("  fixlens init                  Create a .fixlens.toml config file");
        println!("  fixlens survey --repo .       Survey fix commits against a policy");
        println!("  fixlens census --repo .       Baseline census at the branch tip\n");

        println!("All commands:");
        println!("  survey    Walk history and classify every fix change-set");
        println!("  commits   List commits with fix detection");
        println!("  resolve   Classify a single change-set");
        println!("  census    Count policy-matching declarations at the tip");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'fixlens <command> --help' for details.");
}

fn require_repository(path: &Path) -> Result<()> {
    if !path.join(".git").exists() && git2::Repository::discover(path).is_err() {
        miette::bail!(miette::miette!(
            help = "Run fixlens from inside a git repository, or point --repo at one",
            "Not a git repository: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Policy settings from the config file with CLI flags layered on top.
fn classify_settings(
    config: &FixlensConfig,
    policy: Option<PolicyChoice>,
    throw_type: Option<&str>,
) -> ClassifyConfig {
    ClassifyConfig {
        policy: policy.unwrap_or(config.classify.policy),
        throw_type: throw_type
            .map(str::to_string)
            .unwrap_or_else(|| config.classify.throw_type.clone()),
    }
}

fn commit_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".into())
}

const DEFAULT_CONFIG: &str = r#"# fixlens configuration

[survey]
# Substrings that mark a commit summary as a fix (case-insensitive)
# fix_keywords = ["fix"]
# branch = "main"
# max_commits = 10000

[classify]
# Structural policy: assert, conditional, loop, or subset
# policy = "assert"
# Exception whose direct throw counts as assertion-like
# throw_type = "IllegalArgumentException"

[filter]
# extensions = ["java"]
# skip_patterns = ["**/generated/**", "**/target/**"]
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FixlensConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(".fixlens.toml");
            if default_path.exists() {
                FixlensConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("loading .fixlens.toml")?
            } else {
                FixlensConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!("policy: {}", config.classify.policy);
        eprintln!("fix keywords: {}", config.survey.fix_keywords.join(", "));
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Survey {
            ref repo,
            ref remote,
            ref branch,
            max_commits,
            policy,
            ref keyword,
            ref throw_type,
        }) => {
            if let Some(url) = remote {
                eprintln!("Cloning {} into {}...", url, repo.display());
                open_or_clone(url, repo)
                    .into_diagnostic()
                    .wrap_err("cloning repository")?;
            } else {
                require_repository(repo)?;
            }

            let mut options = SurveyOptions::from_config(&config);
            if branch.is_some() {
                options.branch = branch.clone();
            }
            if let Some(n) = max_commits {
                options.max_commits = Some(n);
            }
            if let Some(p) = policy {
                options.policy = p;
            }
            if !keyword.is_empty() {
                options.fix_keywords = keyword.clone();
            }
            if let Some(t) = throw_type {
                options.throw_type = t.clone();
            }

            let is_tty = std::io::stderr().is_terminal();
            let spinner = if is_tty {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .unwrap(),
                );
                pb.set_message("Surveying fix commits...");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let report = run_survey(repo, &options)
                .inspect_err(|_e| {
                    if let Some(pb) = &spinner {
                        pb.finish_with_message("Failed");
                    }
                })
                .into_diagnostic()?;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    print!("{}", report.to_markdown());
                }
                OutputFormat::Text => {
                    println!("{report}");
                }
            }
        }
        Some(Command::Commits {
            ref repo,
            ref branch,
            max_commits,
            fix_only,
            ref keyword,
        }) => {
            require_repository(repo)?;
            let repository = open_repository(repo).into_diagnostic()?;

            let options = HistoryOptions {
                branch: branch.clone(),
                max_commits,
            };
            let mut commits = list_commits(&repository, &options).into_diagnostic()?;

            let keywords = if keyword.is_empty() {
                config.survey.fix_keywords.clone()
            } else {
                keyword.clone()
            };
            if fix_only {
                commits.retain(|meta| is_fix_message(&meta.summary, &keywords));
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&commits).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    println!("# Commits\n");
                    println!("| Commit | Date | Fix | Summary |");
                    println!("|--------|------|-----|---------|");
                    for meta in &commits {
                        let fix = if is_fix_message(&meta.summary, &keywords) {
                            "yes"
                        } else {
                            ""
                        };
                        println!(
                            "| `{}` | {} | {} | {} |",
                            &meta.id[..10],
                            commit_date(meta.timestamp),
                            fix,
                            meta.summary,
                        );
                    }
                }
                OutputFormat::Text => {
                    println!("Commits at {} ({} shown):", repo.display(), commits.len());
                    println!("{:-<72}", "");
                    for meta in &commits {
                        let marker = if is_fix_message(&meta.summary, &keywords) {
                            "fix"
                        } else {
                            "   "
                        };
                        println!(
                            "  {}  {}  {}  {}",
                            &meta.id[..10],
                            commit_date(meta.timestamp),
                            marker,
                            meta.summary,
                        );
                    }
                }
            }
        }
        Some(Command::Resolve {
            ref commit,
            ref repo,
            policy,
            ref throw_type,
        }) => {
            require_repository(repo)?;
            let repository = open_repository(repo).into_diagnostic()?;

            let id = repository
                .revparse_single(commit)
                .into_diagnostic()
                .wrap_err(format!("resolving '{commit}'"))?
                .peel_to_commit()
                .into_diagnostic()
                .wrap_err(format!("'{commit}' is not a commit"))?
                .id()
                .to_string();

            let settings = classify_settings(&config, policy, throw_type.as_deref());
            let policy = build_policy(&settings);
            let filter = SourceFilter::from_config(&config.filter).into_diagnostic()?;
            let outcome = classify_change_set(&repository, &id, policy.as_ref(), &filter)
                .into_diagnostic()?;

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&outcome).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    println!("# Change-set {}\n", &outcome.commit[..10]);
                    println!("**Policy:** {}\n", policy.name());
                    if outcome.touched.is_empty() {
                        println!("No declarations touched.");
                    } else {
                        println!("| Declaration | Location | Matched |");
                        println!("|-------------|----------|---------|");
                        for touched in &outcome.touched {
                            println!(
                                "| {} | `{}` | {} |",
                                touched.name.as_deref().unwrap_or("(unnamed)"),
                                touched.key,
                                if touched.matched { "yes" } else { "no" },
                            );
                        }
                    }
                    if outcome.unparsable_files > 0 {
                        println!("\n**Unparsable snapshots:** {}", outcome.unparsable_files);
                    }
                }
                OutputFormat::Text => {
                    println!(
                        "Change-set {} (policy: {}):",
                        &outcome.commit[..10],
                        policy.name()
                    );
                    println!("{:-<72}", "");
                    if outcome.touched.is_empty() {
                        println!("  No declarations touched.");
                    }
                    for touched in &outcome.touched {
                        let verdict = if touched.matched { "match" } else { "  -  " };
                        println!(
                            "  {}  {:<44} {}",
                            verdict,
                            touched.key.to_string(),
                            touched.name.as_deref().unwrap_or("(unnamed)"),
                        );
                    }
                    if outcome.unparsable_files > 0 {
                        println!("\n  Unparsable snapshots: {}", outcome.unparsable_files);
                    }
                }
            }
        }
        Some(Command::Census {
            ref repo,
            ref branch,
            policy,
        }) => {
            require_repository(repo)?;
            let repository = open_repository(repo).into_diagnostic()?;

            let settings = classify_settings(&config, policy, None);
            let policy = build_policy(&settings);
            let filter = SourceFilter::from_config(&config.filter).into_diagnostic()?;
            let census = census_head(&repository, branch.as_deref(), policy.as_ref(), &filter)
                .into_diagnostic()?;

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&census).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    println!("# Declaration census\n");
                    println!("- **Policy:** {}", policy.name());
                    println!("- **Source files:** {}", census.files);
                    println!("- **Unparsable files:** {}", census.unparsable_files);
                    println!("- **Declarations:** {}", census.declarations);
                    println!("- **Matched:** {}", census.matched);
                    println!("- **Matched share:** {}%", census.matched_share());
                }
                OutputFormat::Text => {
                    println!(
                        "Declaration census at {} (policy: {}):",
                        repo.display(),
                        policy.name()
                    );
                    println!("{:-<72}", "");
                    println!("  Source files:       {}", census.files);
                    println!("  Unparsable files:   {}", census.unparsable_files);
                    println!("  Declarations:       {}", census.declarations);
                    println!("  Matched:            {}", census.matched);
                    println!("  Matched share:      {}%", census.matched_share());
                }
            }
        }
        Some(Command::Init { force }) => {
            let path = Path::new(".fixlens.toml");
            if path.exists() && !force {
                miette::bail!(".fixlens.toml already exists (use --force to overwrite)");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .fixlens.toml with default configuration");
        }
    }

    Ok(())
}
