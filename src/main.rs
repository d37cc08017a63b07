//! Semester planner CLI.
//!
//! Generates a study plan from a course catalog, edits it one operation at
//! a time, and checks it.

use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use u_semester::config::Settings;
use u_semester::editor::PlanEditor;
use u_semester::models::{Catalog, PlanRecord, SEMESTER_COUNT};
use u_semester::scheduler::{AllocationRequest, Allocator};
use u_semester::validation::validate_plan;

#[derive(Parser)]
#[command(name = "u-semester")]
#[command(about = "Plan, edit, and check multi-semester course schedules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML)
    #[arg(long, short)]
    settings: Option<PathBuf>,

    /// Catalog file, overriding the settings
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Plan file, overriding the settings
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a fresh plan and write it to the plan file.
    Generate {
        /// Credit target, overriding the settings
        #[arg(long)]
        min_credits: Option<u32>,
        /// Place compulsory courses first
        #[arg(long)]
        compulsory_first: bool,
        /// Print the summary without writing the plan
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the plan file; exits with status 1 on any violation.
    Check,

    /// Print the weekly grid of one semester.
    Show {
        /// Semester number (1-8)
        semester: usize,
        /// Only show classes meeting in this week (1-based)
        #[arg(short, long)]
        week: Option<usize>,
    },

    /// Search courses by ID, name, or instructor.
    Search { keyword: String },

    /// Schedule a course with the given offering.
    Add { course: String, offering: String },

    /// Unschedule a course.
    Remove { course: String },

    /// Switch a scheduled course to another offering.
    Update { course: String, offering: String },

    /// Show or set a course priority; 0 only shows it.
    Priority {
        course: String,
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        value: i32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("reading settings {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(path) = cli.catalog {
        settings.catalog_path = path;
    }
    if let Some(path) = cli.plan {
        settings.plan_path = path;
    }

    let catalog = Catalog::load(&settings.catalog_path)
        .with_context(|| format!("reading catalog {}", settings.catalog_path.display()))?;

    match cli.command {
        Commands::Generate {
            min_credits,
            compulsory_first,
            dry_run,
        } => {
            if let Some(min) = min_credits {
                settings.min_credits = min;
            }
            settings.compulsory_first |= compulsory_first;

            let request = AllocationRequest::from_settings(&settings);
            let table = Allocator::new().allocate(&catalog, &request);
            let editor = PlanEditor::with_table(catalog, table);
            let report = editor.validate();

            for semester in 0..SEMESTER_COUNT {
                let ids: Vec<&str> = editor
                    .table()
                    .semester(semester)
                    .map(|p| p.course_id.as_str())
                    .collect();
                println!(
                    "semester {} ({} credits): {}",
                    semester + 1,
                    editor.table().semester_credits(semester),
                    ids.join(", ")
                );
            }
            println!(
                "scheduled {} of {} courses",
                editor.table().scheduled_count(),
                editor.catalog().len()
            );
            print!("{}", report.summary());
            if !report.is_valid() {
                warn!(violations = report.violations.len(), "generated plan has violations");
            }
            if !dry_run {
                editor.save_file(&settings.plan_path)?;
            }
        }

        Commands::Check => {
            let text = fs::read_to_string(&settings.plan_path)
                .with_context(|| format!("reading plan {}", settings.plan_path.display()))?;
            let records: Vec<PlanRecord> =
                serde_json::from_str(&text).context("parsing plan records")?;
            let report = validate_plan(&catalog, &records);
            print!("{}", report.summary());
            if !report.is_valid() {
                std::process::exit(1);
            }
        }

        Commands::Show { semester, week } => {
            ensure!(
                (1..=SEMESTER_COUNT).contains(&semester),
                "semester must be between 1 and {SEMESTER_COUNT}"
            );
            ensure!(week != Some(0), "weeks are numbered from 1");
            let editor = open_plan(catalog, &settings)?;
            let grid = editor.project_table(semester - 1)?;
            print!("{}", grid.render(week.map(|w| w - 1)));
        }

        Commands::Search { keyword } => {
            let editor = open_plan(catalog, &settings)?;
            let hits = editor.query(&keyword);
            if hits.is_empty() {
                println!("no courses match '{keyword}'");
            }
            for hit in hits {
                let status = match hit.semester {
                    Some(s) => format!("semester {}", s + 1),
                    None => "unscheduled".to_string(),
                };
                let sections: Vec<&str> =
                    hit.course.offerings.iter().map(|o| o.id.as_str()).collect();
                println!(
                    "{:<10} {:<30} {:>3} cr  {:<12} [{}]",
                    hit.course.id,
                    hit.course.name,
                    hit.course.credit,
                    status,
                    sections.join(" ")
                );
            }
        }

        Commands::Add { course, offering } => {
            let mut editor = open_plan(catalog, &settings)?;
            let semester = editor.add_course(&course, &offering)?;
            editor.save_file(&settings.plan_path)?;
            println!("{course} ({offering}) added to semester {}", semester + 1);
        }

        Commands::Remove { course } => {
            let mut editor = open_plan(catalog, &settings)?;
            match editor.remove_course(&course)? {
                Some(semester) => {
                    editor.save_file(&settings.plan_path)?;
                    println!("{course} removed from semester {}", semester + 1);
                }
                None => println!("{course} is not scheduled"),
            }
        }

        Commands::Update { course, offering } => {
            let mut editor = open_plan(catalog, &settings)?;
            let semester = editor.update_course(&course, &offering)?;
            editor.save_file(&settings.plan_path)?;
            println!("{course} now uses {offering} in semester {}", semester + 1);
        }

        Commands::Priority { course, value } => {
            let mut editor = PlanEditor::new(catalog);
            let previous = editor.set_priority(&course, value)?;
            if value == 0 {
                println!("{course}: priority {previous}");
            } else {
                editor.catalog().save(&settings.catalog_path)?;
                let current = editor.catalog().get(&course).map_or(previous, |c| c.priority);
                info!(course = %course, previous, current, "priority updated");
                println!("{course}: priority {previous} -> {current}");
            }
        }
    }

    Ok(())
}

/// Editor over the plan file, or over an empty plan if the file is absent.
fn open_plan(catalog: Catalog, settings: &Settings) -> Result<PlanEditor> {
    let mut editor = PlanEditor::new(catalog);
    if settings.plan_path.exists() {
        editor
            .load_file(&settings.plan_path)
            .with_context(|| format!("reading plan {}", settings.plan_path.display()))?;
    } else {
        warn!(path = %settings.plan_path.display(), "plan file not found; starting empty");
    }
    Ok(editor)
}
