use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use academy_enrollment::{
    logging, quote_for, Catalogs, Config, EnrollmentForm, EnrollmentSubmission, WebhookClient,
};

#[derive(Parser)]
#[command(name = "academy", version, about = "Academy enrollment pricing and submission")]
struct Cli {
    /// Path to a TOML config file (defaults to ./academy.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show log targets and line numbers
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List equipment items
    Catalog,

    /// List enrollment programs
    Programs,

    /// Validate a promotional code
    CheckCode { code: String },

    /// Price an enrollment
    Quote {
        #[arg(long)]
        program: String,
        #[arg(long = "owned")]
        owned: Vec<String>,
        #[arg(long)]
        code: Option<String>,
    },

    /// Submit an enrollment to the webhook
    Enroll {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        student: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        program: String,
        #[arg(long = "owned")]
        owned: Vec<String>,
        #[arg(long)]
        code: Option<String>,
        /// Print the payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

/// Failure whose message was already shown to the user
#[derive(Debug, Error)]
#[error("{0}")]
struct Reported(String);

/// Print a user-facing failure once and wrap it so `main` stays quiet
fn report(message: impl Into<String>) -> anyhow::Error {
    let message = message.into();
    eprintln!("❌ {}", message);
    Reported(message).into()
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<Reported>() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.log_level, cli.verbose);

    let catalogs = Catalogs::load(&config)?;

    match cli.command {
        Command::Catalog => print_catalog(&catalogs),
        Command::Programs => print_programs(&catalogs),
        Command::CheckCode { code } => check_code(&catalogs, &code),
        Command::Quote { program, owned, code } => run_quote(&catalogs, program, owned, code),
        Command::Enroll {
            parent,
            student,
            email,
            program,
            owned,
            code,
            dry_run,
        } => {
            let form = EnrollmentForm {
                parent_name: parent,
                student_name: student,
                email,
                program_id: program,
                owned_item_ids: owned,
                promo_code: code,
            };
            run_enroll(&config, &catalogs, &form, dry_run).await
        }
    }
}

fn print_catalog(catalogs: &Catalogs) -> Result<()> {
    println!("🥋 Equipment Catalog");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for item in catalogs.equipment.all_items() {
        let marker = if item.is_discount_eligible() { "" } else { "  (no descuento)" };
        println!(
            "{:<14} {:<28} {:>9.2}  {}{}",
            item.id,
            item.name,
            item.price,
            item.kind.as_str(),
            marker
        );
    }
    println!("\n✓ {} items", catalogs.equipment.count());
    Ok(())
}

fn print_programs(catalogs: &Catalogs) -> Result<()> {
    println!("📋 Programs");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for program in catalogs.programs.all_programs() {
        println!("{:<10} {:<24} {:>9.2}", program.id, program.name, program.base_price);
        for item in program.included_equipment(&catalogs.equipment) {
            println!("           + {}", item.name);
        }
    }
    Ok(())
}

fn check_code(catalogs: &Catalogs, code: &str) -> Result<()> {
    match catalogs.promos.lookup(code) {
        Ok(entry) => {
            println!("✅ {} → -${:.2}", entry.code, entry.discount);
            if let Some(description) = &entry.description {
                println!("   {}", description);
            }
            Ok(())
        }
        Err(e) => Err(report(e.user_message())),
    }
}

fn run_quote(
    catalogs: &Catalogs,
    program_id: String,
    owned: Vec<String>,
    code: Option<String>,
) -> Result<()> {
    let program = catalogs
        .programs
        .find_by_id(&program_id)
        .ok_or_else(|| anyhow!("Unknown program: {}", program_id))?;

    let form = EnrollmentForm {
        program_id,
        owned_item_ids: owned,
        promo_code: code,
        ..Default::default()
    };

    let breakdown = quote_for(&form, program, &catalogs.equipment, &catalogs.promos)
        .map_err(|e| report(e.user_message()))?;

    println!("💰 {}", program.name);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:<36} {:>9.2}", "Precio base", breakdown.base_price);
    for line in &breakdown.discounts {
        println!("{:<36} {:>9.2}", format!("- {}", line.label), -line.amount);
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:<36} {:>9.2}", "Total", breakdown.final_price);
    Ok(())
}

async fn run_enroll(
    config: &Config,
    catalogs: &Catalogs,
    form: &EnrollmentForm,
    dry_run: bool,
) -> Result<()> {
    let submission = EnrollmentSubmission::build(
        form,
        &catalogs.programs,
        &catalogs.equipment,
        &catalogs.promos,
        Utc::now(),
    )
    .map_err(|e| report(e.user_message()))?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&submission)?);
        return Ok(());
    }

    let client = WebhookClient::from_config(config)?;
    println!("📨 Sending enrollment to {}...", client.endpoint());

    match client.submit(&submission).await {
        Ok(()) => {
            println!("✅ Enrollment sent. Total: ${:.2}", submission.final_total);
            Ok(())
        }
        Err(e) => Err(report(e.user_message())),
    }
}
