//! farmdesk command-line interface.
//!
//! Records harvests, labour, sales and expenses in a local SQLite file
//! and mirrors them to a spreadsheet endpoint while `farmdesk run` is
//! active.
//!
//! Usage:
//!   farmdesk login 999000
//!   farmdesk order add --vegetable Cucumber --weight 38.9 --price 230
//!   farmdesk report --period 2025-07
//!   farmdesk run

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use farmdesk_app::{AppConfig, FarmApp};
use farmdesk_assistant::{ChatTurn, INSIGHTS_QUESTION};
use farmdesk_storage::FarmRecord;
use farmdesk_sync::CheckOutcome;
use farmdesk_types::forms::{parse_date, parse_quantity};
use farmdesk_types::summary::{FarmTotals, PeriodReport};
use farmdesk_types::{
    filters, ExpenseForm, ExpenseRecord, GreenhouseNumber, HarvestForm, HarvestPatch,
    HarvestRecord, IsoDate, Order, OrderForm, OrderPatch, OrderStatus, PaymentStatus, Period,
    RecordId, VegetableType, WorkForm, WorkRecord,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "farmdesk")]
#[command(about = "Farm ledger with periodic spreadsheet sync")]
struct Cli {
    /// SQLite data file
    #[arg(long, env = "FARMDESK_DATA")]
    data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, env = "FARMDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Access PIN expected at login
    #[arg(long, env = "FARMDESK_PIN", hide_env_values = true)]
    pin: Option<String>,

    /// Gemini API key for `ask`
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Unlock the ledger with the 6-digit PIN
    Login { pin: String },
    /// Lock the ledger
    Logout,
    /// Harvest yields
    #[command(subcommand)]
    Harvest(HarvestCommand),
    /// Labour hours
    #[command(subcommand)]
    Work(WorkCommand),
    /// Sales orders
    #[command(subcommand)]
    Order(OrderCommand),
    /// Operating expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),
    /// Financial report for a period
    Report {
        /// `ALL`, a year (`2025`), a month (`07`) or both (`2025-07`)
        #[arg(long, default_value = "ALL")]
        period: Period,
    },
    /// Spreadsheet replication
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Run the replication scheduler until interrupted
    Run,
    /// Ask the farm assistant a question
    Ask {
        /// Question; omit for a farm health summary
        question: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value = "ALL")]
    period: Period,
}

#[derive(Subcommand, Debug)]
enum HarvestCommand {
    Add {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        greenhouse: String,
        #[arg(long)]
        vegetable: String,
        #[arg(long)]
        other: Option<String>,
        #[arg(long)]
        weight: String,
    },
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        greenhouse: Option<u8>,
    },
    Update {
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        vegetable: Option<VegetableType>,
        /// Crop name when the vegetable is `Other`
        #[arg(long)]
        other: Option<String>,
        #[arg(long)]
        weight: Option<String>,
    },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum WorkCommand {
    Add {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        greenhouse: String,
        #[arg(long)]
        task: String,
        #[arg(long)]
        other: Option<String>,
        #[arg(long)]
        hours: String,
    },
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        greenhouse: Option<u8>,
    },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    Add {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        vegetable: String,
        #[arg(long)]
        other: Option<String>,
        #[arg(long)]
        weight: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, default_value = "")]
        payment: String,
    },
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Update {
        id: String,
        #[arg(long)]
        vegetable: Option<VegetableType>,
        /// Crop name when the vegetable is `Other`
        #[arg(long)]
        other: Option<String>,
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        payment: Option<PaymentStatus>,
    },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Add {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: String,
        #[arg(long)]
        other: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        amount: String,
    },
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum SyncCommand {
    /// Push the ledger now, regardless of when it was last pushed
    Now,
    /// Show the endpoint and last sync time
    Status,
    /// Set the endpoint, or clear it with `--clear`
    Endpoint {
        url: Option<String>,
        #[arg(long, conflicts_with = "url")]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let mut app = FarmApp::open(config).context("Failed to open farm data")?;

    if !matches!(cli.command, Command::Login { .. }) && !app.is_logged_in() {
        bail!("Not logged in. Run `farmdesk login <PIN>` first.");
    }
    dispatch(&mut app, cli.command).await?;

    app.shutdown().await;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    if let Some(pin) = &cli.pin {
        config.access_pin = pin.clone();
    }
    if let Some(key) = &cli.gemini_api_key {
        config.assistant.api_key = key.clone();
    }
    Ok(config)
}

async fn dispatch(app: &mut FarmApp, command: Command) -> Result<()> {
    match command {
        Command::Login { pin } => {
            app.login(&pin)?;
            println!("Logged in.");
        }
        Command::Logout => {
            app.logout().await?;
            println!("Logged out.");
        }
        Command::Harvest(cmd) => harvest(app, cmd)?,
        Command::Work(cmd) => work(app, cmd)?,
        Command::Order(cmd) => order(app, cmd)?,
        Command::Expense(cmd) => expense(app, cmd)?,
        Command::Report { period } => {
            print_report(&app.report(period));
            print_totals(&app.totals());
        }
        Command::Sync(cmd) => sync(app, cmd).await?,
        Command::Run => run(app).await?,
        Command::Ask { question } => {
            let question = if question.is_empty() {
                INSIGHTS_QUESTION.to_string()
            } else {
                question.join(" ")
            };
            let history: Vec<ChatTurn> = Vec::new();
            println!("{}", app.ask(&history, &question).await);
        }
    }
    Ok(())
}

fn date_or_today(date: Option<String>) -> String {
    date.unwrap_or_else(|| IsoDate::today().to_string())
}

fn greenhouse_filter(number: Option<u8>) -> Result<Option<GreenhouseNumber>> {
    number
        .map(GreenhouseNumber::new)
        .transpose()
        .context("Invalid greenhouse")
}

fn remove<T: FarmRecord>(app: &FarmApp, id: &str) -> Result<()> {
    if app.remove::<T>(&RecordId::from(id))? {
        println!("Removed {id}.");
    } else {
        println!("No record {id}.");
    }
    Ok(())
}

fn report_update(updated: bool, id: &RecordId) {
    if updated {
        println!("Updated {id}.");
    } else {
        println!("No record {id}.");
    }
}

fn harvest(app: &FarmApp, cmd: HarvestCommand) -> Result<()> {
    match cmd {
        HarvestCommand::Add { date, greenhouse, vegetable, other, weight } => {
            let form = HarvestForm {
                date: date_or_today(date),
                greenhouse,
                vegetable,
                other_vegetable: other,
                weight,
            };
            let record = app.add(form.validate()?)?;
            println!("Added harvest {}.", record.id);
        }
        HarvestCommand::List { list, greenhouse } => {
            let in_greenhouse =
                greenhouse_filter(greenhouse)?.map(filters::in_greenhouse::<HarvestRecord>);
            let in_period = filters::in_period::<HarvestRecord>(list.period);
            let records = app.list(|h: &HarvestRecord| {
                in_period(h) && in_greenhouse.as_ref().is_none_or(|f| f(h))
            });
            for h in &records {
                println!(
                    "{}  {}  GH{}  {:<12} {:>8.2} kg",
                    h.id, h.date, h.greenhouse_number, h.variety(), h.weight
                );
            }
            println!("{} record(s)", records.len());
        }
        HarvestCommand::Update { id, date, vegetable, other, weight } => {
            let patch = HarvestPatch {
                date: date.map(|d| parse_date("date", &d)).transpose()?,
                vegetable_type: vegetable,
                other_vegetable: other,
                weight: weight.map(|w| parse_quantity("weight", &w)).transpose()?,
                ..HarvestPatch::default()
            };
            let id = RecordId::from(id);
            report_update(app.update::<HarvestRecord>(&id, patch)?, &id);
        }
        HarvestCommand::Remove { id } => remove::<HarvestRecord>(app, &id)?,
    }
    Ok(())
}

fn work(app: &FarmApp, cmd: WorkCommand) -> Result<()> {
    match cmd {
        WorkCommand::Add { date, greenhouse, task, other, hours } => {
            let form = WorkForm {
                date: date_or_today(date),
                greenhouse,
                task,
                other_task: other,
                hours,
            };
            let record = app.add(form.validate()?)?;
            println!("Added work record {}.", record.id);
        }
        WorkCommand::List { list, greenhouse } => {
            let in_greenhouse =
                greenhouse_filter(greenhouse)?.map(filters::in_greenhouse::<WorkRecord>);
            let in_period = filters::in_period::<WorkRecord>(list.period);
            let records = app.list(|w: &WorkRecord| {
                in_period(w) && in_greenhouse.as_ref().is_none_or(|f| f(w))
            });
            for w in &records {
                println!(
                    "{}  {}  GH{}  {:<12} {:>6.2} h",
                    w.id, w.date, w.greenhouse_number, w.task_name(), w.hours_worked
                );
            }
            println!("{} record(s)", records.len());
        }
        WorkCommand::Remove { id } => remove::<WorkRecord>(app, &id)?,
    }
    Ok(())
}

fn order(app: &FarmApp, cmd: OrderCommand) -> Result<()> {
    match cmd {
        OrderCommand::Add { date, vegetable, other, weight, price, status, payment } => {
            let form = OrderForm {
                date: date_or_today(date),
                vegetable,
                other_vegetable: other,
                weight,
                price,
                order_status: status,
                payment_status: payment,
            };
            let record = app.add(form.validate()?)?;
            println!("Added order {} (Rs. {:.2}).", record.id, record.revenue());
        }
        OrderCommand::List { list } => {
            let records = app.list(filters::in_period::<Order>(list.period));
            for o in &records {
                println!(
                    "{}  {}  {:<12} {:>8.2} kg @ {:>7.2}  = {:>10.2}  {} / {}",
                    o.id,
                    o.date,
                    o.variety(),
                    o.weight,
                    o.price,
                    o.revenue(),
                    o.order_status,
                    o.payment_status
                );
            }
            println!("{} order(s)", records.len());
        }
        OrderCommand::Update { id, vegetable, other, weight, price, status, payment } => {
            let patch = OrderPatch {
                vegetable_type: vegetable,
                other_vegetable: other,
                weight: weight.map(|w| parse_quantity("weight", &w)).transpose()?,
                price: price.map(|p| parse_quantity("price", &p)).transpose()?,
                order_status: status,
                payment_status: payment,
                ..OrderPatch::default()
            };
            let id = RecordId::from(id);
            report_update(app.update::<Order>(&id, patch)?, &id);
        }
        OrderCommand::Remove { id } => remove::<Order>(app, &id)?,
    }
    Ok(())
}

fn expense(app: &FarmApp, cmd: ExpenseCommand) -> Result<()> {
    match cmd {
        ExpenseCommand::Add { date, category, other, description, amount } => {
            let form = ExpenseForm {
                date: date_or_today(date),
                category,
                other_category: other,
                description,
                amount,
            };
            let record = app.add(form.validate()?)?;
            println!("Added expense {}.", record.id);
        }
        ExpenseCommand::List { list } => {
            let records = app.list(filters::in_period::<ExpenseRecord>(list.period));
            for e in &records {
                println!(
                    "{}  {}  {:<12} {:>10.2}  {}",
                    e.id, e.date, e.category_name(), e.amount, e.description
                );
            }
            println!("{} expense(s)", records.len());
        }
        ExpenseCommand::Remove { id } => remove::<ExpenseRecord>(app, &id)?,
    }
    Ok(())
}

async fn sync(app: &mut FarmApp, cmd: SyncCommand) -> Result<()> {
    match cmd {
        SyncCommand::Now => {
            let at = app.sync_now().await.context("Sync failed")?;
            println!("Synced at {at}.");
        }
        SyncCommand::Status => {
            let config = app.sync_config();
            println!("Endpoint:  {}", config.endpoint().unwrap_or("(none)"));
            match config.last_sync {
                Some(at) => println!("Last sync: {at}"),
                None => println!("Last sync: never"),
            }
        }
        SyncCommand::Endpoint { url, clear } => {
            if !clear && url.is_none() {
                bail!("Give an endpoint URL or --clear");
            }
            let config = app.set_endpoint(url.as_deref()).await?;
            println!("Endpoint:  {}", config.endpoint().unwrap_or("(none)"));
        }
    }
    Ok(())
}

async fn run(app: &mut FarmApp) -> Result<()> {
    if !app.resume_session() {
        bail!("Replication is not configured. Set an endpoint with `farmdesk sync endpoint <URL>`.");
    }
    let Some(mut outcomes) = app.replication_outcomes() else {
        bail!("Replication scheduler did not start");
    };
    info!("replicating until interrupted");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = outcomes.changed() => {
                if changed.is_err() {
                    break;
                }
                let outcome = outcomes.borrow_and_update().clone();
                match outcome {
                    Some(CheckOutcome::Replicated { at }) => println!("Synced at {at}."),
                    Some(CheckOutcome::Failed { reason }) => println!("Sync failed: {reason}"),
                    Some(CheckOutcome::NotDue { next_due: Some(next) }) => {
                        println!("Up to date; next sync due {next}.")
                    }
                    Some(CheckOutcome::NotDue { next_due: None }) | None => {}
                    Some(CheckOutcome::Disabled) => println!("Replication disabled."),
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &PeriodReport) {
    println!("Report for {}", report.period);
    println!("  Orders:    {}", report.order_count);
    println!("  Revenue:   Rs. {:.2}", report.total_revenue);
    println!("  Expenses:  Rs. {:.2} ({} entries)", report.total_expenses, report.expense_count);
    println!("  Net:       Rs. {:.2}", report.net_profit);
    if !report.revenue_by_variety.is_empty() {
        println!("  Revenue by variety:");
        for entry in &report.revenue_by_variety {
            println!("    {:<14} Rs. {:.2}", entry.name, entry.value);
        }
    }
    if !report.expenses_by_category.is_empty() {
        println!("  Expenses by category:");
        for entry in &report.expenses_by_category {
            println!("    {:<14} Rs. {:.2}", entry.name, entry.value);
        }
    }
}

fn print_totals(totals: &FarmTotals) {
    println!("All time");
    println!("  Harvest:   {:.2} kg", totals.total_harvest_kg);
    println!("  Labour:    {:.2} h", totals.total_work_hours);
    println!("  Net:       Rs. {:.2}", totals.net_profit);
}
