use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

use commands::{load_policies, load_request, print_json};

#[derive(Parser)]
#[command(name = "cvg")]
#[command(about = "Coverage & payment period reconciliation", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> site -> operator)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    /// Fail on config keys nothing reads instead of warning
    #[arg(long, global = true, default_value_t = false)]
    strict_config: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(clap::Args)]
struct InputArgs {
    /// Request JSON path, or `-` for stdin
    #[arg(long, short)]
    input: String,

    /// Reference date override (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate missing periods and report gaps, alerts and totals
    Reconcile(InputArgs),

    /// Coverage validity verdict per bond
    Validate(InputArgs),

    /// Uncovered days between and around the request's periods
    Scan(InputArgs),

    /// Renewal, device-return and follow-up alerts
    Alerts(InputArgs),

    /// Pre-approval, expiring-coverage and payment gaps
    Gaps(InputArgs),

    /// Consistency issues in the request's periods
    Audit(InputArgs),

    /// Deduplicate the request's periods
    Dedupe(InputArgs),

    /// Financial totals and per-period summary
    Aggregate(InputArgs),

    /// Chronological rental events
    Timeline(InputArgs),

    /// Gap periods before and after each bond's coverage window
    BondGaps(InputArgs),

    /// Bill one of the gaps reported by `gaps` as a gap period
    BillGap {
        #[command(flatten)]
        input: InputArgs,

        /// Position in the `gaps` output (0-based)
        #[arg(long)]
        index: usize,
    },

    /// Gap periods priced away from the co-payment rule
    GapAmounts {
        #[command(flatten)]
        input: InputArgs,

        /// Equipment monthly rental price
        #[arg(long)]
        monthly_price: cvg_schemas::Micros,
    },

    /// Draft a renewal for one bond
    Renew {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long)]
        bond_id: String,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let load = |args: &InputArgs| load_request(&args.input, args.today);

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = cvg_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Reconcile(args) => {
            let policies = load_policies(&cli.config_paths, cli.strict_config)?;
            let req = load(&args)?;
            print_json(&commands::reconcile::run_reconcile(&req, &policies))?;
        }

        Commands::Validate(args) => {
            let req = load(&args)?;
            print_json(&commands::views::validate_bonds(&req))?;
        }

        Commands::Scan(args) => {
            let req = load(&args)?;
            print_json(&commands::views::scan_view(&req))?;
        }

        Commands::Alerts(args) => {
            let policies = load_policies(&cli.config_paths, cli.strict_config)?;
            let req = load(&args)?;
            print_json(&cvg_coverage::alerts_with_context(
                &policies.alerts,
                &req.bonds,
                &req.timeline,
                &req.alert_context,
                req.today,
            ))?;
        }

        Commands::Gaps(args) => {
            let policies = load_policies(&cli.config_paths, cli.strict_config)?;
            let req = load(&args)?;
            print_json(&cvg_reconcile::analyze_gaps(
                &req.bonds,
                &req.timeline,
                &req.periods,
                &req.alert_context,
                &policies.alerts,
                req.today,
            ))?;
        }

        Commands::Audit(args) => {
            let req = load(&args)?;
            print_json(&cvg_reconcile::audit_periods(
                &req.periods,
                Some(req.timeline.effective_start_date),
                req.timeline.end_date,
            ))?;
        }

        Commands::Dedupe(args) => {
            let req = load(&args)?;
            print_json(&commands::views::dedupe_view(&req))?;
        }

        Commands::Aggregate(args) => {
            let req = load(&args)?;
            print_json(&commands::views::aggregate_view(&req))?;
        }

        Commands::Timeline(args) => {
            let req = load(&args)?;
            print_json(&cvg_reconcile::build_timeline(
                &req.timeline,
                &req.bonds,
                &req.periods,
                req.today,
            ))?;
        }

        Commands::BondGaps(args) => {
            let req = load(&args)?;
            print_json(&cvg_reconcile::bond_boundary_gaps(
                &req.bonds,
                &req.timeline,
                &req.periods,
            ))?;
        }

        Commands::BillGap { input, index } => {
            let policies = load_policies(&cli.config_paths, cli.strict_config)?;
            let req = load(&input)?;
            print_json(&commands::views::bill_gap(&req, &policies, index)?)?;
        }

        Commands::GapAmounts { input, monthly_price } => {
            let policies = load_policies(&cli.config_paths, cli.strict_config)?;
            let req = load(&input)?;
            print_json(&cvg_finance::audit_gap_amounts(
                &policies.gap_audit,
                &req.periods,
                monthly_price,
                &req.bonds,
            ))?;
        }

        Commands::Renew { input, bond_id } => {
            let req = load(&input)?;
            print_json(&commands::views::renewal_draft(&req, &bond_id)?)?;
        }
    }

    Ok(())
}
