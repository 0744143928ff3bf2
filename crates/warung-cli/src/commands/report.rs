//! Report command - read-side analytics over recorded sales.
//!
//! Summary, top, and recent work offline against the local store and skip
//! provider-key validation; only the insights subcommand needs the AI
//! endpoint configured.

use clap::{Args, Subcommand};
use console::style;

use warung_core::ai::insights;
use warung_core::{ChatClient, Store};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Aggregate sales summary
    Summary {
        /// Scope to one user id
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Best-selling items by revenue
    Top {
        /// Scope to one user id
        #[arg(short, long)]
        user: Option<String>,

        /// Number of items to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Most recent recorded sales
    Recent {
        /// Scope to one user id
        #[arg(short, long)]
        user: Option<String>,

        /// Number of sales to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// AI market insights over the sales history
    Insights {
        /// Scope to one user id
        #[arg(short, long)]
        user: Option<String>,
    },
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = Store::open(&config.store.db_path)?;

    match args.command {
        ReportCommand::Summary { user } => {
            let summary = store.sales_summary(user.as_deref(), None, None)?;
            println!("{}", style("Sales summary").bold());
            println!("  Total sales:       Rp {}", summary.total_sales);
            println!("  Total profit:      Rp {}", summary.total_profit);
            println!("  Avg profit margin: {}%", summary.avg_profit_margin);
            println!("  Transactions:      {}", summary.transaction_count);
            println!("  Avg transaction:   Rp {}", summary.avg_transaction_value);
        }
        ReportCommand::Top { user, limit } => {
            let items = store.top_items(user.as_deref(), Some(limit), None, None)?;
            if items.is_empty() {
                println!("No recorded items yet.");
                return Ok(());
            }
            println!("{}", style("Top items").bold());
            for (i, item) in items.iter().enumerate() {
                println!(
                    "  {}. {} - {} units, Rp {} revenue, {} lines",
                    i + 1,
                    item.name,
                    item.total_qty,
                    item.total_revenue,
                    item.frequency
                );
            }
        }
        ReportCommand::Recent { user, limit } => {
            let sales = store.recent_sales(user.as_deref(), Some(limit))?;
            if sales.is_empty() {
                println!("No recorded sales yet.");
                return Ok(());
            }
            println!("{}", style("Recent sales").bold());
            for sale in &sales {
                println!(
                    "  {}  {} items  Rp {}  (profit Rp {})",
                    sale.created_at.format("%Y-%m-%d %H:%M"),
                    sale.item_count,
                    sale.total_amount,
                    sale.profit
                );
                for item in &sale.items {
                    println!("      {} x{}  Rp {}", item.name, item.qty, item.subtotal);
                }
            }
        }
        ReportCommand::Insights { user } => {
            config.validate()?;
            let ai = ChatClient::new(config.ai.clone())?;

            let summary = store.sales_summary(user.as_deref(), None, None)?;
            let top = store.top_items(user.as_deref(), Some(5), None, None)?;
            let text = insights::market_insights(&ai, &summary, &top).await?;

            println!("{}", style("Market insights").cyan().bold());
            println!("{text}");
        }
    }

    Ok(())
}
