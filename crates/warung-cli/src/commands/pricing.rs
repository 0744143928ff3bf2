//! Pricing command - recommendations from the recorded sales history.

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use warung_core::pricing;
use warung_core::{ChatClient, Store};

/// Arguments for the pricing command.
#[derive(Args)]
pub struct PricingArgs {
    /// Recommend for a single item (case-insensitive); all items if omitted
    item: Option<String>,

    /// Scope to one user id
    #[arg(short, long)]
    user: Option<String>,

    /// Target profit margin percentage (default from configuration)
    #[arg(short, long)]
    margin: Option<Decimal>,
}

pub async fn run(args: PricingArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    config.validate()?;

    let store = Store::open(&config.store.db_path)?;
    let ai = ChatClient::new(config.ai.clone())?;

    let target_margin = args.margin.unwrap_or(config.pricing.target_margin);
    let profit_rate = config.pricing.profit_rate;

    let recommendations = match &args.item {
        Some(item) => {
            match pricing::recommendation_for(
                &ai,
                &store,
                item,
                args.user.as_deref(),
                target_margin,
                profit_rate,
            )
            .await?
            {
                Some(rec) => vec![rec],
                None => {
                    println!("No sales history for \"{item}\".");
                    return Ok(());
                }
            }
        }
        None => {
            pricing::recommendations(&ai, &store, args.user.as_deref(), target_margin, profit_rate)
                .await?
        }
    };

    if recommendations.is_empty() {
        println!("No recorded items yet.");
        return Ok(());
    }

    println!("{}", style("Pricing recommendations").bold());
    for rec in &recommendations {
        println!();
        println!(
            "  {}  Rp {} -> Rp {}  (target {}%)",
            style(&rec.item_name).green(),
            rec.current_price,
            rec.recommended_price,
            rec.expected_margin
        );
        println!("    {}", rec.reasoning);
    }

    Ok(())
}
