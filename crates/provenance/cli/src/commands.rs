//! Query commands

use clap::Subcommand;
use colored::*;
use provenance_gateway::{LedgerGateway, NetworkConfig};
use provenance_lifecycle::{ProvenanceService, TimelineOptions, Verification};
use provenance_types::{parse_address, ProductDetails, ProductId, Role, RoleSet};

use crate::error::CliResult;
use crate::output::{
    format_address, format_timestamp, print_json, print_success, print_table, print_warning,
    ClaimRow, EventRow, ProductRow,
};

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the lifecycle timeline of a product
    Timeline {
        /// Product ID
        product_id: u64,

        /// Only registration and transfers
        #[arg(long)]
        ownership: bool,

        /// Include warranty activation events
        #[arg(long)]
        activation: bool,
    },

    /// List the products an address holds now
    Holdings {
        /// Owner address
        address: String,
    },

    /// Show the roles granted to an address
    Roles {
        /// Account address
        address: String,
    },

    /// Verify a product by ID or serial number
    Verify {
        /// Product ID or serial number
        query: String,
    },

    /// List submitted warranty claims
    Claims,

    /// Show the stored details of a product
    Product {
        /// Product ID
        product_id: u64,
    },
}

/// Execute a query command
pub async fn execute<G: LedgerGateway>(
    command: Commands,
    service: &ProvenanceService<G>,
    network: &NetworkConfig,
    json: bool,
) -> CliResult<()> {
    match command {
        Commands::Timeline {
            product_id,
            ownership,
            activation,
        } => {
            let mut options = if ownership {
                TimelineOptions::ownership()
            } else {
                service.options()
            };
            options.include_warranty_activation |= activation;

            let scoped = ProvenanceService::with_options(service.client().clone(), options);
            let timeline = scoped.reconstruct_timeline(ProductId(product_id)).await?;

            if json {
                return print_json(&timeline);
            }
            println!("Product #{}", product_id.to_string().bold());
            print_table(
                timeline.iter().map(EventRow::from).collect(),
                "No lifecycle events recorded",
            );
            Ok(())
        }

        Commands::Holdings { address } => {
            let owner = parse_address(&address)?;
            let holdings = service.resolve_holdings(owner).await?;

            if json {
                return print_json(&holdings);
            }
            println!("Holdings of {}", owner.to_checksum(None));
            print_table(
                holdings.products.iter().map(ProductRow::from).collect(),
                "No products held",
            );
            Ok(())
        }

        Commands::Roles { address } => {
            let account = parse_address(&address)?;
            let roles = service.resolve_roles(account).await;

            if json {
                return print_json(&roles);
            }
            print_roles(&roles);
            Ok(())
        }

        Commands::Verify { query } => {
            let verification = service.verify(&query).await?;

            if json {
                return print_json(&verification);
            }
            match verification {
                Verification::NotFound => {
                    print_warning(&format!("No product matches '{query}'"));
                }
                Verification::Found(report) => {
                    print_success(&format!("Product #{} is registered", report.product_id));
                    print_details(&report.details);
                    println!("Holder:       {}", format_address(report.current_holder));
                    if let Some(holder) = report.current_holder {
                        if let Some(url) = network.address_url(&holder.to_checksum(None)) {
                            println!("Explorer:     {}", url.dimmed());
                        }
                    }
                    match report.warranty_remaining {
                        Some(remaining) if remaining.expired => {
                            println!("Warranty:     {}", "expired".red())
                        }
                        Some(remaining) => println!(
                            "Warranty:     {}",
                            format!("{} days left", remaining.days).green()
                        ),
                        None => println!("Warranty:     {}", "not activated".dimmed()),
                    }
                    println!();
                    print_table(
                        report.timeline.iter().map(EventRow::from).collect(),
                        "No lifecycle events indexed yet",
                    );
                }
            }
            Ok(())
        }

        Commands::Claims => {
            let claims = service.list_claims().await?;

            if json {
                return print_json(&claims);
            }
            print_table(
                claims.iter().map(ClaimRow::from).collect(),
                "No warranty claims submitted",
            );
            Ok(())
        }

        Commands::Product { product_id } => {
            let details = service.product_details(ProductId(product_id)).await?;

            if json {
                return print_json(&details);
            }
            match details {
                Some(details) => print_details(&details),
                None => print_warning(&format!("Product #{product_id} does not exist")),
            }
            Ok(())
        }
    }
}

fn print_details(details: &ProductDetails) {
    println!("Serial:       {}", details.serial_number);
    println!("Model:        {}", details.model);
    println!("Manufacturer: {}", format_address(Some(details.manufacturer)));
    println!("Made:         {}", format_timestamp(details.manufactured_at));
    println!(
        "Claims:       {} of {} used",
        details.claim_count, details.claim_limit
    );
}

fn print_roles(roles: &RoleSet) {
    for role in Role::ALL {
        let mark = if roles.has(role) {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}", mark, role);
    }
}
