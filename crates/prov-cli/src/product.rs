//! # Product Subcommand
//!
//! Product custody operations against the session ledger. Farmer and
//! product details are passed as JSON strings, exactly as the contract
//! receives them.

use anyhow::Result;
use clap::{Args, Subcommand};

use prov_contracts::ProductRecord;

use crate::session::{print_json, Session};

/// Arguments for the `prov product` subcommand.
#[derive(Args, Debug)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

/// Product subcommands.
#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Register a product (ACTIVE) with the farmer as first custodian.
    Register {
        #[arg(long)]
        id: String,
        /// Farmer details JSON: `{"name":..,"location":..}`.
        #[arg(long)]
        farmer: String,
        /// Product details JSON: `{"productType":..,"batchSize":..,"harvestDate":..}`.
        #[arg(long)]
        details: String,
    },

    /// Hand an ACTIVE product to a new custodian.
    Transfer {
        #[arg(long)]
        id: String,
        /// New custodian role, e.g. Distributor.
        #[arg(long)]
        role: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        handling_info: String,
    },

    /// Sell an ACTIVE product to the final consumer (ACTIVE → COMPLETED).
    Complete {
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "")]
        consumer_info: String,
    },

    /// Show a product with its full custody chain.
    History {
        #[arg(long)]
        id: String,
    },

    /// List every product on the ledger.
    List,

    /// Report whether the product exists.
    Exists {
        #[arg(long)]
        id: String,
    },
}

/// Execute the product subcommand.
pub fn run_product(args: &ProductArgs, session: &Session) -> Result<u8> {
    match &args.command {
        ProductCommand::Register {
            id,
            farmer,
            details,
        } => print_json(&cmd_register(session, id, farmer, details)?)?,
        ProductCommand::Transfer {
            id,
            role,
            name,
            location,
            handling_info,
        } => print_json(&cmd_transfer(session, id, role, name, location, handling_info)?)?,
        ProductCommand::Complete { id, consumer_info } => {
            print_json(&cmd_complete(session, id, consumer_info)?)?
        }
        ProductCommand::History { id } => print_json(&cmd_history(session, id)?)?,
        ProductCommand::List => print_json(&cmd_list(session)?)?,
        ProductCommand::Exists { id } => {
            let exists = session.evaluate(|cc, ctx| cc.products().product_exists(ctx, id))?;
            print_json(&exists)?
        }
    }
    Ok(0)
}

fn cmd_register(session: &Session, id: &str, farmer: &str, details: &str) -> Result<ProductRecord> {
    session.submit(|cc, ctx| cc.products().register_product(ctx, id, farmer, details))
}

fn cmd_transfer(
    session: &Session,
    id: &str,
    role: &str,
    name: &str,
    location: &str,
    handling_info: &str,
) -> Result<ProductRecord> {
    session.submit(|cc, ctx| {
        cc.products()
            .transfer_ownership(ctx, id, role, name, location, handling_info)
    })
}

fn cmd_complete(session: &Session, id: &str, consumer_info: &str) -> Result<ProductRecord> {
    session.submit(|cc, ctx| cc.products().complete_product(ctx, id, consumer_info))
}

fn cmd_history(session: &Session, id: &str) -> Result<ProductRecord> {
    session.evaluate(|cc, ctx| cc.products().get_product_history(ctx, id))
}

fn cmd_list(session: &Session) -> Result<Vec<ProductRecord>> {
    session.evaluate(|cc, ctx| cc.products().get_all_products(ctx))
}
