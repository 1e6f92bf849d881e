//! # CLI Layer
//!
//! This module is **one possible UI client** for the logbook. It is the only
//! place that parses arguments, touches stdout/stderr and picks exit codes.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `handle_*()`: Per-command handlers that call the API and print the result
//! - [`print`]: Output formatting
//! - [`setup`]: clap definitions

mod print;
pub mod setup;

use clap::Parser;
use print::{
    print_applications, print_company, print_config, print_messages, print_movements, print_stock,
};
use quaderno::api::QuadernoApi;
use quaderno::commands::config::ConfigAction;
use quaderno::commands::movements::MovementFilter;
use quaderno::commands::stock::{RelabelRequest, StockEntry};
use quaderno::commands::CmdResult;
use quaderno::error::Result;
use quaderno::init::initialize;
use quaderno::ledger::{ConsumeRequest, ReturnRequest};
use quaderno::model::{
    CompanyUpdate, FertilizationRecord, ReturnDirection, Scope, TreatmentRecord,
};
use quaderno::store::fs::FileStore;
use setup::{
    ApplicationArgs, ApplicationCommands, Cli, Commands, CompanyCommands, StockArgs, StockCommands,
};
use std::path::PathBuf;

struct AppContext {
    api: QuadernoApi<FileStore>,
    scope: Scope,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    quaderno::logging::init(cli.verbose);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let context = initialize(&cwd, cli.global);
    let mut ctx = AppContext {
        api: context.api,
        scope: context.scope,
    };

    match cli.command {
        Commands::Stock(cmd) => handle_stock(&mut ctx, cmd),
        Commands::Consume {
            product,
            quantity,
            unit,
            lot,
            entry,
        } => {
            let mut request = ConsumeRequest::new(product, quantity, entry.date_or_today())
                .with_operator(entry.operator)
                .with_note(entry.note);
            request.unit = unit;
            request.lot = lot;
            let result = ctx.api.consume(ctx.scope, request)?;
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Treatment(cmd) => handle_treatment(&mut ctx, cmd),
        Commands::Fertilization(cmd) => handle_fertilization(&mut ctx, cmd),
        Commands::Return {
            product,
            quantity,
            lot,
            unit,
            out,
            entry,
        } => {
            let request = ReturnRequest {
                product_name: product,
                lot,
                unit: unit.unwrap_or_default(),
                quantity,
                date: entry.date_or_today(),
                operator: entry.operator,
                note: entry.note,
                direction: if out {
                    ReturnDirection::OutOfStock
                } else {
                    ReturnDirection::IntoStock
                },
            };
            let result = ctx.api.return_stock(ctx.scope, request)?;
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Movements { product, since } => {
            let filter = MovementFilter { product, since };
            let result = ctx.api.movements(ctx.scope, &filter)?;
            print_movements(&result.movements);
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Company(cmd) => handle_company(&mut ctx, cmd),
        Commands::Export { out } => {
            let result = ctx.api.export(ctx.scope, &out)?;
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Doctor => {
            let result = ctx.api.doctor(ctx.scope)?;
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Init => {
            let result = ctx.api.init(ctx.scope)?;
            print_messages(&result.messages);
            Ok(())
        }
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
    }
}

fn stock_entry(args: StockArgs) -> StockEntry {
    StockEntry {
        product_name: args.product,
        lot: args.lot,
        unit: args.unit,
        quantity: args.quantity,
        unit_cost: args.cost,
    }
}

fn handle_stock(ctx: &mut AppContext, cmd: StockCommands) -> Result<()> {
    let result = match cmd {
        StockCommands::Add(args) => ctx.api.stock_add(ctx.scope, stock_entry(args))?,
        StockCommands::Set(args) => ctx.api.stock_set(ctx.scope, stock_entry(args))?,
        StockCommands::List { filter } => {
            let result = ctx.api.stock_list(ctx.scope, filter.as_deref())?;
            print_stock(&result.stock_lines);
            result
        }
        StockCommands::Relabel {
            product,
            lot,
            unit,
            new_lot,
            new_unit,
        } => ctx.api.stock_relabel(
            ctx.scope,
            RelabelRequest {
                product_name: product,
                lot,
                unit,
                new_lot,
                new_unit,
            },
        )?,
    };
    print_messages(&result.messages);
    Ok(())
}

macro_rules! application_record {
    ($ty:ident, $args:expr) => {{
        let args: ApplicationArgs = $args;
        $ty {
            date: args.entry.date_or_today(),
            field: args.field,
            product_name: args.product,
            dose_per_hectare: args.dose,
            hectares: args.hectares,
            operator: args.entry.operator,
            note: args.entry.note,
            lot: args.lot,
            unit: args.unit,
        }
    }};
}

fn handle_treatment(ctx: &mut AppContext, cmd: ApplicationCommands) -> Result<()> {
    let result: CmdResult = match cmd {
        ApplicationCommands::Add(args) => {
            let record = application_record!(TreatmentRecord, args);
            ctx.api.add_treatment(ctx.scope, record)?
        }
        ApplicationCommands::List => {
            let result = ctx.api.list_treatments(ctx.scope)?;
            print_applications(&result.treatments, "L/ha");
            result
        }
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_fertilization(ctx: &mut AppContext, cmd: ApplicationCommands) -> Result<()> {
    let result: CmdResult = match cmd {
        ApplicationCommands::Add(args) => {
            let record = application_record!(FertilizationRecord, args);
            ctx.api.add_fertilization(ctx.scope, record)?
        }
        ApplicationCommands::List => {
            let result = ctx.api.list_fertilizations(ctx.scope)?;
            print_applications(&result.fertilizations, "kg/ha");
            result
        }
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_company(ctx: &mut AppContext, cmd: CompanyCommands) -> Result<()> {
    let result = match cmd {
        CompanyCommands::Show => ctx.api.company_show(ctx.scope)?,
        CompanyCommands::Set {
            name,
            vat,
            address,
            phone,
            email,
        } => ctx.api.company_set(
            ctx.scope,
            CompanyUpdate {
                ragione_sociale: name,
                piva: vat,
                indirizzo: address,
                telefono: phone,
                email,
            },
        )?,
    };
    if let Some(profile) = &result.company {
        print_company(profile);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = ctx.api.config_action(ctx.scope, action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}
