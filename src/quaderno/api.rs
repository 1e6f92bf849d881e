//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It serves as the single
//! entry point for all logbook operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (blank operators and units fall back to [`QuadernoConfig`])
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never prints and never exits; that is the CLI's job.
//!
//! ## Generic Over DataStore
//!
//! `QuadernoApi<S: DataStore>` is generic over the storage backend:
//! - Production: `QuadernoApi<FileStore>`
//! - Testing: `QuadernoApi<InMemoryStore>`

use crate::commands;
use crate::commands::config::ConfigAction;
use crate::commands::movements::MovementFilter;
use crate::commands::stock::{RelabelRequest, StockEntry};
use crate::config::QuadernoConfig;
use crate::error::Result;
use crate::ledger::{ConsumeRequest, ReturnRequest};
use crate::model::{CompanyUpdate, FertilizationRecord, Scope, TreatmentRecord, UpsertMode};
use crate::store::DataStore;
use std::path::Path;

/// The main API facade for logbook operations.
pub struct QuadernoApi<S: DataStore> {
    store: S,
    paths: commands::QuadernoPaths,
    config: QuadernoConfig,
}

impl<S: DataStore> QuadernoApi<S> {
    pub fn new(store: S, paths: commands::QuadernoPaths, config: QuadernoConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn config(&self) -> &QuadernoConfig {
        &self.config
    }

    pub fn paths(&self) -> &commands::QuadernoPaths {
        &self.paths
    }

    // --- Warehouse ---

    pub fn stock_add(&mut self, scope: Scope, entry: StockEntry) -> Result<commands::CmdResult> {
        commands::stock::upsert(
            &mut self.store,
            scope,
            &self.config,
            entry,
            UpsertMode::AddToExisting,
        )
    }

    pub fn stock_set(&mut self, scope: Scope, entry: StockEntry) -> Result<commands::CmdResult> {
        commands::stock::upsert(
            &mut self.store,
            scope,
            &self.config,
            entry,
            UpsertMode::ReplaceExisting,
        )
    }

    pub fn stock_list(&self, scope: Scope, filter: Option<&str>) -> Result<commands::CmdResult> {
        commands::stock::list(&self.store, scope, filter)
    }

    pub fn stock_relabel(
        &mut self,
        scope: Scope,
        request: RelabelRequest,
    ) -> Result<commands::CmdResult> {
        commands::stock::relabel(&mut self.store, scope, &self.config, request)
    }

    pub fn consume(&mut self, scope: Scope, mut request: ConsumeRequest) -> Result<commands::CmdResult> {
        request.operator = self.config.operator_or_default(&request.operator);
        commands::consume::run(&mut self.store, scope, request)
    }

    pub fn return_stock(&mut self, scope: Scope, request: ReturnRequest) -> Result<commands::CmdResult> {
        commands::returns::run(&mut self.store, scope, &self.config, request)
    }

    pub fn movements(&self, scope: Scope, filter: &MovementFilter) -> Result<commands::CmdResult> {
        commands::movements::run(&self.store, scope, filter)
    }

    // --- Field applications ---

    pub fn add_treatment(
        &mut self,
        scope: Scope,
        record: TreatmentRecord,
    ) -> Result<commands::CmdResult> {
        commands::applications::add(&mut self.store, scope, &self.config, record)
    }

    pub fn list_treatments(&self, scope: Scope) -> Result<commands::CmdResult> {
        commands::applications::list::<TreatmentRecord, _>(&self.store, scope)
    }

    pub fn add_fertilization(
        &mut self,
        scope: Scope,
        record: FertilizationRecord,
    ) -> Result<commands::CmdResult> {
        commands::applications::add(&mut self.store, scope, &self.config, record)
    }

    pub fn list_fertilizations(&self, scope: Scope) -> Result<commands::CmdResult> {
        commands::applications::list::<FertilizationRecord, _>(&self.store, scope)
    }

    // --- Company ---

    pub fn company_show(&self, scope: Scope) -> Result<commands::CmdResult> {
        commands::company::show(&self.store, scope)
    }

    pub fn company_set(&mut self, scope: Scope, update: CompanyUpdate) -> Result<commands::CmdResult> {
        commands::company::set(&mut self.store, scope, update)
    }

    // --- Maintenance ---

    pub fn export(&self, scope: Scope, out_dir: &Path) -> Result<commands::CmdResult> {
        let config_dir = self.paths.scope_dir(scope).ok();
        commands::export::run(&self.store, scope, config_dir.as_deref(), out_dir)
    }

    pub fn doctor(&self, scope: Scope) -> Result<commands::CmdResult> {
        commands::doctor::run(&self.store, scope)
    }

    pub fn init(&self, scope: Scope) -> Result<commands::CmdResult> {
        commands::init::run(&self.paths, scope)
    }

    pub fn config_action(&mut self, scope: Scope, action: ConfigAction) -> Result<commands::CmdResult> {
        let result = commands::config::run(&self.paths, scope, action)?;
        if let Some(updated) = &result.config {
            self.config = updated.clone();
        }
        Ok(result)
    }
}
