use crate::config::QuadernoConfig;
use crate::error::{QuadernoError, Result};
use crate::ledger::ConsumeResult;
use crate::model::{
    CompanyProfile, FertilizationRecord, MovementRecord, Scope, StockLine, TreatmentRecord,
};
use std::path::PathBuf;

pub mod applications;
pub mod company;
pub mod config;
pub mod consume;
pub mod doctor;
pub mod export;
pub mod helpers;
pub mod init;
pub mod movements;
pub mod returns;
pub mod stock;

#[derive(Debug, Clone)]
pub struct QuadernoPaths {
    pub project: Option<PathBuf>,
    pub global: PathBuf,
}

impl QuadernoPaths {
    pub fn scope_dir(&self, scope: Scope) -> Result<PathBuf> {
        match scope {
            Scope::Project => self
                .project
                .clone()
                .ok_or_else(|| QuadernoError::Store("Project scope is not available".to_string())),
            Scope::Global => Ok(self.global.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub stock_lines: Vec<StockLine>,
    pub movements: Vec<MovementRecord>,
    pub treatments: Vec<TreatmentRecord>,
    pub fertilizations: Vec<FertilizationRecord>,
    pub company: Option<CompanyProfile>,
    pub consumption: Option<ConsumeResult>,
    pub config: Option<QuadernoConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn extend_messages(&mut self, messages: impl IntoIterator<Item = CmdMessage>) {
        self.messages.extend(messages);
    }

    pub fn with_stock_lines(mut self, lines: Vec<StockLine>) -> Self {
        self.stock_lines = lines;
        self
    }

    pub fn with_movements(mut self, movements: Vec<MovementRecord>) -> Self {
        self.movements = movements;
        self
    }

    pub fn with_treatments(mut self, treatments: Vec<TreatmentRecord>) -> Self {
        self.treatments = treatments;
        self
    }

    pub fn with_fertilizations(mut self, fertilizations: Vec<FertilizationRecord>) -> Self {
        self.fertilizations = fertilizations;
        self
    }

    pub fn with_company(mut self, company: CompanyProfile) -> Self {
        self.company = Some(company);
        self
    }

    pub fn with_consumption(mut self, consumption: ConsumeResult) -> Self {
        self.consumption = Some(consumption);
        self
    }

    pub fn with_config(mut self, config: QuadernoConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning)
    }
}
