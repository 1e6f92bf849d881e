use crate::commands::helpers::take_loaded;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{CompanyUpdate, Scope};
use crate::store::{Collection, DataStore, LoadState};

pub fn show<S: DataStore>(store: &S, scope: Scope) -> Result<CmdResult> {
    let loaded = store.load_company(scope)?;
    let missing = loaded.state == LoadState::Missing;

    let mut warnings = Vec::new();
    let profile = take_loaded(loaded, Collection::Company, &mut warnings);

    let mut result = CmdResult::default();
    result.extend_messages(warnings);
    if missing {
        result.add_message(CmdMessage::info("No company profile saved yet."));
    }
    Ok(result.with_company(profile))
}

/// Merge the given fields over the stored profile.
pub fn set<S: DataStore>(store: &mut S, scope: Scope, update: CompanyUpdate) -> Result<CmdResult> {
    let mut warnings = Vec::new();
    let mut profile = take_loaded(store.load_company(scope)?, Collection::Company, &mut warnings);
    profile.apply(update);
    store.save_company(scope, &profile)?;

    let mut result = CmdResult::default();
    result.extend_messages(warnings);
    result.add_message(CmdMessage::success("Company profile saved."));
    Ok(result.with_company(profile))
}
