//! Command dispatch: bridges CLI args -> core stores -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod resource;
pub mod util;
pub mod views;

use ridebook_core::api::resources::{
    Affiliates, Commissions, Companies, Pages, Partners, Payments, Payouts, RideRequests, Routes,
    Users, Vehicles,
};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Affiliates(args) => resource::handle::<Affiliates>(args, resolved, global).await,
        Command::Commissions(args) => resource::handle::<Commissions>(args, resolved, global).await,
        Command::Payouts(args) => resource::handle::<Payouts>(args, resolved, global).await,
        Command::Requests(args) => resource::handle::<RideRequests>(args, resolved, global).await,
        Command::Companies(args) => resource::handle::<Companies>(args, resolved, global).await,
        Command::Users(args) => resource::handle::<Users>(args, resolved, global).await,
        Command::Vehicles(args) => resource::handle::<Vehicles>(args, resolved, global).await,
        Command::Routes(args) => resource::handle::<Routes>(args, resolved, global).await,
        Command::Payments(args) => resource::handle::<Payments>(args, resolved, global).await,
        Command::Partners(args) => resource::handle::<Partners>(args, resolved, global).await,
        Command::Pages(args) => resource::handle::<Pages>(args, resolved, global).await,
        Command::Dashboard => dashboard::handle(resolved, global).await,
        Command::Auth(args) => auth::handle(args, resolved, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
