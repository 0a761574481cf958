use accesswash_client::controller::AuthController;
use accesswash_shared::tenant::{TenantResolver, TenantSlug};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod account;
mod auth;
mod requests;

#[derive(Debug, Parser)]
#[command(name = "accesswash", about = "AccessWash customer portal CLI", version, long_about = None)]
pub(crate) struct Cli {
    /// Tenant slug; takes precedence over --host and --path
    #[arg(long, global = true, env = "ACCESSWASH_TENANT")]
    tenant: Option<String>,

    /// Portal hostname to resolve the tenant from (acme.accesswash.org)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Portal path to resolve the tenant from (/acme/dashboard)
    #[arg(long, global = true)]
    path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Login(auth::LoginArgs),
    Register(auth::RegisterArgs),
    Logout,
    /// Show the stored session for the tenant
    Status,
    /// Check whether a portal page may be shown
    Route(auth::RouteArgs),
    VerifyConnection(auth::VerifyConnectionArgs),
    ForgotPassword(auth::ForgotPasswordArgs),
    ResetPassword(auth::ResetPasswordArgs),
    ChangePassword(auth::ChangePasswordArgs),
    TenantInfo,
    Dashboard,
    Profile,
    UpdateProfile(account::UpdateProfileArgs),
    Sessions,
    Requests(requests::RequestsCommand),
}

impl Cli {
    /// Tenant named on the command line, or resolved from host and path
    pub(crate) fn tenant(&self, resolver: &TenantResolver) -> TenantSlug {
        match &self.tenant {
            Some(slug) if !slug.trim().is_empty() => TenantSlug::new(slug.trim()),
            _ => resolver.resolve(self.host.as_deref(), self.path.as_deref()),
        }
    }

    pub(crate) async fn run(self, controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
        tracing::debug!(%tenant, "Resolved tenant");

        match self.command {
            Commands::Login(args) => auth::login(controller, tenant, args).await,
            Commands::Register(args) => auth::register(controller, tenant, args).await,
            Commands::Logout => auth::logout(controller, tenant).await,
            Commands::Status => auth::status(controller, tenant),
            Commands::Route(args) => auth::route(controller, tenant, args),
            Commands::VerifyConnection(args) => auth::verify_connection(controller, tenant, args).await,
            Commands::ForgotPassword(args) => auth::forgot_password(controller, tenant, args).await,
            Commands::ResetPassword(args) => auth::reset_password(controller, tenant, args).await,
            Commands::ChangePassword(args) => auth::change_password(controller, tenant, args).await,
            Commands::TenantInfo => account::tenant_info(controller, tenant).await,
            Commands::Dashboard => account::dashboard(controller, tenant).await,
            Commands::Profile => account::profile(controller, tenant).await,
            Commands::UpdateProfile(args) => account::update_profile(controller, tenant, args).await,
            Commands::Sessions => account::sessions(controller, tenant).await,
            Commands::Requests(command) => requests::run(controller, tenant, command).await,
        }
    }
}

/// Prints a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a one-line confirmation, preferring the backend's wording
pub(crate) fn print_message(message: Option<String>, fallback: &str) -> anyhow::Result<()> {
    print_json(&serde_json::json!({
        "message": message.unwrap_or_else(|| fallback.to_string())
    }))
}
