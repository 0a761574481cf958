use super::{print_json, print_message};
use accesswash_client::controller::AuthController;
use accesswash_client::navigation::RouteDecision;
use accesswash_shared::models::customer::{ConnectionLookup, LoginCredentials, RegisterData};
use accesswash_shared::tenant::TenantSlug;
use accesswash_shared::validation::normalize_phone_number;
use clap::Args;
use serde_json::json;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Email address or phone number
    #[arg(long)]
    username: String,

    #[arg(long, env = "ACCESSWASH_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(controller: &AuthController, tenant: &TenantSlug, args: LoginArgs) -> anyhow::Result<()> {
    let credentials = LoginCredentials::new(args.username.trim(), args.password);
    let customer = controller.login(tenant, &credentials).await?;

    print_json(&customer)
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    email: String,

    /// Kenyan mobile number (07XX XXX XXX or +254 7XX XXX XXX)
    #[arg(long)]
    phone: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    address: String,

    #[arg(long, env = "ACCESSWASH_PASSWORD", hide_env_values = true)]
    password: String,

    /// Defaults to --password
    #[arg(long)]
    password_confirm: Option<String>,

    #[arg(long)]
    account_number: Option<String>,

    #[arg(long)]
    meter_number: Option<String>,

    /// Preferred language (en, sw)
    #[arg(long)]
    language: Option<String>,
}

pub(crate) async fn register(controller: &AuthController, tenant: &TenantSlug, args: RegisterArgs) -> anyhow::Result<()> {
    let password_confirm = args.password_confirm.unwrap_or_else(|| args.password.clone());
    let data = RegisterData {
        email: args.email.trim().to_string(),
        phone_number: args.phone,
        password: args.password,
        password_confirm,
        first_name: args.first_name,
        last_name: args.last_name,
        property_address: args.address,
        account_number: args.account_number,
        meter_number: args.meter_number,
        language: args.language,
    };

    let customer = controller.register(tenant, &data).await?;
    print_json(&customer)
}

pub(crate) async fn logout(controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
    controller.logout(tenant).await;
    print_message(None, "Signed out")
}

pub(crate) fn status(controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
    controller.check_auth_status(tenant);
    let state = controller.state();

    print_json(&json!({
        "tenant": tenant,
        "is_authenticated": state.is_authenticated,
        "customer": state.customer,
    }))
}

#[derive(Debug, Args)]
pub(crate) struct RouteArgs {
    /// Page path, e.g. /acme/requests
    page: String,
}

pub(crate) fn route(controller: &AuthController, tenant: &TenantSlug, args: RouteArgs) -> anyhow::Result<()> {
    let body = match controller.route(tenant, &args.page) {
        RouteDecision::Allow => json!({ "allow": true }),
        RouteDecision::Redirect(target) => json!({ "allow": false, "redirect": target }),
    };

    print_json(&body)
}

#[derive(Debug, Args)]
pub(crate) struct VerifyConnectionArgs {
    #[arg(long)]
    account_number: Option<String>,

    #[arg(long)]
    meter_number: Option<String>,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    phone: String,
}

pub(crate) async fn verify_connection(
    controller: &AuthController,
    tenant: &TenantSlug,
    args: VerifyConnectionArgs,
) -> anyhow::Result<()> {
    let lookup = ConnectionLookup {
        account_number: args.account_number,
        meter_number: args.meter_number,
        last_name: args.last_name,
        phone_number: normalize_phone_number(&args.phone),
    };

    let connection = controller.verify_connection(tenant, &lookup).await?;
    print_json(&connection)
}

#[derive(Debug, Args)]
pub(crate) struct ForgotPasswordArgs {
    #[arg(long)]
    email: String,
}

pub(crate) async fn forgot_password(
    controller: &AuthController,
    tenant: &TenantSlug,
    args: ForgotPasswordArgs,
) -> anyhow::Result<()> {
    let message = controller.forgot_password(tenant, &args.email).await?;
    print_message(message, "If the address is registered, reset instructions are on their way")
}

#[derive(Debug, Args)]
pub(crate) struct ResetPasswordArgs {
    /// Token from the reset email
    #[arg(long)]
    token: String,

    #[arg(long, env = "ACCESSWASH_NEW_PASSWORD", hide_env_values = true)]
    new_password: String,

    /// Defaults to --new-password
    #[arg(long)]
    confirm: Option<String>,
}

pub(crate) async fn reset_password(
    controller: &AuthController,
    tenant: &TenantSlug,
    args: ResetPasswordArgs,
) -> anyhow::Result<()> {
    let confirm = args.confirm.as_deref().unwrap_or(&args.new_password);
    let message = controller
        .reset_password(tenant, &args.token, &args.new_password, confirm)
        .await?;

    print_message(message, "Password reset")
}

#[derive(Debug, Args)]
pub(crate) struct ChangePasswordArgs {
    #[arg(long, env = "ACCESSWASH_PASSWORD", hide_env_values = true)]
    current_password: String,

    #[arg(long, env = "ACCESSWASH_NEW_PASSWORD", hide_env_values = true)]
    new_password: String,

    /// Defaults to --new-password
    #[arg(long)]
    confirm: Option<String>,
}

pub(crate) async fn change_password(
    controller: &AuthController,
    tenant: &TenantSlug,
    args: ChangePasswordArgs,
) -> anyhow::Result<()> {
    let confirm = args.confirm.as_deref().unwrap_or(&args.new_password);
    let message = controller
        .change_password(tenant, &args.current_password, &args.new_password, confirm)
        .await?;

    print_message(message, "Password changed")
}
