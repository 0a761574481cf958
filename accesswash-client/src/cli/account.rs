use super::print_json;
use accesswash_client::controller::AuthController;
use accesswash_shared::models::customer::ProfileUpdate;
use accesswash_shared::tenant::TenantSlug;
use accesswash_shared::validation::normalize_phone_number;
use clap::Args;

pub(crate) async fn tenant_info(controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
    let info = controller.load_tenant_info(tenant).await;
    print_json(&info)
}

pub(crate) async fn dashboard(controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
    let dashboard = controller.clients().for_tenant(tenant).dashboard().await?;
    print_json(&dashboard)
}

pub(crate) async fn profile(controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
    let customer = controller.clients().for_tenant(tenant).profile().await?;
    print_json(&customer)
}

#[derive(Debug, Args)]
pub(crate) struct UpdateProfileArgs {
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    language: Option<String>,
}

pub(crate) async fn update_profile(
    controller: &AuthController,
    tenant: &TenantSlug,
    args: UpdateProfileArgs,
) -> anyhow::Result<()> {
    let update = ProfileUpdate {
        email: args.email,
        phone_number: args.phone.as_deref().map(normalize_phone_number),
        first_name: args.first_name,
        last_name: args.last_name,
        property_address: args.address,
        language: args.language,
    };

    let customer = controller.update_profile(tenant, &update).await?;
    print_json(&customer)
}

pub(crate) async fn sessions(controller: &AuthController, tenant: &TenantSlug) -> anyhow::Result<()> {
    let sessions = controller.clients().for_tenant(tenant).sessions().await?;
    print_json(&sessions)
}
