use super::{print_json, print_message};
use accesswash_client::api::PhotoUpload;
use accesswash_client::controller::AuthController;
use accesswash_shared::models::service_request::{
    Coordinates, IssueType, NewServiceRequest, Rating, Urgency,
};
use accesswash_shared::tenant::TenantSlug;
use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub(crate) struct RequestsCommand {
    #[command(subcommand)]
    command: RequestsSubcommand,
}

#[derive(Debug, Subcommand)]
enum RequestsSubcommand {
    /// List your service requests
    List,
    Show(ShowArgs),
    Create(CreateArgs),
    Comments(ShowArgs),
    Comment(CommentArgs),
    Rate(RateArgs),
    UploadPhoto(UploadPhotoArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Service request id
    id: String,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// no_water, low_pressure, pipe_burst, water_quality, meter_problem,
    /// billing_inquiry, connection_request, disconnection, other
    #[arg(long, value_parser = parse_issue_type)]
    issue_type: IssueType,

    #[arg(long)]
    title: String,

    #[arg(long)]
    description: String,

    /// emergency, high, standard, low
    #[arg(long, value_parser = parse_urgency, default_value = "standard")]
    urgency: Urgency,

    /// Where the problem is, in words
    #[arg(long)]
    location: String,

    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

#[derive(Debug, Args)]
struct CommentArgs {
    id: String,

    #[arg(long)]
    text: String,
}

#[derive(Debug, Args)]
struct RateArgs {
    id: String,

    /// 1 to 5 stars
    #[arg(long)]
    stars: u8,

    #[arg(long)]
    feedback: Option<String>,
}

#[derive(Debug, Args)]
struct UploadPhotoArgs {
    id: String,

    /// Image file to attach
    file: PathBuf,
}

fn parse_issue_type(s: &str) -> Result<IssueType, String> {
    IssueType::parse(s).ok_or_else(|| format!("unknown issue type: {s}"))
}

fn parse_urgency(s: &str) -> Result<Urgency, String> {
    Urgency::parse(s).ok_or_else(|| format!("unknown urgency: {s}"))
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

pub(crate) async fn run(controller: &AuthController, tenant: &TenantSlug, command: RequestsCommand) -> anyhow::Result<()> {
    let api = controller.clients().for_tenant(tenant);

    match command.command {
        RequestsSubcommand::List => print_json(&api.service_requests().await?),
        RequestsSubcommand::Show(args) => print_json(&api.service_request(&args.id).await?),
        RequestsSubcommand::Create(args) => {
            let location_coordinates = match (args.lat, args.lng) {
                (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
                _ => None,
            };
            let request = NewServiceRequest {
                issue_type: args.issue_type,
                title: args.title,
                description: args.description,
                urgency: args.urgency,
                reported_location: args.location,
                location_coordinates,
            };

            print_json(&api.create_service_request(request).await?)
        }
        RequestsSubcommand::Comments(args) => print_json(&api.comments(&args.id).await?),
        RequestsSubcommand::Comment(args) => print_json(&api.add_comment(&args.id, &args.text).await?),
        RequestsSubcommand::Rate(args) => {
            let rating = Rating {
                rating: args.stars,
                feedback: args.feedback,
            };
            api.rate_service_request(&args.id, &rating).await?;
            print_message(None, "Thanks for your feedback")
        }
        RequestsSubcommand::UploadPhoto(args) => {
            let data = tokio::fs::read(&args.file)
                .await
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let file_name = args
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());

            let mut photo = PhotoUpload::new(file_name, data);
            if let Some(content_type) = content_type_for(&args.file) {
                photo = photo.with_content_type(content_type);
            }

            print_json(&api.upload_photo(&args.id, photo).await?)
        }
    }
}
