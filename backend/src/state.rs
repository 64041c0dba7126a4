use anyhow::Result;

use crate::{
    activity::OpsLog,
    comment_cache::CommentService,
    comment_gateway::CommentGateway,
    config::AppConfig,
    drive_client::DriveClient,
    products::ProductCatalog,
    sheet_rows::SheetClient,
};

/// Shared per-process state. Everything inside is `Arc`-backed, so handler
/// clones are cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sheets: SheetClient,
    pub drive: DriveClient,
    pub comments: CommentService,
    pub gateway: CommentGateway,
    pub catalog: ProductCatalog,
    pub ops: OpsLog,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        let sheets = SheetClient::new(client.clone(), config.sheet.clone());
        let drive = DriveClient::new(client.clone(), config.drive.clone());
        let comments = CommentService::new(sheets.clone());
        let gateway = CommentGateway::new(
            client,
            config.comments_webhook_url.clone(),
            config.generate_webhook_url.clone(),
        );
        let catalog =
            ProductCatalog::new(sheets.clone(), drive.clone(), config.public_base_url.clone());

        Ok(Self {
            config,
            sheets,
            drive,
            comments,
            gateway,
            catalog,
            ops: OpsLog::default(),
        })
    }
}
