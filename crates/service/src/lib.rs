pub mod config;
mod upstream;

pub use codecommenter_core::outcome::{CommentFailure, CommentResult};
pub use config::CommenterConfig;
pub use upstream::{build_client, request_comments};

pub struct Commenter {
    config: CommenterConfig,
    client: reqwest::blocking::Client,
}

impl Commenter {
    pub fn new(config: CommenterConfig) -> Commenter {
        let client = upstream::build_client(&config);
        Commenter { config, client }
    }

    pub fn request_comments(&self, source_text: &str) -> CommentResult {
        upstream::request_comments(&self.config, &self.client, source_text)
    }
}
