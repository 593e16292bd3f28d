//! Dashboard data fetch

use super::{AuthClient, error::ClientError, request::RequestOptions};
use crate::types::PROXIED_DATA_PATH;
use serde_json::Value;
use tracing::error;

impl AuthClient {
    /// Fetch the proxied data as JSON, reporting progress on the feedback channel
    ///
    /// Failures are reported by the executor itself and returned unchanged.
    pub async fn fetch_data(&self, path: Option<&str>) -> Result<Value, ClientError> {
        self.feedback.success("Attempting to fetch data...");

        let result = async {
            let response = self
                .execute_authenticated(path.unwrap_or(PROXIED_DATA_PATH), RequestOptions::get())
                .await?;
            Ok::<_, ClientError>(response.json::<Value>().await?)
        }
        .await;

        match result {
            Ok(data) => {
                self.feedback.success("Data fetched successfully!");
                Ok(data)
            }
            Err(e) => {
                error!("Overall operation failed: {}", e);
                Err(e)
            }
        }
    }
}
