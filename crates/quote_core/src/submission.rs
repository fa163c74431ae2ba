use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use shared::protocol::{IntakePayload, PhotoFile, SubmissionReceipt, SubmissionRequest};
use tracing::{info, warn};
use url::Url;

#[async_trait]
pub trait QuoteSubmitter: Send + Sync {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionReceipt>;
}

pub struct MissingQuoteSubmitter;

#[async_trait]
impl QuoteSubmitter for MissingQuoteSubmitter {
    async fn submit(&self, _request: SubmissionRequest) -> Result<SubmissionReceipt> {
        Err(anyhow!("quote intake is not configured"))
    }
}

/// Unsigned-upload settings for the media host that stores customer photos.
#[derive(Debug, Clone)]
pub struct MediaHost {
    pub api_base: Url,
    pub cloud_name: String,
    pub upload_preset: String,
}

impl MediaHost {
    pub fn new(api_base: &str, cloud_name: &str, upload_preset: &str) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .with_context(|| format!("invalid media host url '{api_base}'"))?;
        Ok(Self {
            api_base,
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base.as_str().trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    secure_url: Option<String>,
}

/// Relays photos through the media host, then posts the quote to the
/// spreadsheet intake endpoint.
pub struct IntakeClient {
    http: Client,
    intake_url: Url,
    media: Option<MediaHost>,
}

impl IntakeClient {
    pub fn new(intake_url: &str, media: Option<MediaHost>) -> Result<Self> {
        let intake_url = Url::parse(intake_url)
            .with_context(|| format!("invalid intake url '{intake_url}'"))?;
        Ok(Self {
            http: Client::new(),
            intake_url,
            media,
        })
    }

    /// Uploads photos one by one. A failed upload is logged and skipped so the
    /// quote still goes out with whatever photos made it.
    async fn upload_photos(&self, photos: Vec<PhotoFile>) -> Vec<String> {
        if photos.is_empty() {
            return Vec::new();
        }
        let Some(media) = &self.media else {
            warn!(
                photos = photos.len(),
                "submission: no media host configured; dropping photos"
            );
            return Vec::new();
        };

        let total = photos.len();
        let mut urls = Vec::with_capacity(total);
        for (position, photo) in photos.into_iter().enumerate() {
            let filename = photo.filename.clone();
            match self.upload_photo(media, photo).await {
                Ok(url) => {
                    info!(photo = position + 1, total, "submission: photo uploaded");
                    urls.push(url);
                }
                Err(err) => warn!(
                    photo = position + 1,
                    total,
                    filename = %filename,
                    error = %err,
                    "submission: photo upload failed"
                ),
            }
        }

        if urls.len() < total {
            warn!(
                uploaded = urls.len(),
                total, "submission: only some photos were uploaded"
            );
        }
        urls
    }

    async fn upload_photo(&self, media: &MediaHost, photo: PhotoFile) -> Result<String> {
        let mime_type = photo
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file = Part::bytes(photo.bytes)
            .file_name(photo.filename)
            .mime_str(&mime_type)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", media.upload_preset.clone());

        let response: MediaUploadResponse = self
            .http
            .post(media.upload_url())
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .secure_url
            .ok_or_else(|| anyhow!("media host response had no secure_url"))
    }
}

#[async_trait]
impl QuoteSubmitter for IntakeClient {
    async fn submit(&self, request: SubmissionRequest) -> Result<SubmissionReceipt> {
        let SubmissionRequest {
            contact,
            snapshot,
            photos,
        } = request;
        let attempted = photos.len();

        let photo_urls = self.upload_photos(photos).await;
        let payload = IntakePayload::new(&contact, &snapshot, &photo_urls);

        info!(
            items = snapshot.items.len(),
            grand_total = snapshot.grand_total,
            photos = photo_urls.len(),
            "submission: sending quote request"
        );
        self.http
            .post(self.intake_url.clone())
            .json(&payload)
            .send()
            .await
            .context("failed to reach quote intake")?
            .error_for_status()
            .context("quote intake rejected the request")?;

        Ok(SubmissionReceipt {
            submitted_at: Utc::now(),
            photos_dropped: attempted - photo_urls.len(),
            photo_urls,
        })
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
