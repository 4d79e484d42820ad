use tracing::info;

use super::validation::IssueFields;
use crate::{
    error::{Error, Result},
    evidence::Capture,
    protocol::{Coordinate, Issue, IssueRequest},
    server::{CivicApi, ImageHost, UploadedImage},
    zone::{self, Zone},
};

/// A new issue being composed: text fields plus one piece of live evidence.
///
/// The evidence must have reached the image host before the issue can be submitted;
/// a local capture alone is never sent.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    fields: IssueFields,
    capture: Option<Capture>,
    uploaded: Option<UploadedImage>,
}

impl ReportDraft {
    /// An empty draft with these fields.
    pub fn new(fields: IssueFields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Form fields.
    pub fn fields(&self) -> &IssueFields {
        &self.fields
    }

    /// Form fields, for editing.
    pub fn fields_mut(&mut self) -> &mut IssueFields {
        &mut self.fields
    }

    /// Replace the evidence. Any earlier upload no longer matches and is forgotten.
    pub fn attach_capture(&mut self, capture: Capture) {
        self.capture = Some(capture);
        self.uploaded = None;
    }

    /// Attached evidence photo.
    pub fn capture(&self) -> Option<&Capture> {
        self.capture.as_ref()
    }

    /// Upload of the attached photo, once done.
    pub fn uploaded(&self) -> Option<&UploadedImage> {
        self.uploaded.as_ref()
    }

    /// Position recorded with the evidence.
    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.capture.as_ref().and_then(Capture::coordinate)
    }

    /// Zone the issue will be filed under.
    pub fn zone(&self) -> Zone {
        zone::resolve_optional(self.coordinate())
    }

    /// Upload the attached capture. Already-uploaded evidence is not sent again.
    pub async fn upload(&mut self, host: &ImageHost) -> Result<&UploadedImage> {
        let Some(capture) = &self.capture else {
            return Err(Error::EvidenceNotUploaded);
        };

        if self.uploaded.is_none() {
            let uploaded = host.upload(capture, capture.coordinate()).await?;
            self.uploaded = Some(uploaded);
        }

        self.uploaded.as_ref().ok_or(Error::EvidenceNotUploaded)
    }

    /// The request body, once the fields are valid and the evidence is uploaded.
    pub fn to_request(&self) -> Result<IssueRequest> {
        let fields = self.fields.validate()?;
        let uploaded = self.uploaded.as_ref().ok_or(Error::EvidenceNotUploaded)?;
        let coordinate = self.coordinate();

        Ok(IssueRequest {
            title: fields.title,
            description: fields.description,
            category: fields.category,
            image_url: uploaded.url().to_string(),
            latitude: coordinate.map(|c| c.latitude),
            longitude: coordinate.map(|c| c.longitude),
        })
    }

    /// Validate and create the issue. Nothing is sent if validation fails.
    pub async fn submit(&self, api: &CivicApi) -> Result<Issue> {
        let request = self.to_request()?;
        let issue = api.create_issue(&request).await?;
        info!(
            id = issue.id,
            zone = %issue.resolved_zone(),
            "Submitted issue"
        );
        Ok(issue)
    }
}
