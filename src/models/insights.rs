//! Visual search ("insights") request model.
//!
//! Serialized into the `knowledgeRequest` form part of the upload.

use serde::{Deserialize, Serialize};

/// Region of the image to analyse, as fractions of width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for CropArea {
    fn default() -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            right: 1.0,
            bottom: 1.0,
        }
    }
}

/// Caller-supplied knobs for an insights request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightsOptions {
    /// Analyse an image by URL in addition to (or instead of) the upload
    pub image_url: Option<String>,

    /// Restrict visually similar results to one site, e.g. "www.pinterest.com"
    pub site: Option<String>,

    pub crop_area: CropArea,
}

impl InsightsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image URL
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the site filter
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Set the crop area
    pub fn crop_area(mut self, crop_area: CropArea) -> Self {
        self.crop_area = crop_area;
        self
    }
}

/// Body of the `knowledgeRequest` form part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub image_info: ImageInfo,
    pub knowledge_request: KnowledgeRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub url: Option<String>,
    pub crop_area: CropArea,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRequest {
    pub filters: Filters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub site: Option<String>,
}

impl From<&InsightsOptions> for InsightsRequest {
    fn from(options: &InsightsOptions) -> Self {
        Self {
            image_info: ImageInfo {
                url: options.image_url.clone(),
                crop_area: options.crop_area,
            },
            knowledge_request: KnowledgeRequest {
                filters: Filters {
                    site: options.site.clone(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_json() {
        let request = InsightsRequest::from(&InsightsOptions::new());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["imageInfo"]["url"], serde_json::Value::Null);
        assert_eq!(value["imageInfo"]["cropArea"]["right"], 1.0);
        assert_eq!(value["imageInfo"]["cropArea"]["bottom"], 1.0);
        assert_eq!(value["imageInfo"]["cropArea"]["top"], 0.0);
        assert_eq!(value["knowledgeRequest"]["filters"]["site"], serde_json::Value::Null);
    }

    #[test]
    fn test_options_flow_into_request() {
        let options = InsightsOptions::new()
            .image_url("https://img.example.com/a.jpg")
            .site("www.example.com")
            .crop_area(CropArea {
                top: 0.25,
                left: 0.25,
                right: 0.75,
                bottom: 0.75,
            });

        let request = InsightsRequest::from(&options);
        assert_eq!(
            request.image_info.url.as_deref(),
            Some("https://img.example.com/a.jpg")
        );
        assert_eq!(request.image_info.crop_area.left, 0.25);
        assert_eq!(
            request.knowledge_request.filters.site.as_deref(),
            Some("www.example.com")
        );
    }
}
