//! Common API types shared by the user and role endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination parameters (page, size), zero-based page index.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    page: Option<u32>,
    size: Option<u32>,
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    pub fn size(&self) -> u32 {
        self.size.unwrap_or(20)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(0),
            size: Some(20),
        }
    }
}

/// Paginated response wrapper.
///
/// `total_pages` follows the request-driven rule (ceil(total/size), 0 when
/// size is 0). The role listing derives its own metadata from what the
/// provider reports and builds this struct directly.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, size: u32, total: u64) -> Self {
        let total_pages = if size > 0 {
            ((total as f64) / (size as f64)).ceil() as u32
        } else {
            0
        };
        Self {
            data,
            page,
            size,
            total,
            total_pages,
        }
    }
}

/// Success response for delete endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}
