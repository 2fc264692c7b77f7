use crate::models::AttendanceLogResponse;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// 分页查询参数，page 从 1 开始
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(PaginatedAttendanceResponse = PaginatedResponse<AttendanceLogResponse>)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl PaginationParams {
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self { page, per_page }
    }

    pub fn get_page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_per_page(&self) -> u64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    /// sea-orm Paginator 的页号从 0 开始
    pub fn page_index(&self) -> u64 {
        self.get_page() - 1
    }
}

impl PaginationInfo {
    pub fn new(current_page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page)
        };

        Self {
            current_page,
            per_page,
            total,
            total_pages,
        }
    }
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let pagination = PaginationInfo::new(params.get_page(), params.get_per_page(), total);

        Self { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params() {
        let params = PaginationParams::new(Some(2), Some(10));
        assert_eq!(params.get_page(), 2);
        assert_eq!(params.get_per_page(), 10);
        assert_eq!(params.page_index(), 1);
    }

    #[test]
    fn test_pagination_params_defaults() {
        let params = PaginationParams::new(None, Some(500));
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_per_page(), 100);
        assert_eq!(params.page_index(), 0);

        let zero = PaginationParams::new(Some(0), Some(0));
        assert_eq!(zero.get_page(), 1);
        assert_eq!(zero.get_per_page(), 1);
    }

    #[test]
    fn test_pagination_info() {
        let info = PaginationInfo::new(2, 10, 25);
        assert_eq!(info.total_pages, 3);

        let empty = PaginationInfo::new(1, 10, 0);
        assert_eq!(empty.total_pages, 1);
    }
}
