//! # Envelope phản hồi API
//!
//! Mọi endpoint trả về JSON theo dạng thống nhất `{ "data": T }`.

use serde::{Deserialize, Serialize};

/// Kiểu phản hồi thống nhất của API công khai
///
/// Tất cả endpoint thành công đều trả về `{ "data": T }`.
/// Lỗi đi qua `ApiError` của tầng handler, không dùng kiểu này.
///
/// ## Ví dụ
///
/// ```
/// use khoahoc_shared::ApiResponse;
///
/// let response = ApiResponse::new("xin chào");
/// assert_eq!(response.data, "xin chào");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Tạo một `ApiResponse` mới
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_ra_đúng_hình_dạng_json() {
        let response = ApiResponse::new("hello");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "data": "hello" }));
    }

    #[test]
    fn test_deserialize_từ_json_về_đối_tượng() {
        let json = r#"{"data": "world"}"#;
        let response: ApiResponse<String> = serde_json::from_str(json).unwrap();

        assert_eq!(response.data, "world");
    }

    #[test]
    fn test_serialize_payload_dạng_vec() {
        let response = ApiResponse::new(vec!["a", "b", "c"]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "data": ["a", "b", "c"] }));
    }
}
