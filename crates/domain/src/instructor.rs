//! # Giảng viên
//!
//! Entity giảng viên. Danh sách công khai chỉ gồm giảng viên `active`.

use chrono::{DateTime, Utc};

use crate::DomainError;

define_uuid_id! {
    /// ID giảng viên
    pub struct InstructorId;
}

/// Entity giảng viên
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    id:         InstructorId,
    name:       String,
    title:      Option<String>,
    bio:        Option<String>,
    avatar_url: Option<String>,
    active:     bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Instructor {
    /// Tạo giảng viên mới (mặc định `active`)
    pub fn new(
        id: InstructorId,
        name: impl Into<String>,
        title: Option<String>,
        bio: Option<String>,
        avatar_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "Tên giảng viên là bắt buộc".to_string(),
            ));
        }

        Ok(Self {
            id,
            name,
            title,
            bio,
            avatar_url,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Khôi phục entity từ dữ liệu đã lưu
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: InstructorId,
        name: String,
        title: Option<String>,
        bio: Option<String>,
        avatar_url: Option<String>,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            title,
            bio,
            avatar_url,
            active,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &InstructorId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[rstest]
    fn test_giảng_viên_mới_mặc_định_active(now: DateTime<Utc>) {
        let instructor =
            Instructor::new(InstructorId::new(), "Trần Thị B", None, None, None, now).unwrap();
        assert!(instructor.is_active());
    }

    #[rstest]
    fn test_tên_rỗng_bị_từ_chối(now: DateTime<Utc>) {
        let result = Instructor::new(InstructorId::new(), " ", None, None, None, now);
        assert!(result.is_err());
    }
}
