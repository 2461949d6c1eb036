/// Macro khai báo kiểu ID dựa trên UUID v7
///
/// Sinh sẵn các boilerplate:
/// - Struct newtype bọc `Uuid`
/// - `derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)`
/// - `new()`: sinh UUID v7 (sắp xếp được theo thứ tự tạo)
/// - `from_uuid()` / `as_uuid()`
/// - `Default` uỷ quyền cho `new()`
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// Sinh ID mới (UUID v7)
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Khôi phục ID từ UUID có sẵn
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Tham chiếu UUID bên trong
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
