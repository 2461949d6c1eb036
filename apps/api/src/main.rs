//! # KhoaHoc API server
//!
//! Backend của nền tảng khoá học trực tuyến: CRUD khoá học / bài học /
//! giảng viên / cấu hình trang, đăng ký & đăng nhập kèm nhật ký an ninh,
//! và phát presigned URL tải tệp lên object storage.
//!
//! ## Phân quyền
//!
//! Nhánh `/admin` (trừ `check-auth` và `create-admin`) đi qua middleware
//! [`middleware::require_admin`]; phần còn lại công khai.
//!
//! ## Biến môi trường
//!
//! | Biến | Bắt buộc | Mô tả |
//! |------|----------|------|
//! | `API_HOST` | Không | Địa chỉ bind (mặc định `0.0.0.0`) |
//! | `API_PORT` | **Có** | Cổng |
//! | `DATABASE_URL` | **Có** | URL kết nối PostgreSQL |
//! | `S3_ENDPOINT_URL` | Không | Endpoint MinIO/S3 tuỳ chỉnh |
//! | `S3_BUCKET_NAME` | **Có** | Tên bucket |
//! | `ADMIN_BOOTSTRAP_SECRET` | **Có** | Secret tạo admin đầu tiên |
//!
//! ## Khởi động
//!
//! ```bash
//! API_PORT=3000 DATABASE_URL=postgres://... S3_BUCKET_NAME=khoahoc \
//!     ADMIN_BOOTSTRAP_SECRET=... cargo run -p khoahoc-api
//! ```

mod config;
mod error;
mod handler;
mod middleware;
mod usecase;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use config::ApiConfig;
use handler::{
    AuthState,
    CourseState,
    InstructorState,
    LessonState,
    SecurityState,
    SiteSettingState,
    UploadState,
    check_auth,
    create_admin,
    create_course,
    create_course_lesson,
    create_instructor,
    delete_course,
    delete_lesson,
    delete_upload,
    generate_upload_url,
    get_course,
    get_lesson,
    get_site_rules,
    health_check,
    lesson_documents,
    lesson_videos,
    list_alerts,
    list_course_lessons,
    list_courses,
    list_instructors_admin,
    list_instructors_public,
    list_site_settings,
    login,
    mark_alert_read,
    register,
    reorder_lesson,
    update_course,
    update_lesson,
    update_lesson_duration,
    upsert_site_setting,
    user_security,
};
use khoahoc_domain::clock::{Clock, SystemClock};
use khoahoc_infra::{
    db,
    password::Argon2PasswordService,
    repository::{
        PostgresCourseRepository,
        PostgresInstructorRepository,
        PostgresLessonRepository,
        PostgresLoginSecurityRepository,
        PostgresSiteSettingRepository,
        PostgresUploadRepository,
        PostgresUserRepository,
    },
    s3::{self, AwsS3Client},
};
use middleware::{AdminGuardState, require_admin};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use usecase::{AuthUseCase, LessonUseCase, LoginSecurityUseCase, UploadUseCase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Đọc file .env nếu có
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,khoahoc=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    tracing::info!("Khởi động API server: {}:{}", config.host, config.port);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Đã kết nối cơ sở dữ liệu");

    let s3_client = s3::create_client(config.s3_endpoint_url.as_deref()).await;
    let s3_client = Arc::new(AwsS3Client::new(
        s3_client,
        config.s3_bucket_name.clone(),
    ));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Repository
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let course_repository = Arc::new(PostgresCourseRepository::new(pool.clone()));
    let lesson_repository = Arc::new(PostgresLessonRepository::new(pool.clone()));
    let instructor_repository = Arc::new(PostgresInstructorRepository::new(pool.clone()));
    let upload_repository = Arc::new(PostgresUploadRepository::new(pool.clone()));
    let site_setting_repository = Arc::new(PostgresSiteSettingRepository::new(pool.clone()));
    let login_security_repository = Arc::new(PostgresLoginSecurityRepository::new(pool.clone()));

    // Usecase
    let security_usecase = Arc::new(LoginSecurityUseCase::new(
        login_security_repository,
        Arc::clone(&clock),
        config.security,
    ));
    let auth_usecase = Arc::new(AuthUseCase::new(
        user_repository,
        Arc::new(Argon2PasswordService::new()),
        Arc::clone(&security_usecase),
        Arc::clone(&clock),
        config.admin_bootstrap_secret.clone(),
    ));
    let lesson_usecase = Arc::new(LessonUseCase::new(
        lesson_repository.clone(),
        course_repository.clone(),
        Arc::clone(&clock),
    ));
    let upload_usecase = Arc::new(UploadUseCase::new(
        s3_client,
        upload_repository.clone(),
        Arc::clone(&clock),
    ));

    // Trạng thái chia sẻ theo nhóm route
    let auth_state = Arc::new(AuthState {
        usecase: Arc::clone(&auth_usecase),
    });
    let course_state = Arc::new(CourseState {
        course_repository,
        clock: Arc::clone(&clock),
    });
    let lesson_state = Arc::new(LessonState {
        usecase: lesson_usecase,
        lesson_repository,
        upload_repository,
    });
    let instructor_state = Arc::new(InstructorState {
        instructor_repository,
        clock: Arc::clone(&clock),
    });
    let site_setting_state = Arc::new(SiteSettingState {
        site_setting_repository,
        clock: Arc::clone(&clock),
    });
    let upload_state = Arc::new(UploadState {
        usecase: upload_usecase,
    });
    let security_state = Arc::new(SecurityState {
        usecase: security_usecase,
    });
    let guard_state = Arc::new(AdminGuardState {
        usecase: auth_usecase,
    });

    // Nhánh /admin sau gác cổng
    let admin_guarded = Router::new()
        .route("/alerts", get(list_alerts).put(mark_alert_read))
        .route("/users/{id}/security", get(user_security))
        .with_state(Arc::clone(&security_state))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .with_state(Arc::clone(&course_state))
        .route(
            "/instructors",
            get(list_instructors_admin).post(create_instructor),
        )
        .with_state(Arc::clone(&instructor_state))
        .route(
            "/lessons/{id}",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/lessons/{id}/order", put(reorder_lesson))
        .with_state(Arc::clone(&lesson_state))
        .route(
            "/site-settings",
            get(list_site_settings).post(upsert_site_setting),
        )
        .with_state(Arc::clone(&site_setting_state))
        .route("/uploads/{id}", delete(delete_upload))
        .with_state(Arc::clone(&upload_state))
        .layer(axum::middleware::from_fn_with_state(
            guard_state,
            require_admin,
        ));

    // check-auth và create-admin nằm ngoài gác cổng (tự canh bằng
    // nội dung request)
    let admin = Router::new()
        .route("/check-auth", post(check_auth))
        .route("/create-admin", post(create_admin))
        .with_state(Arc::clone(&auth_state))
        .merge(admin_guarded);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .with_state(auth_state)
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .with_state(course_state)
        .route(
            "/courses/{id}/lessons",
            get(list_course_lessons).post(create_course_lesson),
        )
        .route("/lessons/{id}/documents", get(lesson_documents))
        .route("/lessons/{id}/videos", get(lesson_videos))
        .route("/lessons/{id}/update-duration", post(update_lesson_duration))
        .with_state(lesson_state)
        .route("/instructors", get(list_instructors_public))
        .with_state(instructor_state)
        .route("/site-rules", get(get_site_rules))
        .with_state(site_setting_state)
        .route("/generate-upload-url", post(generate_upload_url))
        .route("/upload-longvan", post(generate_upload_url))
        .with_state(upload_state)
        .nest("/admin", admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API server đã sẵn sàng: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
