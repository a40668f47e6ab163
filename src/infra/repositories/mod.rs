pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_comment_repo;
pub mod sqlite_upload_repo;

pub mod postgres_user_repo;
pub mod postgres_auth_repo;
pub mod postgres_comment_repo;
pub mod postgres_upload_repo;
