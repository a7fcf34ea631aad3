//! SQL DDL for initializing the operator account table.
//! MySQL-first design; everything else in the schema is owned by the DBA.

/// Account table with:
/// - `user_id` INT AUTO_INCREMENT PRIMARY KEY
/// - `username` VARCHAR(64) UNIQUE (creates an index implicitly)
/// - `password` CHAR(64), a lowercase hex SHA-256 digest, never plaintext
/// - `role` ENUM restricted to the two recognized roles, defaulting to `user`
pub const APP_USERS_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS APP_USERS (
    user_id INT AUTO_INCREMENT PRIMARY KEY,
    username VARCHAR(64) NOT NULL UNIQUE,
    password CHAR(64) NOT NULL,
    role ENUM('admin', 'user') NOT NULL DEFAULT 'user'
)
"#;
