use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub async fn init_pool(database_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
        .expect("Failed to create DB pool")
}

pub async fn run_migrations(pool: &PgPool) {
    sqlx::migrate!()
        .run(pool)
        .await
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Role → permission grants. The lifecycle rule tables reference these
/// codes; which roles hold them is deployment data, seeded here.
const GRANTS: &[(&str, &[&str])] = &[
    (
        "SUPER_ADMIN",
        &["JOB_CREATE", "JOB_SUBMIT", "JOB_VERIFY", "JOB_ENRICH", "JOB_APPROVE", "JOB_PUBLISH"],
    ),
    (
        "HR_ADMIN",
        &["JOB_CREATE", "JOB_SUBMIT", "JOB_VERIFY", "JOB_APPROVE", "JOB_PUBLISH"],
    ),
    ("TA", &["JOB_ENRICH"]),
    ("VENDOR", &["JOB_CREATE", "JOB_SUBMIT"]),
];

/// Seed role grants, the internal staffing organization, and a default
/// super-admin account. Idempotent; runs at every startup.
pub async fn seed(pool: &PgPool, admin_hash: &str) {
    let mut created = 0;
    for &(role, permissions) in GRANTS {
        for &permission in permissions {
            let result = sqlx::query(
                "INSERT INTO role_permissions (role, permission)
                 VALUES ($1, $2)
                 ON CONFLICT (role, permission) DO NOTHING",
            )
            .bind(role)
            .bind(permission)
            .execute(pool)
            .await
            .expect("Failed to seed role permissions");
            created += result.rows_affected();
        }
    }
    if created > 0 {
        log::info!("Seed grants: created={created}");
    }

    let org_id: i64 = match sqlx::query_scalar::<_, i64>(
        "SELECT id FROM organizations WHERE name = 'Solventek'",
    )
    .fetch_optional(pool)
    .await
    .expect("Failed to look up internal organization")
    {
        Some(id) => id,
        None => {
            let id = sqlx::query_scalar::<_, i64>(
                "INSERT INTO organizations (name, org_kind, status)
                 VALUES ('Solventek', 'SOLVENTEK', 'ACTIVE')
                 RETURNING id",
            )
            .fetch_one(pool)
            .await
            .expect("Failed to seed internal organization");
            log::info!("Seeded internal organization (id={id})");
            id
        }
    };

    let admin_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = 'admin'")
        .fetch_optional(pool)
        .await
        .expect("Failed to look up admin user")
        .is_some();
    if !admin_exists {
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, role, org_id)
             VALUES ('admin', '', $1, 'SUPER_ADMIN', $2)",
        )
        .bind(admin_hash)
        .bind(org_id)
        .execute(pool)
        .await
        .expect("Failed to seed admin user");
        log::info!("Seeded default admin user");
    }
}
