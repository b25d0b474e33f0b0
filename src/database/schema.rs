use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Bootstrap DDL, applied idempotently at startup. Statement order matters
/// only for the foreign keys into `voters`.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        national_id TEXT UNIQUE,
        phone TEXT,
        role TEXT NOT NULL DEFAULT 'aide',
        region TEXT,
        city TEXT,
        state TEXT,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS leaders (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        national_id TEXT,
        phone TEXT,
        email TEXT,
        region TEXT NOT NULL DEFAULT 'unassigned',
        voters_count INTEGER NOT NULL DEFAULT 0,
        voters_goal INTEGER NOT NULL DEFAULT 100,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        account_id UUID,
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS voters (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        national_id TEXT,
        voter_registration TEXT,
        birth_date DATE,
        phone TEXT,
        street TEXT,
        number TEXT,
        complement TEXT,
        neighborhood TEXT,
        postal_code TEXT,
        city TEXT,
        state TEXT,
        latitude NUMERIC(10, 8),
        longitude NUMERIC(11, 8),
        votes_count INTEGER NOT NULL DEFAULT 0,
        leader_id UUID,
        notes TEXT,
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS visits (
        id UUID PRIMARY KEY,
        voter_id UUID NOT NULL REFERENCES voters(id) ON DELETE CASCADE,
        leader_id UUID,
        date TIMESTAMPTZ NOT NULL,
        objective TEXT NOT NULL,
        result TEXT,
        next_steps TEXT,
        photos TEXT[],
        latitude NUMERIC(10, 8),
        longitude NUMERIC(11, 8),
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS help_records (
        id UUID PRIMARY KEY,
        voter_id UUID NOT NULL REFERENCES voters(id) ON DELETE CASCADE,
        leader_id UUID,
        category TEXT NOT NULL DEFAULT 'other',
        description TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        responsible_id UUID,
        documents TEXT[],
        notes TEXT,
        completed_at TIMESTAMPTZ,
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS appointments (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        kind TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'scheduled',
        date DATE NOT NULL,
        time TEXT NOT NULL,
        duration_minutes INTEGER,
        location TEXT,
        voter_id UUID REFERENCES voters(id) ON DELETE CASCADE,
        leader_id UUID,
        responsible_id UUID,
        notes TEXT,
        reminders JSONB NOT NULL DEFAULT '[]',
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        completed_at TIMESTAMPTZ,
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS law_projects (
        id UUID PRIMARY KEY,
        number TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        summary TEXT NOT NULL,
        full_text TEXT,
        protocol_date DATE NOT NULL,
        status TEXT NOT NULL DEFAULT 'drafting',
        timeline JSONB NOT NULL DEFAULT '[]',
        votes JSONB,
        pdf_url TEXT,
        views INTEGER NOT NULL DEFAULT 0,
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS amendments (
        id UUID PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        value NUMERIC(15, 2) NOT NULL,
        destination TEXT NOT NULL,
        objective TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'approved',
        execution_percentage INTEGER NOT NULL DEFAULT 0,
        documents TEXT[],
        photos TEXT[],
        tenant_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS audit_logs (
        id UUID PRIMARY KEY,
        action TEXT NOT NULL,
        entity_kind TEXT NOT NULL,
        entity_id UUID,
        description TEXT NOT NULL,
        actor_id UUID,
        actor_name TEXT,
        details JSONB,
        tenant_id UUID,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_accounts_tenant ON accounts(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_leaders_tenant ON leaders(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_leaders_account ON leaders(account_id)",
    "CREATE INDEX IF NOT EXISTS idx_voters_tenant ON voters(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_voters_leader ON voters(leader_id)",
    "CREATE INDEX IF NOT EXISTS idx_visits_tenant ON visits(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_visits_voter ON visits(voter_id)",
    "CREATE INDEX IF NOT EXISTS idx_help_records_tenant ON help_records(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_tenant ON appointments(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(date)",
    "CREATE INDEX IF NOT EXISTS idx_law_projects_tenant ON law_projects(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_amendments_tenant ON amendments(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_tenant ON audit_logs(tenant_id)",
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_action ON audit_logs(action)",
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_entity ON audit_logs(entity_kind)",
];

/// Create all tables and indexes if they do not exist yet. Safe to run on
/// every startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}

/// Seed the first admin account from MANDATE_ADMIN_EMAIL and
/// MANDATE_ADMIN_PASSWORD. Does nothing when the variables are unset or the
/// account already exists, so restarts stay quiet.
pub async fn ensure_bootstrap_admin(pool: &PgPool) -> Result<(), DatabaseError> {
    let (email, password) = match (
        std::env::var("MANDATE_ADMIN_EMAIL"),
        std::env::var("MANDATE_ADMIN_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => (email, password),
        _ => {
            warn!("MANDATE_ADMIN_EMAIL / MANDATE_ADMIN_PASSWORD unset, skipping admin seed");
            return Ok(());
        }
    };

    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM accounts WHERE email = $1")
            .bind(&email)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
        .map_err(|e| DatabaseError::QueryError(format!("password hash failed: {}", e)))?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO accounts (id, name, email, password_hash, role, active, tenant_id)
         VALUES ($1, $2, $3, $4, 'admin', TRUE, NULL)",
    )
    .bind(id)
    .bind("Administrator")
    .bind(&email)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    info!("Seeded bootstrap admin account {} ({})", id, email);
    Ok(())
}
