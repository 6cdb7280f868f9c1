//! Database schema SQL.

/// Referral edges. `customer_id` is unique: a customer has at most one referrer.
/// Roots carry a NULL `referrer_id`. `id` preserves insertion order.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS referrals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id TEXT NOT NULL UNIQUE,
    referrer_id TEXT,
    referred_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_referrals_referrer ON referrals(referrer_id);
"#;
