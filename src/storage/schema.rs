//! Database schema definitions

/// SQL to create the people table
pub const CREATE_PEOPLE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS people (
    person_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(name) <= 60),
    phone_number TEXT NOT NULL CHECK (length(phone_number) <= 15)
)
"#;

/// SQL to create the interests table
pub const CREATE_INTERESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS interests (
    interest_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(title) <= 35),
    description TEXT NOT NULL CHECK (length(description) <= 100),
    fk_person_id INTEGER NOT NULL REFERENCES people(person_id)
)
"#;

/// SQL to create the links table
pub const CREATE_LINKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS links (
    link_id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL CHECK (length(url) <= 100),
    fk_interest_id INTEGER NOT NULL REFERENCES interests(interest_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_interests_person ON interests(fk_person_id)",
    "CREATE INDEX IF NOT EXISTS idx_links_interest ON links(fk_interest_id)",
];

/// All schema creation statements, parents before dependents
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PEOPLE_TABLE,
        CREATE_INTERESTS_TABLE,
        CREATE_LINKS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
