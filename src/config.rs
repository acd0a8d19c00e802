//! Configuration for Database
//!
//! Provides a builder pattern for configuring the store.

/// Configuration for the store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database URL (e.g. `sqlite://books.db`, `sqlite::memory:`)
    pub database_url: String,
    /// Create the database file if it does not exist (default: true)
    pub create_if_missing: bool,
    /// Accept `FOREIGN KEY (...)` schema entries and enforce them (default: true)
    pub foreign_keys: bool,
    /// Accept sort specifications on selects (default: true)
    pub sorting: bool,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }

    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        StoreConfigBuilder::new("sqlite::memory:").build()
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    create_if_missing: bool,
    foreign_keys: bool,
    sorting: bool,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            create_if_missing: true,
            foreign_keys: true,
            sorting: true,
        }
    }

    /// Create the database file when missing (default: true)
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Enable or disable foreign key clauses in the schema (default: true)
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Enable or disable sorting of select results (default: true)
    pub fn sorting(mut self, enabled: bool) -> Self {
        self.sorting = enabled;
        self
    }

    /// Disable foreign key clauses
    pub fn without_foreign_keys(mut self) -> Self {
        self.foreign_keys = false;
        self
    }

    /// Disable sorting
    pub fn without_sorting(mut self) -> Self {
        self.sorting = false;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            create_if_missing: self.create_if_missing,
            foreign_keys: self.foreign_keys,
            sorting: self.sorting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = StoreConfig::builder("sqlite://test.db").build();

        assert_eq!(config.database_url, "sqlite://test.db");
        assert!(config.create_if_missing);
        assert!(config.foreign_keys);
        assert!(config.sorting);
    }

    #[test]
    fn test_in_memory() {
        let config = StoreConfig::in_memory();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_builder_accepts_string() {
        let config = StoreConfig::builder(String::from("sqlite://db.sqlite")).build();
        assert_eq!(config.database_url, "sqlite://db.sqlite");
    }

    // =========================================================================
    // Feature Toggle Tests
    // =========================================================================

    #[test]
    fn test_create_if_missing_disabled() {
        let config = StoreConfig::builder("sqlite://test.db")
            .create_if_missing(false)
            .build();

        assert!(!config.create_if_missing);
    }

    #[test]
    fn test_without_foreign_keys() {
        let config = StoreConfig::builder("sqlite://test.db")
            .without_foreign_keys()
            .build();

        assert!(!config.foreign_keys);
        assert!(config.sorting);
    }

    #[test]
    fn test_without_sorting() {
        let config = StoreConfig::builder("sqlite://test.db")
            .without_sorting()
            .build();

        assert!(!config.sorting);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_builder_order_independence() {
        let config1 = StoreConfig::builder("sqlite://test.db")
            .sorting(false)
            .foreign_keys(false)
            .build();

        let config2 = StoreConfig::builder("sqlite://test.db")
            .foreign_keys(false)
            .sorting(false)
            .build();

        assert_eq!(config1.sorting, config2.sorting);
        assert_eq!(config1.foreign_keys, config2.foreign_keys);
    }

    #[test]
    fn test_config_debug() {
        let config = StoreConfig::builder("sqlite://test.db").build();
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("StoreConfig"));
        assert!(debug_str.contains("database_url"));
    }
}
