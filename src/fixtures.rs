#[cfg(test)]
pub mod test {
    use crate::Config;

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct AppConfig {
        #[config(env = "APP_NAME", default = "myapp")]
        pub name: String,

        #[config(env = "PORT", default = 8080)]
        pub port: u16,

        #[config(env = "DEBUG", default = false)]
        pub debug: bool,

        /// Read from a variable named after the field.
        pub verbose: bool,

        #[config(nested)]
        pub database: DatabaseConfig,

        #[config(nested)]
        pub cache: Option<Box<CacheConfig>>,

        #[config(skip)]
        pub loaded_at: Option<String>,
    }

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct DatabaseConfig {
        #[config(env = "DB_HOST", default = "localhost")]
        pub host: String,

        #[config(env = "DB_PORT", default = 5432)]
        pub port: u16,

        #[config(secret = "DB_PASSWORD", default = "secret")]
        pub password: String,
    }

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct CacheConfig {
        #[config(env = "CACHE_ADDR", default = "localhost:6379")]
        pub addr: String,

        #[config(env = "CACHE_TTL", default = 60)]
        pub ttl_seconds: u32,
    }

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct RequiredConfig {
        #[config(env = "API_KEY", required)]
        pub api_key: String,

        #[config(env = "REGION", required = "True", default = "eu-west-1")]
        pub region: String,
    }

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct ListConfig {
        #[config(env = "TAGS")]
        pub tags: Vec<String>,

        #[config(env = "PORTS")]
        pub ports: Vec<u16>,

        #[config(env = "HOSTS", default = "alpha, beta")]
        pub hosts: Vec<String>,

        #[config(env = "MATRIX")]
        pub matrix: Vec<Vec<u8>>,
    }

    #[derive(Config, Debug, Default)]
    pub struct SecretConfig {
        #[config(secret = "API_KEY")]
        pub api_key: String,

        #[config(secret = "PIN")]
        pub pin: u32,

        #[config(secret = "TOKENS")]
        pub tokens: Vec<String>,

        #[config(secret = "DSN")]
        pub dsn: Option<url::Url>,

        #[config(env = "ENDPOINT")]
        pub endpoint: Option<url::Url>,

        #[config(env = "MIRRORS")]
        pub mirrors: Vec<url::Url>,
    }

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct Credentials {
        #[config(env = "DB_USER")]
        pub user: String,

        #[config(secret = "DB_PASS")]
        pub pass: String,
    }

    #[derive(Config, Debug, Default)]
    pub struct VaultConfig {
        #[config(secret = "CREDS", nested)]
        pub creds: Credentials,

        #[config(secret = "BACKUP", nested)]
        pub backup: Option<Credentials>,

        #[config(nested)]
        pub audit: Credentials,

        #[config(secret = "SESSION")]
        pub session: Option<String>,
    }

    #[test]
    fn field_tables_skip_skipped_fields() {
        let names: Vec<_> = AppConfig::FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["name", "port", "debug", "verbose", "database", "cache"]
        );
    }

    #[test]
    fn literal_defaults_keep_their_text() {
        assert_eq!(AppConfig::FIELDS[1].default, Some("8080"));
        assert_eq!(AppConfig::FIELDS[2].default, Some("false"));
    }

    #[test]
    fn required_is_case_insensitive() {
        assert!(RequiredConfig::FIELDS[0].required);
        assert!(RequiredConfig::FIELDS[1].required);
        assert_eq!(RequiredConfig::FIELDS[1].tags[1], ("required", "True"));
    }

    #[test]
    fn nested_fields_are_marked() {
        assert!(AppConfig::FIELDS[4].nested);
        assert!(!AppConfig::FIELDS[3].nested);
    }
}
