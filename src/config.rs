use crate::domain::ConfigError;
use crate::infra::llm::env::{VarReader, byte_limit_var, non_empty_var, read_env_var};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// Largest `/generate-code` body accepted before answering 413.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

const ENV_BIND_ADDR: &str = "CODEGEN_BIND_ADDR";
const ENV_MAX_BODY_BYTES: &str = "CODEGEN_MAX_BODY_BYTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&read_env_var)
    }

    pub(crate) fn from_vars(read: VarReader<'_>) -> Result<Self, ConfigError> {
        let bind_addr =
            non_empty_var(read, ENV_BIND_ADDR)?.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let max_body_bytes =
            byte_limit_var(read, ENV_MAX_BODY_BYTES)?.unwrap_or(DEFAULT_MAX_BODY_BYTES);
        Ok(Self {
            bind_addr,
            max_body_bytes,
        })
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BIND_ADDR, DEFAULT_MAX_BODY_BYTES, ServerConfig};
    use crate::infra::llm::env::test_vars::vars;

    #[test]
    fn default_binds_all_interfaces_on_port_3000() {
        assert_eq!(ServerConfig::default().bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(DEFAULT_BIND_ADDR, "0.0.0.0:3000");
        assert_eq!(DEFAULT_MAX_BODY_BYTES, 1_048_576);
    }

    #[test]
    fn overrides_are_read_from_environment() {
        let config = ServerConfig::from_vars(&vars(&[
            ("CODEGEN_BIND_ADDR", " 127.0.0.1:8088 "),
            ("CODEGEN_MAX_BODY_BYTES", "4096"),
        ]))
        .expect("config should load");

        assert_eq!(config.bind_addr, "127.0.0.1:8088");
        assert_eq!(config.max_body_bytes, 4096);
        assert_eq!(
            ServerConfig::from_vars(&vars(&[])).expect("config should load"),
            ServerConfig::default()
        );
    }

    #[test]
    fn blank_bind_addr_override_is_rejected() {
        let error = ServerConfig::from_vars(&vars(&[("CODEGEN_BIND_ADDR", "")]))
            .expect_err("blank bind address must fail");

        assert_eq!(error.to_string(), "CODEGEN_BIND_ADDR must not be empty when set");
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let error = ServerConfig::from_vars(&vars(&[("CODEGEN_MAX_BODY_BYTES", "0")]))
            .expect_err("zero limit must fail");

        assert_eq!(
            error.to_string(),
            "CODEGEN_MAX_BODY_BYTES must be greater than 0 bytes"
        );
    }
}
