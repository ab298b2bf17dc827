pub mod cli;

use crate::core::{ConfigProvider, WriteMode};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_required_field,
    validate_table_spec, Validate,
};
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "orders-etl")]
#[command(about = "Fetch the daily orders export, aggregate per-customer spend, append to BigQuery")]
pub struct CliConfig {
    #[arg(long, env = "SFTP_HOST_NAME")]
    pub sftp_host: Option<String>,

    #[arg(long, env = "SFTP_USER")]
    pub sftp_user: Option<String>,

    #[arg(long, env = "SFTP_PASSWORD", hide_env_values = true)]
    pub sftp_password: Option<String>,

    #[arg(long, default_value = "22")]
    pub sftp_port: u16,

    #[arg(long, env = "GBQ_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Destination in 'dataset.table' form.
    #[arg(long, env = "GBQ_DESTINATION_TABLE")]
    pub destination_table: Option<String>,

    /// Service account key file; application default credentials when unset.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS", hide_env_values = true)]
    pub service_account_key: Option<String>,

    /// Which day's export to process, as YYYY-MM-DD.
    #[arg(long, default_value_t = default_run_date())]
    pub date: NaiveDate,

    #[arg(long, default_value = "./spool")]
    pub spool_dir: String,

    /// 'append' duplicates rows on re-runs; 'replace-date' deletes the
    /// run's dates first.
    #[arg(long, default_value = "append")]
    pub write_mode: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-stage time and memory usage")]
    pub monitor: bool,
}

fn default_run_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl CliConfig {
    pub fn sftp_host(&self) -> Result<&str> {
        validate_required_field("sftp_host", &self.sftp_host).map(String::as_str)
    }

    pub fn sftp_user(&self) -> Result<&str> {
        validate_required_field("sftp_user", &self.sftp_user).map(String::as_str)
    }

    pub fn sftp_password(&self) -> Result<&str> {
        validate_required_field("sftp_password", &self.sftp_password).map(String::as_str)
    }

    pub fn project_id(&self) -> Result<&str> {
        validate_required_field("project_id", &self.project_id).map(String::as_str)
    }

    pub fn destination_table(&self) -> Result<&str> {
        validate_required_field("destination_table", &self.destination_table).map(String::as_str)
    }

    pub fn parsed_write_mode(&self) -> Result<WriteMode> {
        self.write_mode
            .parse()
            .map_err(|reason| EtlError::InvalidConfigValueError {
                field: "write_mode".to_string(),
                value: self.write_mode.clone(),
                reason,
            })
    }
}

impl Validate for CliConfig {
    /// Runs once at startup, before any network activity.
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("sftp_host", self.sftp_host()?)?;
        validate_non_empty_string("sftp_user", self.sftp_user()?)?;
        validate_non_empty_string("sftp_password", self.sftp_password()?)?;
        validate_positive_number("sftp_port", usize::from(self.sftp_port), 1)?;
        validate_non_empty_string("project_id", self.project_id()?)?;
        validate_table_spec("destination_table", self.destination_table()?)?;
        validate_non_empty_string("spool_dir", &self.spool_dir)?;
        self.parsed_write_mode()?;
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn run_date(&self) -> NaiveDate {
        self.date
    }

    fn spool_dir(&self) -> &str {
        &self.spool_dir
    }

    fn write_mode(&self) -> WriteMode {
        // validate() ran at startup; fall back to the default on the
        // unreachable error path rather than panicking.
        self.parsed_write_mode().unwrap_or_default()
    }
}
