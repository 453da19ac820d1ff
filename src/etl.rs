pub mod dim_date;
pub mod dim_hospital;
pub mod dim_region;
pub mod extract_raw;
pub mod fact_covid;
pub mod keys;
pub mod report_views;
pub mod schema_draft;
pub mod tables;
pub mod warehouse_script;

use std::{fs, path::Path, time::{Duration, Instant}};
use log::{info, error};

use crate::errors::Result;

/// Saturates instead of wrapping for durations beyond `u64` milliseconds.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;

    /// Files this stage writes into the working directory.
    fn output_file_names(&self) -> &[&str];

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        for name in self.output_file_names() {
            if !dir.join(name).try_exists()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        for name in self.output_file_names() {
            let path = dir.join(name);
            if path.try_exists()? {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    fn process(&mut self, dir: &Path) -> Result<()> {
        info!(etl_name = self.etl_name(); "Starting ETL process");
        let started = Instant::now();
        if self.is_cached(dir)? {
            info!(etl_name = self.etl_name(); "Using cached value");
        } else {
            info!(etl_name = self.etl_name(); "Extracting");
            let input = self.extract(dir).map_err(|err| {
                error!(etl_name = self.etl_name(), err = err.message.as_str(); "Extraction failed with error");
                err
            })?;

            info!(etl_name = self.etl_name(); "Transforming");
            let output = self.transform(input).map_err(|err| {
                error!(etl_name = self.etl_name(), err = err.message.as_str(); "Transformation failed with error");
                err
            })?;

            info!(etl_name = self.etl_name(); "Loading");
            self.load(dir, output).map_err(|err| {
                error!(etl_name = self.etl_name(), err = err.message.as_str(); "Loading failed with error");
                err
            })?;
        }
        let elapsed_ms = whole_millis(started.elapsed());
        info!(etl_name = self.etl_name(), elapsed_ms = elapsed_ms; "Process finished");
        Ok(())
    }

    /// Drops any previous output and runs the stage from scratch.
    fn rebuild(&mut self, dir: &Path) -> Result<()> {
        self.clean(dir)?;
        self.process(dir)
    }
}
