use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

/// Start the global logger.
///
/// `RUST_LOG` overrides `level`. With a directory, logs go to rotated files
/// there; otherwise to stderr with colors.
pub fn setup_logging(level: &str, directory: Option<&str>) -> crate::Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)?;

    let handle = match directory {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("waitlist"))
            .format(flexi_logger::opt_format)
            .rotate(
                Criterion::Size(10 * 1024 * 1024), // Rotate logs after they reach 10 MB
                Naming::Numbers,
                Cleanup::KeepLogFiles(7),
            )
            .start()?,
        None => logger
            .format(flexi_logger::colored_default_format)
            .start()?,
    };

    Ok(handle)
}
