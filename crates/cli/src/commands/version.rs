use tracing::instrument;

#[instrument]
pub fn get_version_info() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    tracing::debug!(
        package_name = name,
        package_version = version,
        "Gathering package information"
    );

    format!(
        "d2 {version} ({name}) - {description}\n\
        Target: {}-{}\n\
        Correlation ID: {}",
        std::env::consts::ARCH,
        std::env::consts::OS,
        crate::tracing::correlation_id()
    )
}

/// `d2 version`
pub fn execute() {
    println!("{}", get_version_info());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_contents() {
        let info = get_version_info();
        assert!(info.starts_with(&format!("d2 {}", env!("CARGO_PKG_VERSION"))));
        assert!(info.contains("d2-cli"));
        assert!(info.contains("Correlation ID:"));
    }
}
