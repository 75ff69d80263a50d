//! Tests for logging setup

#[cfg(test)]
mod tests {
    use super::super::setup_output;
    use std::fs;

    #[test]
    fn test_setup_output_creates_log_file_and_is_idempotent() {
        let path = std::env::temp_dir().join("coupled_cluster_setup_output.log");
        let _ = fs::remove_file(&path);

        setup_output(path.to_str());
        assert!(path.exists());

        // a subscriber is already installed, later calls only return
        setup_output(None);
        setup_output(path.to_str());

        let _ = fs::remove_file(&path);
    }
}
